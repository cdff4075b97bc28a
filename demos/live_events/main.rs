use futures::StreamExt;

use flowcanvas::{ClientBuilder, EVENT_SYSTEM_METRICS, SubscribeOptions};

#[tokio::main]
async fn main() {
    let stream = ClientBuilder::new().stream_url("ws://localhost:8001").admin_stream();

    stream
        .on(SubscribeOptions::with_event(EVENT_SYSTEM_METRICS), |event| {
            println!("metrics: {}", event.data().unwrap_or(&serde_json::Value::Null));
        })
        .unwrap();

    stream
        .on(SubscribeOptions::with_event("anomaly.*"), |event| {
            println!("anomaly: {}", event.payload);
        })
        .unwrap();

    let mut events = stream.events();
    stream.connect();

    while let Some(Ok(event)) = events.next().await {
        println!("event: {}", event.event);
    }
}
