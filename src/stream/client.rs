//! Auto-reconnecting client for the backend event stream.

use std::{
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use globset::{Glob, GlobMatcher};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};

use crate::{
    FlowcanvasError, Result, ShareLock,
    common::{BroadcastQueue, Queue, Shutdown},
    config::StreamConfig,
    stream::event::StreamEvent,
    utils,
};

const INBOUND_QUEUE_SIZE: usize = 2048;
const OUTBOUND_QUEUE_SIZE: usize = 256;

/// Callback invoked for every inbound event its pattern matches.
pub type StreamEventHandle = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

/// Handler registration options.
#[derive(Debug, Clone)]
pub struct SubscribeOptions {
    /// use the glob pattern to match the event name
    /// eg. system.*
    pub event: String,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            event: "*".to_string(),
        }
    }
}

impl SubscribeOptions {
    pub fn with_event(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
        }
    }
}

struct Registration {
    pattern: String,
    glob: GlobMatcher,
    handle: StreamEventHandle,
}

/// One WebSocket connection to the backend, read by a background task.
///
/// Inbound frames fan out two ways: callback handlers registered with
/// [`on`](Self::on), matched by glob pattern over the event name, and the
/// broadcast receiver from [`subscribe`](Self::subscribe). Outbound frames
/// queue until the link is up. A dropped connection is retried with a
/// linearly growing delay until the attempt bound is hit; a successful
/// connect resets the counter. Clones share the same connection.
#[derive(Clone)]
pub struct StreamClient {
    url: String,
    config: StreamConfig,
    connection_id: String,
    running: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    handlers: ShareLock<Vec<Registration>>,
    inbound: Arc<BroadcastQueue<StreamEvent>>,
    outbound: Arc<Queue<String>>,
    shutdown: Arc<Shutdown>,
}

impl StreamClient {
    /// Client for one agent's chat stream (`/ws/chat/{agent_id}`).
    pub fn chat(
        config: &StreamConfig,
        agent_id: &str,
    ) -> Self {
        Self::new(config, &format!("/ws/chat/{}", agent_id))
    }

    /// Client for the admin metrics stream (`/ws/admin`).
    pub fn admin(config: &StreamConfig) -> Self {
        Self::new(config, "/ws/admin")
    }

    pub fn new(
        config: &StreamConfig,
        path: &str,
    ) -> Self {
        Self {
            url: format!("{}{}", config.url.trim_end_matches('/'), path),
            config: config.clone(),
            connection_id: utils::id::connection_id(),
            running: Arc::new(AtomicBool::new(false)),
            connected: Arc::new(AtomicBool::new(false)),
            handlers: Arc::new(RwLock::new(Vec::new())),
            inbound: BroadcastQueue::new(INBOUND_QUEUE_SIZE),
            outbound: Queue::new(OUTBOUND_QUEUE_SIZE),
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    /// Register a callback for events matching `options.event`.
    ///
    /// An exact event name is a valid pattern, so `with_event("message")`
    /// receives chat replies and `with_event("system.*")` receives every
    /// system event.
    pub fn on(
        &self,
        options: SubscribeOptions,
        f: impl Fn(&StreamEvent) + Send + Sync + 'static,
    ) -> Result<()> {
        let glob = Glob::new(&options.event)
            .map_err(|err| FlowcanvasError::Stream(err.to_string()))?
            .compile_matcher();

        self.handlers.write().unwrap().push(Registration {
            pattern: options.event,
            glob,
            handle: Arc::new(f),
        });
        Ok(())
    }

    /// Drop every handler registered under exactly `pattern`.
    pub fn off(
        &self,
        pattern: &str,
    ) {
        self.handlers.write().unwrap().retain(|registration| registration.pattern != pattern);
    }

    /// A receiver over every inbound event, independent of handlers.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StreamEvent> {
        self.inbound.subscribe()
    }

    /// The inbound feed as an async stream. A consumer that falls behind
    /// the broadcast window sees one lag error item, then resumes.
    pub fn events(&self) -> BroadcastStream<StreamEvent> {
        BroadcastStream::new(self.inbound.subscribe())
    }

    /// Queue a JSON frame for the backend. Frames queue while the link is
    /// down and flush once it is up again.
    pub async fn send(
        &self,
        message: &Value,
    ) -> Result<()> {
        self.outbound.send_async(serde_json::to_string(message)?).await
    }

    /// Spawn the background connection task.
    ///
    /// Must be called inside a tokio runtime. Repeated calls while the
    /// task is alive are a no-op.
    pub fn connect(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("stream {} already running", self.connection_id);
            return;
        }

        let client = self.clone();
        tokio::spawn(async move {
            client.run().await;
            client.running.store(false, Ordering::SeqCst);
        });
    }

    /// Close the connection and stop reconnecting.
    pub fn disconnect(&self) {
        self.shutdown.shutdown();
    }

    /// Whether the link is currently up.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Id identifying this connection in logs.
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Connect-and-reconnect supervisor loop.
    async fn run(&self) {
        let mut attempts: u32 = 0;

        loop {
            if self.shutdown.is_terminated() {
                break;
            }

            match tokio_tungstenite::connect_async(self.url.as_str()).await {
                Ok((socket, _)) => {
                    attempts = 0;
                    self.connected.store(true, Ordering::SeqCst);
                    info!("stream {} connected to {}", self.connection_id, self.url);

                    self.pump(socket).await;

                    self.connected.store(false, Ordering::SeqCst);
                    if self.shutdown.is_terminated() {
                        info!("stream {} disconnected", self.connection_id);
                        break;
                    }
                }
                Err(err) => {
                    warn!("stream {} connect failed: {}", self.connection_id, err);
                }
            }

            let Some(delay) = reconnect_delay(attempts, &self.config) else {
                error!("stream {} gave up after {} reconnect attempts", self.connection_id, attempts);
                break;
            };
            attempts += 1;
            info!("stream {} reconnecting in {:?} (attempt {})", self.connection_id, delay, attempts);

            tokio::select! {
                _ = self.shutdown.wait() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Drive one live connection until it drops or shutdown fires.
    async fn pump(
        &self,
        socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ) {
        let (mut write, mut read) = socket.split();

        loop {
            tokio::select! {
                _ = self.shutdown.wait() => {
                    let _ = write.send(WsMessage::Close(None)).await;
                    return;
                }

                out = self.outbound.next_async() => {
                    let Some(text) = out else { return };
                    if let Err(err) = write.send(WsMessage::Text(text.into())).await {
                        warn!("stream {} send failed: {}", self.connection_id, err);
                        return;
                    }
                }

                frame = read.next() => {
                    let Some(result) = frame else {
                        info!("stream {} connection ended", self.connection_id);
                        return;
                    };
                    let msg = match result {
                        Ok(msg) => msg,
                        Err(err) => {
                            warn!("stream {} read error: {}", self.connection_id, err);
                            return;
                        }
                    };
                    if msg.is_close() {
                        info!("stream {} closed by server", self.connection_id);
                        return;
                    }
                    let Ok(text) = msg.to_text() else { continue };
                    if text.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(text) {
                        Ok(value) => self.dispatch(StreamEvent::from_value(value)),
                        Err(err) => debug!("stream {} skipping non-JSON frame: {}", self.connection_id, err),
                    }
                }
            }
        }
    }

    /// Fan one event out to the broadcast feed and matching handlers.
    fn dispatch(
        &self,
        event: StreamEvent,
    ) {
        debug!("stream {} dispatching {} event", self.connection_id, event.event);
        let _ = self.inbound.send(event.clone());

        let handlers = self.handlers.read().unwrap();
        for registration in handlers.iter() {
            if registration.glob.is_match(&event.event) {
                (registration.handle)(&event);
            }
        }
    }
}

/// Delay before reconnect attempt `attempts + 1`, or None once the bound
/// is spent. The delay grows linearly with the attempt number.
fn reconnect_delay(
    attempts: u32,
    config: &StreamConfig,
) -> Option<Duration> {
    if attempts >= config.max_reconnect_attempts {
        return None;
    }
    Some(Duration::from_millis(config.reconnect_backoff_ms * (attempts as u64 + 1)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;

    use super::*;

    fn run_async<F: std::future::Future>(future: F) -> F::Output {
        // Current-thread runtime (the #[tokio::test] default): dispatch runs
        // synchronously inside the pump task, so a test task woken by the
        // broadcast send cannot observe the handler fan-out mid-flight.
        tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(future)
    }

    fn test_config(url: String) -> StreamConfig {
        StreamConfig {
            url,
            max_reconnect_attempts: 5,
            reconnect_backoff_ms: 50,
        }
    }

    fn metrics_frame() -> String {
        json!({
            "event": "system.metrics",
            "data": {"cpu_percent": 40.0},
            "timestamp": 1700000000.0,
        })
        .to_string()
    }

    // ==================== reconnect arithmetic tests ====================

    #[test]
    fn test_backoff_grows_linearly() {
        let config = StreamConfig {
            url: "ws://localhost:8001".to_string(),
            max_reconnect_attempts: 5,
            reconnect_backoff_ms: 2000,
        };

        let delays: Vec<_> = (0..5).map(|n| reconnect_delay(n, &config).unwrap().as_millis()).collect();
        assert_eq!(delays, vec![2000, 4000, 6000, 8000, 10000]);
    }

    #[test]
    fn test_backoff_stops_at_the_bound() {
        let config = StreamConfig {
            url: "ws://localhost:8001".to_string(),
            max_reconnect_attempts: 5,
            reconnect_backoff_ms: 2000,
        };

        assert!(reconnect_delay(4, &config).is_some());
        assert!(reconnect_delay(5, &config).is_none());
        assert!(reconnect_delay(6, &config).is_none());
    }

    // ==================== dispatch tests ====================

    #[test]
    fn test_exact_name_handler_matches_only_its_event() {
        let client = StreamClient::admin(&test_config("ws://localhost:8001".to_string()));
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        client
            .on(SubscribeOptions::with_event("system.metrics"), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        client.dispatch(StreamEvent::from_value(json!({"event": "system.metrics"})));
        client.dispatch(StreamEvent::from_value(json!({"event": "anomaly.detected"})));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_glob_handler_matches_event_family() {
        let client = StreamClient::admin(&test_config("ws://localhost:8001".to_string()));
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        client
            .on(SubscribeOptions::with_event("system.*"), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        client.dispatch(StreamEvent::from_value(json!({"event": "system.metrics"})));
        client.dispatch(StreamEvent::from_value(json!({"event": "system.health"})));
        client.dispatch(StreamEvent::from_value(json!({"event": "anomaly.detected"})));

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_frames_without_event_field_reach_message_handlers() {
        let client = StreamClient::chat(&test_config("ws://localhost:8001".to_string()), "agent_7");
        let seen = Arc::new(RwLock::new(Vec::new()));

        let sink = seen.clone();
        client
            .on(SubscribeOptions::with_event("message"), move |event| {
                sink.write().unwrap().push(event.payload.clone());
            })
            .unwrap();

        client.dispatch(StreamEvent::from_value(json!({"response": "Hi there"})));

        let seen = seen.read().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["response"], "Hi there");
    }

    #[test]
    fn test_off_drops_handlers_by_pattern() {
        let client = StreamClient::admin(&test_config("ws://localhost:8001".to_string()));
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        client
            .on(SubscribeOptions::with_event("system.metrics"), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        client.dispatch(StreamEvent::from_value(json!({"event": "system.metrics"})));
        client.off("system.metrics");
        client.dispatch(StreamEvent::from_value(json!({"event": "system.metrics"})));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let client = StreamClient::admin(&test_config("ws://localhost:8001".to_string()));
        assert!(client.on(SubscribeOptions::with_event("system.[metrics"), |_| {}).is_err());
    }

    #[test]
    fn test_subscribe_receives_every_event() {
        let client = StreamClient::admin(&test_config("ws://localhost:8001".to_string()));
        let mut receiver = client.subscribe();

        client.dispatch(StreamEvent::from_value(json!({"event": "system.metrics"})));
        client.dispatch(StreamEvent::from_value(json!({"event": "anomaly.detected"})));

        assert_eq!(receiver.try_recv().unwrap().event, "system.metrics");
        assert_eq!(receiver.try_recv().unwrap().event, "anomaly.detected");
    }

    #[test]
    fn test_events_stream_yields_dispatched_events() {
        run_async(async {
            let client = StreamClient::admin(&test_config("ws://localhost:8001".to_string()));
            let mut events = client.events();

            client.dispatch(StreamEvent::from_value(json!({"event": "system.metrics"})));

            let event = events.next().await.unwrap().unwrap();
            assert_eq!(event.event, "system.metrics");
        });
    }

    #[test]
    fn test_chat_and_admin_paths() {
        let config = test_config("ws://localhost:8001/".to_string());
        assert_eq!(StreamClient::chat(&config, "agent_7").url, "ws://localhost:8001/ws/chat/agent_7");
        assert_eq!(StreamClient::admin(&config).url, "ws://localhost:8001/ws/admin");
    }

    #[test]
    fn test_send_queues_while_disconnected() {
        let client = StreamClient::chat(&test_config("ws://localhost:8001".to_string()), "agent_7");

        run_async(client.send(&json!({"message": "hello"}))).unwrap();

        let queued = client.outbound.next().unwrap();
        assert_eq!(queued, r#"{"message":"hello"}"#);
    }

    // ==================== live stream tests ====================

    #[test]
    fn test_connect_dispatches_inbound_and_flushes_outbound() {
        run_async(async {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (served_tx, served_rx) = tokio::sync::oneshot::channel();

            tokio::spawn(async move {
                let (stream, _) = listener.accept().await.unwrap();
                let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();

                socket.send(WsMessage::Text(metrics_frame().into())).await.unwrap();

                let inbound = socket.next().await.unwrap().unwrap();
                served_tx.send(inbound.to_text().unwrap().to_string()).unwrap();
            });

            let client = StreamClient::admin(&test_config(format!("ws://{}", addr)));
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = hits.clone();
            client
                .on(SubscribeOptions::with_event("system.metrics"), move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            let mut receiver = client.subscribe();

            client.connect();

            let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(event.event, "system.metrics");
            assert_eq!(hits.load(Ordering::SeqCst), 1);
            assert!(client.is_connected());

            client.send(&json!({"message": "hi"})).await.unwrap();
            let served = tokio::time::timeout(Duration::from_secs(5), served_rx).await.unwrap().unwrap();
            assert_eq!(served, r#"{"message":"hi"}"#);

            client.disconnect();
        });
    }

    #[test]
    fn test_dropped_connection_is_retried() {
        run_async(async {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            tokio::spawn(async move {
                // First connection drops straight away, second one serves.
                let (stream, _) = listener.accept().await.unwrap();
                let socket = tokio_tungstenite::accept_async(stream).await.unwrap();
                drop(socket);

                let (stream, _) = listener.accept().await.unwrap();
                let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();
                socket.send(WsMessage::Text(metrics_frame().into())).await.unwrap();
                tokio::time::sleep(Duration::from_millis(200)).await;
            });

            let client = StreamClient::admin(&test_config(format!("ws://{}", addr)));
            let mut receiver = client.subscribe();

            client.connect();

            let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(event.event, "system.metrics");

            client.disconnect();
        });
    }
}
