use nanoid::nanoid;
use uuid::Uuid;

/// Length of the random suffix on generated node ids.
const NODE_ID_LEN: usize = 10;

/// Generate a node id from the node kind's wire name plus a random suffix,
/// e.g. `trigger_V1StGXR8_Z`.
pub fn node_id(kind: &str) -> String {
    format!("{}_{}", kind, nanoid!(NODE_ID_LEN))
}

/// Generate a unique id for one event-stream connection.
pub fn connection_id() -> String {
    Uuid::new_v4().to_string()
}
