use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FlowcanvasError, Result};

/// Opaque per-node configuration.
///
/// The key set depends on the node kind (a `qwen` node carries a prompt, an
/// integration node carries provider fields); the backend owns those schemas,
/// so the client keeps the map untyped and offers accessors instead of
/// per-kind structs.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct NodeConfig(Map<String, Value>);

impl NodeConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a config key.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`NodeConfig::set`].
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.set(key, value);
        self
    }

    /// Get a config value by key.
    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a config value as a string slice.
    pub fn get_str(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for NodeConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromStr for NodeConfig {
    type Err = FlowcanvasError;

    /// Parse config text as a JSON object. Anything else, including valid
    /// JSON that is not an object, is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let value = serde_json::from_str::<Value>(s)?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(FlowcanvasError::Config(format!("node config must be a JSON object, got: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    // ==================== parse tests ====================

    #[test]
    fn test_parse_object() {
        let config = NodeConfig::from_str(r#"{"prompt": "hello", "temperature": 0.2}"#).unwrap();
        assert_eq!(config.get_str("prompt"), Some("hello"));
        assert_eq!(config.get("temperature"), Some(&json!(0.2)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(NodeConfig::from_str("[1, 2, 3]").is_err());
        assert!(NodeConfig::from_str("\"just a string\"").is_err());
        assert!(NodeConfig::from_str("42").is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(NodeConfig::from_str("{not json").is_err());
    }

    // ==================== accessor tests ====================

    #[test]
    fn test_set_and_get() {
        let mut config = NodeConfig::new();
        config.set("true_path", "node_a");
        config.set("retries", 3);

        assert_eq!(config.get_str("true_path"), Some("node_a"));
        assert_eq!(config.get("retries"), Some(&json!(3)));
        assert_eq!(config.get("missing"), None);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_with_builder() {
        let config = NodeConfig::new().with("provider", "google").with("required", true);
        assert_eq!(config.get_str("provider"), Some("google"));
        assert_eq!(config.get("required"), Some(&json!(true)));
    }
}
