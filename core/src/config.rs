//! Client configuration.
//!
//! Hosts either build a `ClientConfig` directly, deserialize one from JSON,
//! or read it from the environment with [`ClientConfig::from_env`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const BASE_URL_VAR: &str = "COLLAB_API_URL";
pub const SESSION_FILE_VAR: &str = "COLLAB_SESSION_FILE";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the bearer token is persisted. `None` keeps it in memory only.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            session_file: None,
        }
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        Self {
            base_url: non_empty(BASE_URL_VAR).unwrap_or_else(default_base_url),
            session_file: non_empty(SESSION_FILE_VAR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn lookup_overrides_defaults() {
        let vars = HashMap::from([
            (BASE_URL_VAR, "https://collab.example.com"),
            (SESSION_FILE_VAR, "/tmp/collab/session.json"),
        ]);
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://collab.example.com");
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/collab/session.json")));
    }

    #[test]
    fn blank_values_fall_back() {
        let config = ClientConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn deserializes_from_json_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"sessionFile":"s.json"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.session_file, Some(PathBuf::from("s.json")));
    }
}
