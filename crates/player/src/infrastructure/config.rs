//! Player configuration
//!
//! Loaded from the environment (after `.env.local` / `.env` at the repo root):
//!
//! | variable | default |
//! |---|---|
//! | `GEMDUEL_API_URL` | `http://localhost:8080` |
//! | `GEMDUEL_WS_URL` | derived from the API URL (`http→ws`, `https→wss`) |
//! | `GEMDUEL_REQUEST_TIMEOUT_SECS` | `10` |

use std::path::Path;
use std::time::Duration;

use url::Url;

/// Default room server base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default REST request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL {0:?} cannot carry a path")]
    NotABase(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Base of the REST API, e.g. `http://localhost:8080`
    pub api_base_url: String,
    /// Base of the room socket, e.g. `ws://localhost:8080`
    pub ws_base_url: String,
    pub request_timeout: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::for_server(DEFAULT_API_URL)
    }
}

impl PlayerConfig {
    /// Config pointing both REST and socket at one server
    pub fn for_server(api_base_url: &str) -> Self {
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        Self {
            ws_base_url: http_to_ws(&api_base_url),
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut config = non_empty("GEMDUEL_API_URL")
            .map(|url| Self::for_server(&url))
            .unwrap_or_default();

        if let Some(ws) = non_empty("GEMDUEL_WS_URL") {
            config.ws_base_url = ws.trim_end_matches('/').to_string();
        }

        match non_empty("GEMDUEL_REQUEST_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) => config.request_timeout = Duration::from_secs(secs),
            Some(Err(e)) => {
                tracing::warn!("Ignoring GEMDUEL_REQUEST_TIMEOUT_SECS: {}", e);
            }
            None => {}
        }

        config
    }

    /// Socket URL for a room: `<ws_base>/ws/<room_id>`
    pub fn room_socket_url(&self, room_id: &str) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.ws_base_url).map_err(|source| ConfigError::InvalidUrl {
            value: self.ws_base_url.clone(),
            source,
        })?;

        url.path_segments_mut()
            .map_err(|_| ConfigError::NotABase(self.ws_base_url.clone()))?
            .pop_if_empty()
            .push("ws")
            .push(room_id);

        Ok(url)
    }
}

/// Convert an HTTP base URL to its WebSocket counterpart
pub fn http_to_ws(http_url: &str) -> String {
    if let Some(rest) = http_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        http_url.to_string()
    }
}

/// Load `.env.local` then `.env` from the repo root, if present
pub fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::from_lookup(lookup(&[]));
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.ws_base_url, "ws://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_ws_derived_from_api_url() {
        let config = PlayerConfig::from_lookup(lookup(&[(
            "GEMDUEL_API_URL",
            "https://duel.example.com/",
        )]));
        assert_eq!(config.api_base_url, "https://duel.example.com");
        assert_eq!(config.ws_base_url, "wss://duel.example.com");
    }

    #[test]
    fn test_explicit_ws_url_and_timeout() {
        let config = PlayerConfig::from_lookup(lookup(&[
            ("GEMDUEL_API_URL", "http://10.0.0.5:8080"),
            ("GEMDUEL_WS_URL", "ws://10.0.0.5:9090/"),
            ("GEMDUEL_REQUEST_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.ws_base_url, "ws://10.0.0.5:9090");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_timeout_keeps_default() {
        let config =
            PlayerConfig::from_lookup(lookup(&[("GEMDUEL_REQUEST_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_room_socket_url() {
        let config = PlayerConfig::default();
        assert_eq!(
            config.room_socket_url("room-1").unwrap().as_str(),
            "ws://localhost:8080/ws/room-1"
        );

        let prefixed = PlayerConfig {
            ws_base_url: "wss://duel.example.com/game/".into(),
            ..PlayerConfig::default()
        };
        assert_eq!(
            prefixed.room_socket_url("a b").unwrap().as_str(),
            "wss://duel.example.com/game/ws/a%20b"
        );
    }

    #[test]
    fn test_room_socket_url_rejects_garbage() {
        let config = PlayerConfig {
            ws_base_url: "not a url".into(),
            ..PlayerConfig::default()
        };
        assert!(matches!(
            config.room_socket_url("room-1"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
