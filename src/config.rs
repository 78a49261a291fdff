use std::time::Duration;

/// Upper bound for the list-event buffer.
pub const MAX_EVENT_CAPACITY: usize = 1024;

/// Client settings derived from env.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    pub event_capacity: usize,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        fn u64_env(name: &str, default: u64) -> u64 { std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default) }
        let api_base_url = std::env::var("JDIAS_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();
        let auth_token = std::env::var("JDIAS_API_TOKEN").ok().filter(|t| !t.trim().is_empty());
        Self {
            api_base_url,
            auth_token,
            request_timeout: Duration::from_secs(u64_env("JDIAS_TIMEOUT_SECS", 10)),
            event_capacity: u64_env("JDIAS_EVENT_CAPACITY", 16).clamp(1, MAX_EVENT_CAPACITY as u64) as usize,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            auth_token: None,
            request_timeout: Duration::from_secs(10),
            event_capacity: 16,
        }
    }
}
