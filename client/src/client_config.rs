use std::time::Duration;

use rand::Rng;

/// Default acknowledgement window for outbound requests.
pub const DEFAULT_WAIT_FOR_RESPONSE: Duration = Duration::from_millis(15_000);

/// Connection-level options for an accord client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Transport endpoint.
    pub url: String,
    /// Stable identity announced to the master; generated when unset.
    pub user_id: Option<String>,
    /// Opaque credential, carried as a connection-level query parameter by
    /// network transports. The in-memory channel transport ignores it.
    pub api_key: Option<String>,
    /// How long each request may wait for its acknowledgement before it
    /// resolves with a timeout.
    pub wait_for_response: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user_id: None,
            api_key: None,
            wait_for_response: DEFAULT_WAIT_FOR_RESPONSE,
        }
    }
}

impl ClientConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    /// The configured user id, or a freshly generated decimal id in
    /// `[10_000_000_000, 999_999_999_999]`.
    pub fn resolved_user_id(&self) -> String {
        match &self.user_id {
            Some(user_id) => user_id.clone(),
            None => rand::thread_rng()
                .gen_range(10_000_000_000u64..=999_999_999_999u64)
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_user_id_wins() {
        let mut config = ClientConfig::new("ws://localhost:3333");
        config.user_id = Some("user-1".to_string());
        assert_eq!(config.resolved_user_id(), "user-1");
    }

    #[test]
    fn generated_user_id_is_in_range() {
        let config = ClientConfig::default();
        let user_id: u64 = config.resolved_user_id().parse().unwrap();
        assert!((10_000_000_000..=999_999_999_999).contains(&user_id));
    }

    #[test]
    fn default_wait_is_fifteen_seconds() {
        assert_eq!(
            ClientConfig::default().wait_for_response,
            Duration::from_millis(15_000)
        );
    }
}
