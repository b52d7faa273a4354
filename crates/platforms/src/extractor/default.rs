use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::warn;

pub const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum redirect hops followed when resolving share links.
const MAX_REDIRECTS: usize = 10;

/// Builds the client used by every resolver.
///
/// `timeout` bounds each whole request; a timed-out call surfaces as a
/// `reqwest::Error` and is handled like any other fetch failure.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
}

pub fn default_client() -> Client {
    build_client(DEFAULT_UA, DEFAULT_TIMEOUT).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build configured HTTP client, using defaults");
        Client::new()
    })
}
