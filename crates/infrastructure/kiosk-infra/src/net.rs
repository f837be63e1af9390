use std::time::Duration;

use reqwest::Client;

/// HTTP client shared by the relay transport and catalog loading.
///
/// No overall request timeout is set because subscription streams stay open
/// for the lifetime of a display; callers bound individual requests instead.
pub fn default_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("kiosk/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}
