use std::time::Duration;

// Provider endpoints
pub static PROVIDER_DOMAIN: &str = "coreledger.io";
pub static API_VERSION: &str = "api/v1";
pub static AUTH_PATH: &str = "auth";
pub const STOMP_PORT: u16 = 61614;

// Transport defaults
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum age of a bearer token before a new bootstrap is required (23 hours).
pub const TOKEN_MAX_AGE_MILLIS: i64 = 23 * 60 * 60 * 1000;

/// Value of the `User-Agent` header attached to every outgoing request.
pub fn user_agent() -> String {
    format!(
        "{}/{} (rust; {}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
