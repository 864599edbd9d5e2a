//! Network utilities and helpers

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Get user agent string
pub fn get_user_agent() -> &'static str {
    "Thumbscore/0.1.0"
}
