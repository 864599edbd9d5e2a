//! URL and input validation utilities

use url::Url;

/// Check if a thumbnail URL is something the fetcher can request
pub fn is_fetchable_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
