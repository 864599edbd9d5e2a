//! File system utilities

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

/// Ensure directory exists
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| anyhow!("Failed to create directory {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Extension of the file a URL points at, ignoring query and fragment
pub fn extension_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    Path::new(path).extension().and_then(|ext| ext.to_str())
}

/// Whether a path looks like a decodable thumbnail image
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "png" || ext == "jpg" || ext == "jpeg"
        })
        .unwrap_or(false)
}

/// Sanitize filename for filesystem
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_query_and_fragment() {
        assert_eq!(
            extension_from_url("https://img.example/a/maxres.jpg?sqp=abc#frag"),
            Some("jpg")
        );
        assert_eq!(extension_from_url("https://img.example/thumb"), None);
    }

    #[test]
    fn image_files_match_supported_extensions() {
        assert!(is_image_file(Path::new("a/b.PNG")));
        assert!(is_image_file(Path::new("a/b.jpeg")));
        assert!(!is_image_file(Path::new("a/b.webp")));
        assert!(!is_image_file(Path::new("a/noext")));
    }
}
