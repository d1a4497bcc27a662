use std::path::Path;

const KNOWN_SCHEMES: [&str; 7] = ["http://", "https://", "file://", "data:", "about:", "chrome://", "chrome-extension://"];

/// Turn a user-supplied page location into a URL the browser can load
///
/// Existing local files become `file://` URLs, which is how saved pages are
/// usually snapshotted. Hosts without a scheme get `https://`, except
/// loopback hosts which get `http://`.
pub fn normalize_url(location: &str) -> String {
    let trimmed = location.trim();

    if KNOWN_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
        return trimmed.to_string();
    }

    let path = Path::new(trimmed);
    if path.is_file() {
        if let Ok(absolute) = path.canonicalize() {
            return format!("file://{}", absolute.display());
        }
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") || trimmed.starts_with("[::1]") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_known_schemes() {
        assert_eq!(normalize_url("https://example.com/path"), "https://example.com/path");
        assert_eq!(normalize_url("about:blank"), "about:blank");
        assert_eq!(normalize_url("data:text/html,<p>x</p>"), "data:text/html,<p>x</p>");
        assert_eq!(normalize_url("file:///tmp/page.html"), "file:///tmp/page.html");
    }

    #[test]
    fn test_adds_scheme_to_hosts() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("  example.com/a  "), "https://example.com/a");
        assert_eq!(normalize_url("localhost:3000"), "http://localhost:3000");
        assert_eq!(normalize_url("127.0.0.1:8080/x"), "http://127.0.0.1:8080/x");
    }

    #[test]
    fn test_local_file_becomes_file_url() {
        let file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        let url = normalize_url(file.path().to_str().unwrap());

        assert!(url.starts_with("file:///"));
        assert!(url.ends_with(".html"));
    }
}
