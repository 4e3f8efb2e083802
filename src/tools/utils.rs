/// Normalize an incomplete URL by adding a missing scheme
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    const KNOWN_SCHEMES: [&str; 7] =
        ["http://", "https://", "file://", "data:", "about:", "chrome://", "chrome-extension://"];
    if KNOWN_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
        return trimmed.to_string();
    }

    // Relative path - return as-is
    if trimmed.starts_with('/') || trimmed.starts_with("./") || trimmed.starts_with("../") {
        return trimmed.to_string();
    }

    // Local development servers rarely serve TLS
    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    if trimmed.contains('.') {
        return format!("https://{}", trimmed);
    }

    // Single word: "google" -> "https://www.google.com"
    format!("https://www.{}.com", trimmed)
}
