use url::Url;

/// Returns the trimmed URL if it parses and uses `http` or `https` with a
/// host; `None` otherwise.
pub fn sanitize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.host_str().filter(|h| !h.is_empty())?;
    Some(trimmed.to_string())
}
