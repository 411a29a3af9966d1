//! Query sanitization, extension derivation, and size formatting

use std::sync::LazyLock;

use regex::Regex;

static JS_PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").unwrap());
static EVENT_HANDLER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)on\w+=").unwrap());

/// Strip the obvious injection vectors from a search query before it is
/// placed into a URL: angle brackets, `javascript:` protocol strings, and
/// inline event-handler attribute patterns. A shallow filter, not a parser;
/// applied to the query only, never to URLs or filenames.
pub fn sanitize_query(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    let stripped = JS_PROTOCOL_RE.replace_all(&stripped, "");
    let stripped = EVENT_HANDLER_RE.replace_all(&stripped, "");
    stripped.trim().to_string()
}

/// Extract the file extension (including the dot) from an image URL's path.
///
/// Falls back to `.jpg` when the URL does not parse, the path has no
/// extension, or the extension is longer than 4 characters including the
/// dot (so `.png` is kept, `.jpeg` is not).
pub fn file_extension(image_url: &str) -> String {
    const DEFAULT: &str = ".jpg";

    let Ok(parsed) = url::Url::parse(image_url) else {
        return DEFAULT.to_string();
    };

    let path = parsed.path();
    let last_segment = path.rsplit('/').next().unwrap_or("");
    let Some(dot) = last_segment.rfind('.') else {
        return DEFAULT.to_string();
    };

    let extension = &last_segment[dot..];
    if extension.len() < 2 || extension.len() > 4 {
        return DEFAULT.to_string();
    }
    extension.to_string()
}

/// Human-readable file size for log output
pub fn format_file_size(bytes: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let i = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let i = i.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(i as i32);

    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[i])
}
