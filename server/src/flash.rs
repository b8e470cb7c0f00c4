//! Redirect-with-message responses for the write endpoints.

use axum::response::Redirect;
use todo_core::StatusMessage;

/// Builds `/?success=...` or `/?error=...`, carrying `lang` along when the
/// originating request had one.
pub fn location(message: &StatusMessage, lang: Option<&str>) -> String {
    let mut location = format!("/?{}={}", message.key(), encode(message.text()));
    if let Some(lang) = lang.filter(|l| !l.is_empty()) {
        location.push_str("&lang=");
        location.push_str(&encode(lang));
    }
    location
}

pub fn redirect(message: &StatusMessage, lang: Option<&str>) -> Redirect {
    Redirect::to(&location(message, lang))
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_location_is_encoded() {
        let msg = StatusMessage::created();
        assert_eq!(location(&msg, None), "/?success=Task%20added%20successfully");
    }

    #[test]
    fn lang_is_carried_when_present() {
        let msg = StatusMessage::Error("Task not found".to_string());
        assert_eq!(location(&msg, Some("fa")), "/?error=Task%20not%20found&lang=fa");
        assert_eq!(location(&msg, Some("")), "/?error=Task%20not%20found");
    }

    #[test]
    fn reserved_and_non_ascii_bytes_are_escaped() {
        assert_eq!(encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode("کار"), "%DA%A9%D8%A7%D8%B1");
    }
}
