// src/services/sanitize.rs

//! Read-time text sanitization.
//!
//! Stored text is kept exactly as the upstream delivered it; these
//! transformations are applied on the way out so the rules can change
//! without re-ingesting the archive. Two passes:
//!
//! 1. strip shortened-URL tokens (`http[s]://t.co/<token>`)
//! 2. decode HTML/XML character entities (`&amp;`, `&#39;`, `&#x2026;`, ...)

use std::sync::OnceLock;

use regex::Regex;

fn short_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://t\.co/[A-Za-z0-9]+").expect("valid regex"))
}

/// Sanitize a stored text for display.
///
/// Surrounding whitespace is left untouched; stripping a URL token does not
/// collapse the spaces around it.
pub fn sanitize(text: &str) -> String {
    let stripped = short_url_pattern().replace_all(text, "");
    decode_entities(&stripped)
}

/// Decode HTML/XML character entities into their literal characters.
///
/// Unknown entities and bare ampersands pass through unchanged.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match tail.find(';').and_then(|end| {
            let name = &tail[1..end];
            decode_entity(name).map(|decoded| (decoded, end))
        }) {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode a single entity name (without `&` and `;`).
fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            // Numeric references: &#39; or &#x2026;
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_url_and_decodes_entity() {
        assert_eq!(
            sanitize("visit http://t.co/abc123 now &amp; go"),
            "visit  now & go"
        );
    }

    #[test]
    fn test_is_idempotent() {
        let once = sanitize("visit http://t.co/abc123 now &amp; go");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_strips_multiple_urls() {
        assert_eq!(
            sanitize("a https://t.co/XyZ9 b http://t.co/q1 c"),
            "a  b  c"
        );
    }

    #[test]
    fn test_decodes_numeric_entities() {
        assert_eq!(sanitize("it&#39;s fine"), "it's fine");
        assert_eq!(sanitize("wait&#x2026;"), "wait\u{2026}");
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(sanitize("&lt;b&gt;bold&lt;/b&gt;"), "<b>bold</b>");
        assert_eq!(sanitize("say &quot;hi&quot;"), "say \"hi\"");
    }

    #[test]
    fn test_bare_ampersand_passes_through() {
        assert_eq!(sanitize("salt & pepper"), "salt & pepper");
        assert_eq!(sanitize("ends with &"), "ends with &");
    }

    #[test]
    fn test_unknown_entity_preserved() {
        assert_eq!(sanitize("&bogus;"), "&bogus;");
        assert_eq!(sanitize("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(sanitize("nothing to do here"), "nothing to do here");
        assert_eq!(sanitize(""), "");
    }
}
