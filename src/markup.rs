//! Normalisation of HTML-escaped text columns.
//!
//! Question and answer text is stored escaped. Forms may post either raw text
//! or text that was already escaped once, so every write unescapes first and
//! escapes again; the stored form never accumulates `&amp;amp;` layers.

use html_escape::{decode_html_entities, encode_safe};

/// Unescape, then escape once.
pub fn normalize_escaped(text: &str) -> String {
    let raw = decode_html_entities(text);
    encode_safe(&raw).into_owned()
}

/// Same as [`normalize_escaped`] for optional columns; empty stays empty.
pub fn normalize_optional(text: Option<String>) -> Option<String> {
    text.map(|t| {
        if t.is_empty() {
            t
        } else {
            normalize_escaped(&t)
        }
    })
}

/// Text as it should be shown to a reader.
pub fn unescape(text: &str) -> String {
    decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_is_escaped() {
        assert_eq!(normalize_escaped("<b>ping</b>"), "&lt;b&gt;ping&lt;&#x2F;b&gt;");
    }

    #[test]
    fn escaping_is_idempotent() {
        let once = normalize_escaped("a < b && \"c\"");
        assert_eq!(normalize_escaped(&once), once);
    }

    #[test]
    fn unescape_restores_original() {
        let stored = normalize_escaped("Какой IP у <host>?");
        assert_eq!(unescape(&stored), "Какой IP у <host>?");
    }

    #[test]
    fn optional_values() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some(String::new())), Some(String::new()));
        assert_eq!(
            normalize_optional(Some("x > y".to_string())),
            Some("x &gt; y".to_string())
        );
    }
}
