use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::bytes::Regex;
use tracing::{debug, warn};

/// How far into the page to look for a `<meta charset>` declaration.
const SNIFF_LEN: usize = 1024;

static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#).unwrap()
});

/// Decode a saved or fetched page. A BOM wins, then a `<meta charset>` in the
/// head, then UTF-8 if the bytes are valid, else windows-1252 (the superset
/// browsers use for Latin-1 pages).
pub fn decode_page(source: &str, bytes: &[u8]) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| declared_charset(bytes))
        .unwrap_or_else(|| {
            if std::str::from_utf8(bytes).is_ok() {
                UTF_8
            } else {
                WINDOWS_1252
            }
        });

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(source, encoding = used.name(), "Page has bytes invalid for its encoding, replaced with U+FFFD");
    } else {
        debug!(source, encoding = used.name(), "Decoded page");
    }
    text.into_owned()
}

fn declared_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let label = META_CHARSET_RE.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latin1(text: &str) -> Vec<u8> {
        let (bytes, _, unmappable) = WINDOWS_1252.encode(text);
        assert!(!unmappable);
        bytes.into_owned()
    }

    #[test]
    fn utf8_passes_through() {
        let page = "<p>JOÃO SILVA</p>";
        assert_eq!(decode_page("t", page.as_bytes()), page);
    }

    #[test]
    fn undeclared_latin1_falls_back_to_windows_1252() {
        let bytes = latin1("<td>RELATOR</td><td><b>JOÃO SILVA</b></td><b>MARIA JOSÉ</b>");
        assert!(std::str::from_utf8(&bytes).is_err());
        let text = decode_page("t", &bytes);
        assert!(text.contains("JOÃO SILVA"));
        assert!(text.contains("MARIA JOSÉ"));
        assert!(!text.contains('\u{FFFD}'));
    }

    #[test]
    fn meta_charset_is_honoured() {
        let bytes = latin1(r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1"></head><body>Distribuído</body></html>"#);
        assert_eq!(declared_charset(&bytes), Some(WINDOWS_1252));
        assert!(decode_page("t", &bytes).contains("Distribuído"));

        let short = br#"<meta charset='utf-8'>"#;
        assert_eq!(declared_charset(short), Some(UTF_8));
    }

    #[test]
    fn bom_wins_over_meta() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<meta charset=\"iso-8859-1\"><p>AUTUAÇÃO</p>".as_bytes());
        let text = decode_page("t", &bytes);
        assert!(text.contains("AUTUAÇÃO"));
        assert!(!text.starts_with('\u{FEFF}'));
    }
}
