//! Header-safe encoding utilities.
//!
//! Supports Base64, RFC 2047 encoded words and RFC 5322 display-name quoting.
//! Every function here strips CR and LF from its input first. The only line
//! breaks in the output are folds (`CRLF SP`), so nothing produced by this
//! module can start a new header field.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::borrow::Cow;

/// Charset announced in encoded words.
const CHARSET: &str = "UTF-8";

/// Maximum length of a single encoded word (RFC 2047 section 2).
const MAX_ENCODED_WORD: usize = 75;

/// Raw bytes that fit in one encoded word once `=?UTF-8?B?` and `?=` are added.
const MAX_CHUNK_BYTES: usize = (MAX_ENCODED_WORD - CHARSET.len() - 7) / 4 * 3;

/// Folding whitespace placed between encoded words and long runs of text.
const FOLD: &str = "\r\n ";

/// Column after which plain text is folded at the next space.
const FOLD_WIDTH: usize = 76;

/// Longest space-free run left as plain text. Longer runs are encoded so
/// they can be split, keeping every line under the 998-byte limit of
/// RFC 5322 section 2.1.1.
const MAX_RAW_WORD: usize = 600;

/// Characters that force a display name into a quoted string.
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '"'];

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Removes every CR and LF from `value`.
///
/// Borrows when there is nothing to strip.
#[must_use]
pub fn strip_line_breaks(value: &str) -> Cow<'_, str> {
    if value.contains(['\r', '\n']) {
        Cow::Owned(value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect())
    } else {
        Cow::Borrowed(value)
    }
}

/// Returns true if `text` cannot travel as a raw header value.
///
/// Anything outside printable ASCII (plus tab) needs encoding, and so does
/// text that would itself look like an encoded word.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    text.contains("=?") || !text.bytes().all(|b| matches!(b, b' '..=b'~' | b'\t'))
}

/// Encodes a header value using RFC 2047 `B` encoding if needed.
///
/// Format: `=?UTF-8?B?encoded-text?=`. Long values are split on character
/// boundaries into several encoded words, one per physical line, joined by
/// folding whitespace (`CRLF SP`). Plain ASCII values are folded at spaces
/// once a line passes 76 columns. Either way the result is a single header
/// field whose lines stay within the RFC 5322 limit.
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    let text = strip_line_breaks(text);
    if needs_encoding(&text) || text.split(' ').any(|word| word.len() > MAX_RAW_WORD) {
        return encode_words(&text);
    }
    fold(&text)
}

/// Encodes a display name for use in an address header.
///
/// Non-ASCII names become encoded words; ASCII names containing specials
/// such as `,` or `@` are wrapped in a quoted string.
#[must_use]
pub fn encode_display_name(name: &str) -> String {
    let name = strip_line_breaks(name);
    let name = name.trim();
    if needs_encoding(name) || name.len() > MAX_RAW_WORD {
        return encode_words(name);
    }

    if name.contains(SPECIALS) {
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push('"');
        for ch in name.chars() {
            if matches!(ch, '"' | '\\') {
                quoted.push('\\');
            }
            quoted.push(ch);
        }
        quoted.push('"');
        return quoted;
    }

    fold(name)
}

/// Splits `text` into encoded words of at most 75 bytes each.
fn encode_words(text: &str) -> String {
    let mut words = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if idx + ch.len_utf8() - start > MAX_CHUNK_BYTES {
            words.push(encoded_word(&text[start..idx]));
            start = idx;
        }
    }
    if start < text.len() {
        words.push(encoded_word(&text[start..]));
    }

    words.join(FOLD)
}

/// Folds plain text at spaces; unfolding restores the input exactly.
fn fold(text: &str) -> String {
    if text.len() <= FOLD_WIDTH {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / FOLD_WIDTH * 2);
    let mut line_len = 0;
    for (i, word) in text.split(' ').enumerate() {
        if i > 0 {
            if !word.is_empty() && line_len + 1 + word.len() > FOLD_WIDTH {
                out.push_str(FOLD);
                line_len = 1;
            } else {
                out.push(' ');
                line_len += 1;
            }
        }
        out.push_str(word);
        line_len += word.len();
    }
    out
}

fn encoded_word(chunk: &str) -> String {
    format!("=?{CHARSET}?B?{}?=", encode_base64(chunk.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_encode() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(encode_base64(b"user@example.com"), "dXNlckBleGFtcGxlLmNvbQ==");
    }

    #[test]
    fn test_strip_line_breaks() {
        assert_eq!(strip_line_breaks("plain"), "plain");
        assert!(matches!(strip_line_breaks("plain"), Cow::Borrowed(_)));
        assert_eq!(strip_line_breaks("a\r\nBcc: x@y"), "aBcc: x@y");
        assert_eq!(strip_line_breaks("\n\r"), "");
    }

    #[test]
    fn test_needs_encoding() {
        assert!(!needs_encoding("Hello world"));
        assert!(!needs_encoding("tab\tseparated"));
        assert!(needs_encoding("Héllo"));
        assert!(needs_encoding("=?utf-8?B?abc?="));
        assert!(needs_encoding("bell\u{7}"));
    }

    #[test]
    fn test_rfc2047_encode() {
        assert_eq!(encode_rfc2047("Hello"), "Hello");
        assert_eq!(encode_rfc2047("Héllo"), "=?UTF-8?B?SMOpbGxv?=");
    }

    #[test]
    fn test_rfc2047_strips_line_breaks_before_encoding() {
        assert_eq!(encode_rfc2047("Hi\r\nBcc: evil@example.com"), "HiBcc: evil@example.com");
        assert_eq!(encode_rfc2047("Hé\nllo"), "=?UTF-8?B?SMOpbGxv?=");
    }

    #[test]
    fn test_rfc2047_splits_long_values() {
        let subject = "Solicitud de información ".repeat(6);
        let encoded = encode_rfc2047(&subject);

        let words: Vec<&str> = encoded.split(FOLD).collect();
        assert!(words.len() > 1);
        for word in &words {
            assert!(word.starts_with("=?UTF-8?B?"));
            assert!(word.ends_with("?="));
            assert!(word.len() <= MAX_ENCODED_WORD);
        }

        let decoded: Vec<u8> = words
            .iter()
            .flat_map(|w| {
                let inner = &w["=?UTF-8?B?".len()..w.len() - 2];
                STANDARD.decode(inner).unwrap()
            })
            .collect();
        assert_eq!(String::from_utf8(decoded).unwrap(), subject);
    }

    #[test]
    fn test_rfc2047_never_splits_a_character() {
        let text = "€".repeat(40);
        for word in encode_rfc2047(&text).split(FOLD) {
            let inner = &word["=?UTF-8?B?".len()..word.len() - 2];
            let bytes = STANDARD.decode(inner).unwrap();
            assert!(String::from_utf8(bytes).is_ok());
        }
    }

    #[test]
    fn test_long_subject_lines_stay_short() {
        let subject = "Solicitud de información ".repeat(30);
        let encoded = encode_rfc2047(subject.trim());
        let header = format!("Subject: {encoded}");

        assert!(header.lines().count() > 1);
        for line in header.split("\r\n") {
            assert!(line.len() <= 998, "line of {} bytes", line.len());
        }
        for line in header.split("\r\n").skip(1) {
            assert!(line.starts_with(' '));
        }
    }

    #[test]
    fn test_plain_text_folds_at_spaces() {
        assert_eq!(encode_rfc2047("Short subject"), "Short subject");

        let subject = "New enquiry from the contact form ".repeat(10);
        let subject = subject.trim();
        let folded = encode_rfc2047(subject);

        assert!(folded.contains(FOLD));
        assert_eq!(folded.replace("\r\n", ""), subject);
        for line in folded.split("\r\n") {
            assert!(line.len() <= FOLD_WIDTH);
        }
    }

    #[test]
    fn test_unbreakable_run_is_encoded() {
        let run = "x".repeat(MAX_RAW_WORD + 1);
        let encoded = encode_rfc2047(&run);
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.split("\r\n").all(|line| line.len() <= MAX_ENCODED_WORD + 1));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(encode_display_name("Front Desk"), "Front Desk");
        assert_eq!(encode_display_name("J. Smith"), "J. Smith");
        assert_eq!(encode_display_name("Acme, Inc."), "\"Acme, Inc.\"");
        assert_eq!(encode_display_name("Say \"hi\""), "\"Say \\\"hi\\\"\"");
        assert_eq!(encode_display_name("El Señor"), "=?UTF-8?B?RWwgU2XDsW9y?=");
        assert_eq!(encode_display_name(" Desk\r\n "), "Desk");

        let long = "Acme, Inc. ".repeat(80);
        let encoded = encode_display_name(&long);
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.split("\r\n").all(|line| line.len() <= MAX_ENCODED_WORD + 1));
    }
}
