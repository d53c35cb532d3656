//! Ordered header block.

use std::fmt;

/// Collection of email headers, kept in insertion order.
///
/// A value may only break across lines as RFC 5322 folding (`CRLF` followed
/// by a space or tab). Every other CR and LF is dropped on insertion, so a
/// value can never start a new header field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header whose name is a known field name.
    pub(crate) fn push(&mut self, name: &'static str, value: &str) {
        let value = keep_folds_only(value.trim());
        self.headers.push((name.to_string(), value));
    }

    /// Gets the first value for a header (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns an iterator over all headers in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Drops CR and LF unless they form a fold (`CRLF` then space or tab).
fn keep_folds_only(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    for (idx, ch) in value.char_indices() {
        match ch {
            '\r' if bytes.get(idx + 1) == Some(&b'\n')
                && matches!(bytes.get(idx + 2), Some(b' ' | b'\t')) =>
            {
                out.push(ch);
            }
            '\n' if idx > 0
                && bytes[idx - 1] == b'\r'
                && matches!(bytes.get(idx + 1), Some(b' ' | b'\t')) =>
            {
                out.push(ch);
            }
            '\r' | '\n' => {}
            _ => out.push(ch),
        }
    }
    out
}

impl fmt::Display for Headers {
    /// Writes `Name: value\r\n` for every header.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}
