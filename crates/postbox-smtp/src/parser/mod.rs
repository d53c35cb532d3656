//! SMTP response parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from response lines.
///
/// SMTP replies can be single-line or multi-line:
/// - Single: `250 OK\r\n`
/// - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
///
/// Every line must start with the same three-digit code.
///
/// # Errors
///
/// Returns an error if the reply is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let Some(first) = lines.first() else {
        return Err(Error::InvalidReply("empty reply".into()));
    };

    let code = reply_code(first)?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if reply_code(line)? != code {
            return Err(Error::InvalidReply(format!(
                "reply code changed mid-reply: {line}"
            )));
        }

        match line.as_bytes().get(3) {
            // Just code, no message
            None => message.push(String::new()),
            Some(b' ' | b'-') => message.push(line[4..].to_string()),
            Some(_) => {
                return Err(Error::InvalidReply(format!("malformed reply line: {line}")));
            }
        }
    }

    Ok(Reply::from_wire(code, message, lines))
}

/// Reads the three-digit code at the start of a reply line.
///
/// # Errors
///
/// Returns an error if the line does not start with three ASCII digits.
pub fn reply_code(line: &str) -> Result<ReplyCode> {
    let digits = line.as_bytes().get(..3);
    match digits {
        Some(d) if d.iter().all(u8::is_ascii_digit) => {
            let code = d
                .iter()
                .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
            Ok(ReplyCode::new(code))
        }
        _ => Err(Error::InvalidReply(format!("missing reply code: {line}"))),
    }
}

/// Checks if a line is the last line of a multi-line reply.
///
/// Multi-line replies use `-` separator for continuation and ` ` for the last
/// line. A bare code is also a complete reply.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    match line.as_bytes().get(3) {
        None => line.len() == 3,
        Some(b) => *b != b'-',
    }
}
