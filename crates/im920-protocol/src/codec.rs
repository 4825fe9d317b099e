//! Line classification and outbound encoding.
//!
//! Everything the module sends is CRLF-terminated ASCII, but a single receive
//! burst can hold both the reply to the command in flight and any number of
//! unsolicited frames that arrived over the radio just before it:
//!
//! ```text
//! 00,06E5,B5:0A\r\n      <- inbound frame (has a ':')
//! 00,06E5,B5:0B\r\n      <- inbound frame
//! OK\r\n                 <- reply to the command
//! ```
//!
//! The first line without a colon starts the reply; everything before it that
//! has a colon is an inbound frame.

use log::trace;

use crate::constants::{FRAME_SEPARATOR, LINE_TERMINATOR, MAX_TXDA_SIZE, MNEMONIC_LEN};
use crate::error::{ProtocolError, ProtocolResult};

/// One classified piece of a receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// An unsolicited inbound frame line, including its `\r\n` when present.
    Frame(&'a [u8]),
    /// The reply to the command in flight: the rest of the buffer from the
    /// first colon-less line on, possibly unterminated or empty.
    Reply(&'a [u8]),
}

impl<'a> Line<'a> {
    /// Raw bytes of the line.
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            Line::Frame(bytes) | Line::Reply(bytes) => bytes,
        }
    }

    /// Check if this line is an inbound frame.
    pub fn is_frame(&self) -> bool {
        matches!(self, Line::Frame(_))
    }
}

/// Find the first `\r\n` in `buf`.
pub fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_TERMINATOR.len())
        .position(|window| window == LINE_TERMINATOR)
}

/// Find the last `\r\n` in `buf`.
pub fn rfind_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_TERMINATOR.len())
        .rposition(|window| window == LINE_TERMINATOR)
}

/// Split a receive buffer into inbound frames and the command reply.
///
/// Frames come first in arrival order. A [`Line::Reply`] is always the last
/// element when present; it is absent only when every fragment of the buffer
/// was frame-shaped.
pub fn classify_lines(buf: &[u8]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;

    loop {
        let rest = &buf[start..];
        let (fragment, next) = match find_terminator(rest) {
            Some(pos) => (&rest[..pos], Some(start + pos + LINE_TERMINATOR.len())),
            None => (rest, None),
        };

        if !fragment.contains(&FRAME_SEPARATOR) {
            lines.push(Line::Reply(rest));
            break;
        }

        // A frame keeps its terminator so it can be re-parsed later.
        let end = next.unwrap_or(buf.len());
        trace!("classified frame line: {:?}", String::from_utf8_lossy(&buf[start..end]));
        lines.push(Line::Frame(&buf[start..end]));

        match next {
            Some(next) => start = next,
            None => break,
        }
    }

    lines
}

/// Encode a command line: `"<MNEM> <PARAM>\r\n"`.
///
/// The separating space is always emitted, even for an empty parameter.
pub fn encode_command_line(mnemonic: &str, parameter: &str) -> ProtocolResult<Vec<u8>> {
    if mnemonic.len() != MNEMONIC_LEN || !mnemonic.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ProtocolError::InvalidMnemonic(mnemonic.to_string()));
    }

    let mut buf = Vec::with_capacity(MNEMONIC_LEN + 1 + parameter.len() + LINE_TERMINATOR.len());
    buf.extend_from_slice(mnemonic.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(parameter.as_bytes());
    buf.extend_from_slice(LINE_TERMINATOR);
    Ok(buf)
}

/// Encode an outbound payload as the uppercase hex parameter of `TXDA`.
///
/// Payloads longer than [`MAX_TXDA_SIZE`] are truncated. Returns the encoded
/// parameter and the number of payload bytes it carries.
pub fn encode_payload(payload: &[u8]) -> (String, usize) {
    let accepted = payload.len().min(MAX_TXDA_SIZE);
    (hex::encode_upper(&payload[..accepted]), accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_reply_only() {
        let lines = classify_lines(b"OK\r\n");
        assert_eq!(lines, vec![Line::Reply(b"OK\r\n")]);
    }

    #[test]
    fn test_classify_frames_before_reply() {
        let lines = classify_lines(b"00,06E5,B5:0A\r\n00,06E5,B5:0B\r\nOK\r\n");
        assert_eq!(
            lines,
            vec![
                Line::Frame(b"00,06E5,B5:0A\r\n"),
                Line::Frame(b"00,06E5,B5:0B\r\n"),
                Line::Reply(b"OK\r\n"),
            ]
        );
    }

    #[test]
    fn test_classify_unterminated_reply() {
        let lines = classify_lines(b"00,06E5,B5:0A\r\nOK");
        assert_eq!(lines, vec![Line::Frame(b"00,06E5,B5:0A\r\n"), Line::Reply(b"OK")]);
    }

    #[test]
    fn test_classify_multi_line_reply_is_kept_whole() {
        let lines = classify_lines(b"1010\r\n0101\r\n");
        assert_eq!(lines, vec![Line::Reply(b"1010\r\n0101\r\n")]);
    }

    #[test]
    fn test_classify_frame_only_leaves_empty_reply() {
        let lines = classify_lines(b"00,06E5,B5:0A\r\n");
        assert_eq!(lines, vec![Line::Frame(b"00,06E5,B5:0A\r\n"), Line::Reply(b"")]);
    }

    #[test]
    fn test_classify_unterminated_frame_has_no_reply() {
        let lines = classify_lines(b"00,06E5,B5:0A");
        assert_eq!(lines, vec![Line::Frame(b"00,06E5,B5:0A")]);
    }

    #[test]
    fn test_classify_empty_buffer() {
        assert_eq!(classify_lines(b""), vec![Line::Reply(b"")]);
        assert_eq!(classify_lines(b"\r\n"), vec![Line::Reply(b"\r\n")]);
    }

    #[test]
    fn test_encode_command_line() {
        assert_eq!(encode_command_line("RDID", "").unwrap(), b"RDID \r\n");
        assert_eq!(encode_command_line("STCH", "01").unwrap(), b"STCH 01\r\n");
    }

    #[test]
    fn test_encode_command_line_rejects_bad_mnemonic() {
        assert!(matches!(
            encode_command_line("RDI", ""),
            Err(ProtocolError::InvalidMnemonic(_))
        ));
        assert!(matches!(
            encode_command_line("RD D", ""),
            Err(ProtocolError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_encode_payload_uppercase() {
        let (param, n) = encode_payload(&[0x0A, 0x1F, 0xBE]);
        assert_eq!(param, "0A1FBE");
        assert_eq!(n, 3);
    }

    #[test]
    fn test_encode_payload_truncates() {
        let payload: Vec<u8> = (0..100).collect();
        let (param, n) = encode_payload(&payload);
        assert_eq!(n, MAX_TXDA_SIZE);
        assert_eq!(param.len(), MAX_TXDA_SIZE * 2);
        assert_eq!(param, hex::encode_upper(&payload[..MAX_TXDA_SIZE]));
    }

    #[test]
    fn test_terminator_search() {
        assert_eq!(find_terminator(b"AB\r\nCD\r\n"), Some(2));
        assert_eq!(rfind_terminator(b"AB\r\nCD\r\n"), Some(6));
        assert_eq!(find_terminator(b"ABCD"), None);
    }
}
