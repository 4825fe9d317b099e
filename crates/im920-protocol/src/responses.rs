//! Response parsing for the IM920 protocol.
//!
//! Replies from the module are either:
//! - Status: `OK\r\n` or `NG\r\n`
//! - Values: hex numbers, one per line (`RDID`, `RDCH`, `RRID`, ...)
//! - Inbound frames: `node,id,rssi:payload\r\n`

use log::trace;

use crate::codec::{find_terminator, rfind_terminator};
use crate::constants::{FIELD_SEPARATOR, FRAME_SEPARATOR, REPLY_NG, REPLY_OK};
use crate::error::{ProtocolError, ProtocolResult};
use crate::types::{Id, InboundFrame, Node, ReadInfo, Rssi};

/// Check if a raw reply is exactly `OK\r\n`.
pub fn is_ok(reply: &[u8]) -> bool {
    reply == REPLY_OK
}

/// Check if a raw reply is exactly `NG\r\n`.
pub fn is_ng(reply: &[u8]) -> bool {
    reply == REPLY_NG
}

/// Strip a reply down to its text, up to the last `\r\n`.
///
/// Multi-line replies keep their inner terminators.
pub fn reply_text(reply: &[u8]) -> ProtocolResult<&[u8]> {
    match rfind_terminator(reply) {
        Some(end) => Ok(&reply[..end]),
        None => Err(ProtocolError::missing_terminator(reply)),
    }
}

/// Decode a 1 or 2 byte hex number.
///
/// Odd-length input is zero-padded on the left, so `"1"` is `0x0001` and
/// `"101"` is `0x0101`.
pub fn parse_uint16(text: &str) -> ProtocolResult<u16> {
    if text.is_empty() {
        return Err(ProtocolError::EmptyValue);
    }

    let bytes = if text.len() % 2 == 1 {
        hex::decode(format!("0{}", text))
    } else {
        hex::decode(text)
    }
    .map_err(|_| ProtocolError::InvalidHex(text.to_string()))?;

    match bytes.as_slice() {
        [low] => Ok(u16::from(*low)),
        [high, low] => Ok(u16::from_be_bytes([*high, *low])),
        other => Err(ProtocolError::Size {
            max: 2,
            actual: other.len(),
        }),
    }
}

/// Decode a newline-separated list of hex numbers.
///
/// A trailing `\r` on each line is ignored. Empty input yields an empty list.
pub fn parse_uint16_lines(text: &str) -> ProtocolResult<Vec<u16>> {
    text.lines().map(parse_uint16).collect()
}

/// Decode a single hex field that must be exactly one byte.
fn parse_byte_field(name: &str, field: &str) -> ProtocolResult<u8> {
    match hex::decode(field) {
        Ok(bytes) if bytes.len() == 1 => Ok(bytes[0]),
        _ => Err(ProtocolError::malformed_header(format!(
            "invalid {} field: {:?}",
            name, field
        ))),
    }
}

/// Parse the `node,id,rssi` header of an inbound frame.
pub fn parse_read_info(header: &str) -> ProtocolResult<ReadInfo> {
    let fields: Vec<&str> = header.split(FIELD_SEPARATOR as char).collect();
    if fields.len() < 3 {
        return Err(ProtocolError::malformed_header(format!(
            "expected 3 fields, got {}: {:?}",
            fields.len(),
            header
        )));
    }

    let node = parse_byte_field("node", fields[0])?;
    let id = parse_uint16(fields[1]).map_err(|e| {
        ProtocolError::malformed_header(format!("invalid id field {:?}: {}", fields[1], e))
    })?;
    let rssi = parse_byte_field("rssi", fields[2])?;

    Ok(ReadInfo {
        node: Node(node),
        id: Id(id),
        rssi: Rssi(rssi),
    })
}

/// Parse an inbound frame line: `node,id,rssi:XX,XX,...\r\n`.
pub fn parse_frame(line: &[u8]) -> ProtocolResult<InboundFrame> {
    let text = std::str::from_utf8(line)
        .map_err(|_| ProtocolError::malformed_header("frame is not valid ASCII"))?;

    let mut parts = text.split(FRAME_SEPARATOR as char);
    let header = parts.next().unwrap_or_default();
    let data = parts.next().ok_or_else(|| {
        trace!("frame without separator: {:?}", text);
        ProtocolError::malformed_header(format!("missing ':' separator: {:?}", text))
    })?;

    let info = parse_read_info(header)?;

    let data_end =
        find_terminator(data.as_bytes()).ok_or_else(|| ProtocolError::missing_terminator(data.as_bytes()))?;
    let digits: String = data[..data_end]
        .chars()
        .filter(|c| *c != FIELD_SEPARATOR as char)
        .collect();
    let payload = hex::decode(&digits).map_err(|_| ProtocolError::InvalidHex(digits.clone()))?;
    if payload.is_empty() {
        return Err(ProtocolError::EmptyPayload);
    }

    Ok(InboundFrame { info, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_replies() {
        assert!(is_ok(b"OK\r\n"));
        assert!(!is_ok(b"OK"));
        assert!(!is_ok(b"FUGA\r\n"));
        assert!(is_ng(b"NG\r\n"));
        assert!(!is_ng(b"NG"));
    }

    #[test]
    fn test_reply_text() {
        assert_eq!(reply_text(b"FUGA\r\n").unwrap(), b"FUGA");
        assert_eq!(reply_text(b"FUGA\r\nFUGA\r\n").unwrap(), b"FUGA\r\nFUGA");
        assert_eq!(reply_text(b"\r\n").unwrap(), b"");
        assert!(matches!(
            reply_text(b"FUGA"),
            Err(ProtocolError::MissingTerminator(_))
        ));
    }

    #[test]
    fn test_parse_uint16() {
        assert_eq!(parse_uint16("0").unwrap(), 0x0000);
        assert_eq!(parse_uint16("1").unwrap(), 0x0001);
        assert_eq!(parse_uint16("10").unwrap(), 0x0010);
        assert_eq!(parse_uint16("101").unwrap(), 0x0101);
        assert_eq!(parse_uint16("1010").unwrap(), 0x1010);
        assert_eq!(parse_uint16("ffff").unwrap(), 0xFFFF);
    }

    #[test]
    fn test_parse_uint16_errors() {
        assert_eq!(parse_uint16(""), Err(ProtocolError::EmptyValue));
        assert_eq!(
            parse_uint16("01010"),
            Err(ProtocolError::Size { max: 2, actual: 3 })
        );
        assert!(matches!(parse_uint16("XY"), Err(ProtocolError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_uint16_roundtrip_samples() {
        for value in [0u16, 1, 0x00FF, 0x0100, 0x06E5, 0x7FFF, 0xFFFF] {
            let text = format!("{:04X}", value);
            assert_eq!(parse_uint16(&text).unwrap(), value);
        }
    }

    #[test]
    fn test_parse_uint16_lines() {
        assert_eq!(parse_uint16_lines("1010\r\n0101").unwrap(), vec![0x1010, 0x0101]);
        assert_eq!(parse_uint16_lines("1010").unwrap(), vec![0x1010]);
        assert!(parse_uint16_lines("").unwrap().is_empty());
        assert!(parse_uint16_lines("01010").is_err());
    }

    #[test]
    fn test_parse_frame() {
        let frame = parse_frame(b"00,06E5,B5:0A,1F,76\r\n").unwrap();
        assert_eq!(frame.payload, vec![0x0A, 0x1F, 0x76]);
        assert_eq!(
            frame.info,
            ReadInfo {
                node: Node(0x00),
                id: Id(0x06E5),
                rssi: Rssi(0xB5),
            }
        );
    }

    #[test]
    fn test_parse_frame_short_id() {
        let frame = parse_frame(b"01,6E6,B6:0A\r\n").unwrap();
        assert_eq!(frame.info.node, Node(0x01));
        assert_eq!(frame.info.id, Id(0x06E6));
        assert_eq!(frame.info.rssi, Rssi(0xB6));
    }

    #[test]
    fn test_parse_frame_ignores_trailing_lines() {
        let frame = parse_frame(b"00,06E5,B5:0A\r\nOK\r\n").unwrap();
        assert_eq!(frame.payload, vec![0x0A]);
    }

    #[test]
    fn test_parse_frame_missing_terminator() {
        assert!(matches!(
            parse_frame(b"00,06E5,B5:0A,1F,76"),
            Err(ProtocolError::MissingTerminator(_))
        ));
    }

    #[test]
    fn test_parse_frame_empty_payload() {
        assert_eq!(parse_frame(b"00,06E5,B5:\r\n"), Err(ProtocolError::EmptyPayload));
    }

    #[test]
    fn test_parse_frame_missing_separator() {
        assert!(matches!(
            parse_frame(b"00,06E5,B5\r\n"),
            Err(ProtocolError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_parse_frame_short_header() {
        assert!(matches!(
            parse_frame(b"00,06E5:0A\r\n"),
            Err(ProtocolError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_parse_frame_bad_header_hex() {
        assert!(matches!(
            parse_frame(b"ZZ,06E5,B5:0A\r\n"),
            Err(ProtocolError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_frame(b"00,06E5,B:0A\r\n"),
            Err(ProtocolError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_frame(b"00,0106E5,B5:0A\r\n"),
            Err(ProtocolError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_parse_frame_bad_payload_hex() {
        assert!(matches!(
            parse_frame(b"00,06E5,B5:0G\r\n"),
            Err(ProtocolError::InvalidHex(_))
        ));
    }
}
