//! Utility functions for binary decoding and string conversion.

use crate::error::{EvidenceError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::UTF_16LE;
use std::io::Cursor;

/// Decodes a UTF-16LE string from a byte slice, trimming null terminators.
///
/// Registry strings are typically null-terminated. This function decodes
/// UTF-16LE data and removes trailing null characters.
///
/// # Errors
///
/// Returns an error if the data length is not even (UTF-16 requires 2-byte
/// units) or if the UTF-16 decoding fails.
pub fn read_utf16_string(data: &[u8], context: &str) -> Result<String> {
    Ok(read_utf16_raw(data, context)?
        .trim_end_matches('\0')
        .to_string())
}

/// Decodes a UTF-16LE string without trimming terminators.
///
/// Multi-string payloads carry significant embedded and trailing nulls, so
/// the caller handles terminator stripping itself.
pub fn read_utf16_raw(data: &[u8], context: &str) -> Result<String> {
    if data.is_empty() {
        return Ok(String::new());
    }

    // UTF-16 requires an even number of bytes
    if data.len() % 2 != 0 {
        return Err(EvidenceError::InvalidUtf16 {
            context: context.to_string(),
        });
    }

    let (decoded, _encoding, had_errors) = UTF_16LE.decode(data);

    if had_errors {
        return Err(EvidenceError::InvalidUtf16 {
            context: context.to_string(),
        });
    }

    Ok(decoded.into_owned())
}

/// Encodes a string as UTF-16LE bytes without a terminator.
pub fn encode_utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// Reads a little-endian u32 from the start of a byte slice.
pub fn read_u32_le(data: &[u8]) -> Result<u32> {
    if data.len() < 4 {
        return Err(EvidenceError::TruncatedData {
            expected: 4,
            actual: data.len(),
        });
    }

    let mut cursor = Cursor::new(data);
    Ok(cursor.read_u32::<LittleEndian>()?)
}

/// Reads a little-endian u64 from the start of a byte slice.
pub fn read_u64_le(data: &[u8]) -> Result<u64> {
    if data.len() < 8 {
        return Err(EvidenceError::TruncatedData {
            expected: 8,
            actual: data.len(),
        });
    }

    let mut cursor = Cursor::new(data);
    Ok(cursor.read_u64::<LittleEndian>()?)
}
