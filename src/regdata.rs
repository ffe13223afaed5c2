//! Typed registry value data.
//!
//! [`RegistryData`] pairs a type tag with the raw byte payload of a
//! registry value and offers one decoded accessor per type. Decoding is
//! type-directed: asking for the string form of a binary-tagged value
//! fails with [`EvidenceError::TypeMismatch`] instead of attempting a
//! best-effort reinterpretation, so artifact decoders can trust the tag
//! they matched on.

use crate::error::{EvidenceError, Result};
use crate::utils::{encode_utf16, read_utf16_raw, read_utf16_string, read_u32_le, read_u64_le};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegType {
    /// No value type (REG_NONE).
    None,

    /// UTF-16 string (REG_SZ).
    String,

    /// String with unexpanded environment references (REG_EXPAND_SZ).
    ExpandString,

    /// Raw binary data (REG_BINARY).
    Binary,

    /// 32-bit little-endian integer (REG_DWORD).
    Dword,

    /// Sequence of UTF-16 strings (REG_MULTI_SZ).
    MultiString,

    /// 64-bit little-endian integer (REG_QWORD).
    Qword,

    /// Any tag this crate does not decode; raw bytes stay accessible.
    Unsupported(u32),
}

impl RegType {
    /// Parses a type tag from its numeric registry encoding.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => RegType::None,
            1 => RegType::String,
            2 => RegType::ExpandString,
            3 => RegType::Binary,
            4 => RegType::Dword,
            7 => RegType::MultiString,
            11 => RegType::Qword,
            other => RegType::Unsupported(other),
        }
    }

    /// Returns the numeric registry encoding of this tag.
    pub fn as_u32(&self) -> u32 {
        match self {
            RegType::None => 0,
            RegType::String => 1,
            RegType::ExpandString => 2,
            RegType::Binary => 3,
            RegType::Dword => 4,
            RegType::MultiString => 7,
            RegType::Qword => 11,
            RegType::Unsupported(other) => *other,
        }
    }

    /// Returns the conventional REG_* name of this tag.
    pub fn name(&self) -> String {
        match self {
            RegType::None => "REG_NONE".to_string(),
            RegType::String => "REG_SZ".to_string(),
            RegType::ExpandString => "REG_EXPAND_SZ".to_string(),
            RegType::Binary => "REG_BINARY".to_string(),
            RegType::Dword => "REG_DWORD".to_string(),
            RegType::MultiString => "REG_MULTI_SZ".to_string(),
            RegType::Qword => "REG_QWORD".to_string(),
            RegType::Unsupported(other) => format!("REG_UNKNOWN({})", other),
        }
    }
}

/// A typed registry datum: type tag plus raw byte payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryData {
    tag: RegType,
    bytes: Vec<u8>,
}

/// Shared REG_NONE datum, handed out where a value has no data.
pub(crate) static NONE_DATA: RegistryData = RegistryData {
    tag: RegType::None,
    bytes: Vec::new(),
};

impl RegistryData {
    /// Creates a datum from a tag and its raw payload.
    pub fn new(tag: RegType, bytes: Vec<u8>) -> Self {
        Self { tag, bytes }
    }

    /// Creates a datum from the numeric tag encoding, as read out of a
    /// hive value cell.
    pub fn from_raw(tag: u32, bytes: Vec<u8>) -> Self {
        Self::new(RegType::from_u32(tag), bytes)
    }

    /// Creates an empty REG_NONE datum.
    pub fn none() -> Self {
        Self::new(RegType::None, Vec::new())
    }

    /// Creates a REG_SZ datum, encoding `s` as null-terminated UTF-16LE.
    pub fn from_string(s: &str) -> Self {
        let mut bytes = encode_utf16(s);
        bytes.extend_from_slice(&[0, 0]);
        Self::new(RegType::String, bytes)
    }

    /// Creates a REG_EXPAND_SZ datum.
    pub fn from_expand_string(s: &str) -> Self {
        let mut bytes = encode_utf16(s);
        bytes.extend_from_slice(&[0, 0]);
        Self::new(RegType::ExpandString, bytes)
    }

    /// Creates a REG_MULTI_SZ datum: each string null-terminated, the list
    /// closed with one extra terminator. An empty list encodes to an empty
    /// payload so it round-trips to an empty sequence.
    pub fn from_multi_string<S: AsRef<str>>(strings: &[S]) -> Self {
        if strings.is_empty() {
            return Self::new(RegType::MultiString, Vec::new());
        }

        let mut joined = String::new();
        for s in strings {
            joined.push_str(s.as_ref());
            joined.push('\0');
        }
        joined.push('\0');
        Self::new(RegType::MultiString, encode_utf16(&joined))
    }

    /// Creates a REG_DWORD datum.
    pub fn from_dword(value: u32) -> Self {
        Self::new(RegType::Dword, value.to_le_bytes().to_vec())
    }

    /// Creates a REG_QWORD datum.
    pub fn from_qword(value: u64) -> Self {
        Self::new(RegType::Qword, value.to_le_bytes().to_vec())
    }

    /// Creates a REG_BINARY datum.
    pub fn from_binary(bytes: Vec<u8>) -> Self {
        Self::new(RegType::Binary, bytes)
    }

    /// Returns the type tag.
    pub fn tag(&self) -> RegType {
        self.tag
    }

    /// Returns the raw payload, regardless of tag.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes a REG_SZ or REG_EXPAND_SZ payload.
    ///
    /// Both tags carry the same string encoding; every other tag fails
    /// with [`EvidenceError::TypeMismatch`].
    pub fn as_string(&self) -> Result<String> {
        match self.tag {
            RegType::String | RegType::ExpandString => {
                read_utf16_string(&self.bytes, "registry string value")
            }
            other => Err(EvidenceError::type_mismatch("REG_SZ", other.name())),
        }
    }

    /// Decodes a REG_MULTI_SZ payload into its ordered string sequence.
    ///
    /// The payload stores each string null-terminated with one extra null
    /// closing the list: decoding strips the list terminator, splits on
    /// the embedded nulls, and drops the single trailing empty segment
    /// the per-string terminator leaves behind. An empty payload is an
    /// empty sequence, not an error.
    pub fn as_multi_string(&self) -> Result<Vec<String>> {
        if self.tag != RegType::MultiString {
            return Err(EvidenceError::type_mismatch(
                "REG_MULTI_SZ",
                self.tag.name(),
            ));
        }

        if self.bytes.is_empty() {
            return Ok(Vec::new());
        }

        let decoded = read_utf16_raw(&self.bytes, "registry multi-string value")?;
        let list = decoded.strip_suffix('\0').unwrap_or(&decoded);
        if list.is_empty() {
            return Ok(Vec::new());
        }

        let mut strings: Vec<String> = list.split('\0').map(str::to_string).collect();
        if strings.last().is_some_and(|s| s.is_empty()) {
            strings.pop();
        }
        Ok(strings)
    }

    /// Decodes a REG_DWORD payload.
    pub fn as_dword(&self) -> Result<u32> {
        if self.tag != RegType::Dword {
            return Err(EvidenceError::type_mismatch("REG_DWORD", self.tag.name()));
        }
        read_u32_le(&self.bytes)
    }

    /// Decodes a REG_QWORD payload.
    pub fn as_qword(&self) -> Result<u64> {
        if self.tag != RegType::Qword {
            return Err(EvidenceError::type_mismatch("REG_QWORD", self.tag.name()));
        }
        read_u64_le(&self.bytes)
    }

    /// Returns a REG_BINARY payload's bytes.
    pub fn as_binary(&self) -> Result<&[u8]> {
        if self.tag != RegType::Binary {
            return Err(EvidenceError::type_mismatch("REG_BINARY", self.tag.name()));
        }
        Ok(&self.bytes)
    }
}

impl std::fmt::Display for RegistryData {
    /// Renders a triage-friendly representation per tag.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tag {
            RegType::None => write!(f, "(none)"),
            RegType::String | RegType::ExpandString => match self.as_string() {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "(invalid string: {})", hex::encode(&self.bytes)),
            },
            RegType::MultiString => match self.as_multi_string() {
                Ok(strings) => write!(f, "{}", strings.join(", ")),
                Err(_) => write!(f, "(invalid multi-string: {})", hex::encode(&self.bytes)),
            },
            RegType::Dword => match self.as_dword() {
                Ok(d) => write!(f, "{} (0x{:08X})", d, d),
                Err(_) => write!(f, "(truncated dword)"),
            },
            RegType::Qword => match self.as_qword() {
                Ok(q) => write!(f, "{} (0x{:016X})", q, q),
                Err(_) => write!(f, "(truncated qword)"),
            },
            RegType::Binary | RegType::Unsupported(_) => {
                write!(f, "{}", hex::encode(&self.bytes))
            }
        }
    }
}
