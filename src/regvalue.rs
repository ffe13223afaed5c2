//! Polymorphic registry values over hive-backed and container-backed data.
//!
//! A [`RegistryValue`] is a name plus [`RegistryData`], behind one read
//! contract regardless of where the value came from: a decoded hive cell
//! (immutable view) or an in-memory container (synthesized defaults,
//! merged values). Callers cannot distinguish the backing by behavior —
//! only `set_name` differs, by contract: it mutates a container-backed
//! value in place and fails with `Unsupported` on the read-only
//! hive-backed view.

use crate::error::{EvidenceError, Result};
use crate::regdata::{RegistryData, NONE_DATA};
use std::sync::Arc;

/// A registry value decoded from a live hive by an external hive parser.
///
/// This is the handoff object at the hive-parsing seam: the parser decodes
/// the value cell (name, type tag, payload) and this crate wraps the
/// result without copying it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHiveValue {
    name: String,
    data: RegistryData,
}

impl DecodedHiveValue {
    /// Creates a decoded value from its name and typed data.
    pub fn new(name: impl Into<String>, data: RegistryData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Creates a decoded value from the raw fields of a hive value cell.
    pub fn from_raw(name: impl Into<String>, tag: u32, bytes: Vec<u8>) -> Self {
        Self::new(name, RegistryData::from_raw(tag, bytes))
    }

    /// Returns the value name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the typed data.
    pub fn data(&self) -> &RegistryData {
        &self.data
    }
}

/// A named, typed registry value with interchangeable backings.
///
/// The closed set of variants is the whole polymorphism: no open-ended
/// hierarchy, no downcasting. Equality compares name and decoded data
/// only — two values with matching name and data are equivalent for
/// analysis purposes whichever way they were constructed.
#[derive(Debug, Clone)]
pub enum RegistryValue {
    /// Read-only view over a value decoded from hive bytes.
    Hive(Arc<DecodedHiveValue>),

    /// Owns its name and data; synthesized outside a live hive.
    Container {
        /// Value name.
        name: String,
        /// Typed data.
        data: RegistryData,
    },

    /// The invalid default; safe to hold and inspect, fails everything
    /// else closed.
    Null,
}

impl RegistryValue {
    /// Wraps an externally-decoded hive value.
    ///
    /// Stores the shared decoded object directly; nothing is copied
    /// beyond what it already holds.
    pub fn from_hive(decoded: Arc<DecodedHiveValue>) -> Self {
        RegistryValue::Hive(decoded)
    }

    /// Creates a container-backed value owning `name` and `data`.
    pub fn from_parts(name: impl Into<String>, data: RegistryData) -> Self {
        RegistryValue::Container {
            name: name.into(),
            data,
        }
    }

    /// Returns the invalid null value.
    pub fn null() -> Self {
        RegistryValue::Null
    }

    /// Returns true if this value exists and is well-formed.
    pub fn is_valid(&self) -> bool {
        !matches!(self, RegistryValue::Null)
    }

    /// Returns the value name (empty for the null value).
    pub fn name(&self) -> &str {
        match self {
            RegistryValue::Hive(decoded) => decoded.name(),
            RegistryValue::Container { name, .. } => name,
            RegistryValue::Null => "",
        }
    }

    /// Renames the value.
    ///
    /// Container-backed values mutate in place. Hive-backed values are
    /// read-only views into decoded hive bytes and fail with
    /// [`EvidenceError::Unsupported`], as does the null value.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        match self {
            RegistryValue::Container { name: current, .. } => {
                *current = name.into();
                Ok(())
            }
            RegistryValue::Hive(_) => Err(EvidenceError::Unsupported(
                "renaming a hive-backed registry value".to_string(),
            )),
            RegistryValue::Null => Err(EvidenceError::Unsupported(
                "renaming the null registry value".to_string(),
            )),
        }
    }

    /// Returns the typed data (a shared REG_NONE datum for the null value).
    pub fn data(&self) -> &RegistryData {
        match self {
            RegistryValue::Hive(decoded) => decoded.data(),
            RegistryValue::Container { data, .. } => data,
            RegistryValue::Null => &NONE_DATA,
        }
    }
}

impl Default for RegistryValue {
    fn default() -> Self {
        RegistryValue::Null
    }
}

impl PartialEq for RegistryValue {
    /// Backing-agnostic: name and data decide equivalence.
    fn eq(&self, other: &Self) -> bool {
        self.is_valid() == other.is_valid()
            && self.name() == other.name()
            && self.data() == other.data()
    }
}

impl Eq for RegistryValue {}
