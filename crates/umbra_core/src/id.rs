//! String-based identifiers with precomputed hashes

use core::fmt;
use alloc::boxed::Box;
use alloc::string::String;

/// A string-based identifier for named resources
///
/// Stores the name alongside a precomputed hash so repeated lookups and
/// comparisons stay cheap while the original text remains available for
/// diagnostics.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NamedId {
    name: Box<str>,
    hash: u64,
}

impl NamedId {
    /// Create a new named ID
    pub fn new(name: &str) -> Self {
        // Simple FNV-1a hash
        let mut hash = 0xcbf29ce484222325u64;
        for byte in name.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }

        Self {
            name: name.into(),
            hash,
        }
    }

    /// Get the name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the precomputed hash
    #[inline]
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl fmt::Debug for NamedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamedId({:?})", self.name)
    }
}

impl fmt::Display for NamedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for NamedId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NamedId {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl PartialEq<str> for NamedId {
    fn eq(&self, other: &str) -> bool {
        &*self.name == other
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for NamedId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.name)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for NamedId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
