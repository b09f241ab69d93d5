//! Identifier types for SN-P system components

use core::borrow::Borrow;
use core::fmt;

/// Unique identifier for a neuron
///
/// Descriptor files use free-form tokens (`N1`, `Output`, ...) so the id is a
/// thin wrapper over an owned string rather than a numeric handle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeuronId(String);

impl NeuronId {
    /// Create a new neuron ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NeuronId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NeuronId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NeuronId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
