//! Error types for the SN-P data model and descriptor format

use crate::ids::NeuronId;
use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur in the data model or descriptor parser
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O error reading or writing a descriptor file
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Source I/O error
        source: std::io::Error,
    },

    /// First significant line of a descriptor was not the neuron header
    #[error("Invalid descriptor header: expected `*N`, found `{found}`")]
    InvalidHeader {
        /// The line that was found instead
        found: String,
    },

    /// The descriptor ended before the synapse section started
    #[error("Descriptor has no synapse section (`*S` marker missing)")]
    MissingSynapseSection,

    /// The synapse section declared zero synapses
    #[error("Descriptor declares no synapses")]
    EmptySynapseSection,

    /// A descriptor line could not be parsed
    #[error("Parse error at line {line}: {reason}")]
    ParseLine {
        /// 1-based line number in the descriptor text
        line: usize,
        /// Reason the line was rejected
        reason: String,
    },

    /// A neuron id was declared more than once
    #[error("Duplicate neuron id `{id}`")]
    DuplicateNeuron {
        /// The repeated id
        id: NeuronId,
    },

    /// A synapse endpoint references an undeclared neuron
    #[error("Unknown neuron id `{id}`")]
    UnknownNeuron {
        /// The unresolved id
        id: NeuronId,
    },

    /// Rule parameters outside the valid range
    #[error("Invalid rule: {reason}")]
    InvalidRule {
        /// Reason the rule was rejected
        reason: String,
    },

    /// A rule cannot be represented in the textual format
    #[error("Rule on neuron `{id}` has no textual form (custom predicate condition)")]
    UnsupportedRule {
        /// Neuron carrying the predicate-form rule
        id: NeuronId,
    },
}

impl ModelError {
    /// Create an invalid header error
    pub fn invalid_header(found: impl Into<String>) -> Self {
        Self::InvalidHeader {
            found: found.into(),
        }
    }

    /// Create a line parse error
    pub fn parse_line(line: usize, reason: impl Into<String>) -> Self {
        Self::ParseLine {
            line,
            reason: reason.into(),
        }
    }

    /// Create a duplicate neuron error
    pub fn duplicate_neuron(id: impl Into<NeuronId>) -> Self {
        Self::DuplicateNeuron { id: id.into() }
    }

    /// Create an unknown neuron error
    pub fn unknown_neuron(id: impl Into<NeuronId>) -> Self {
        Self::UnknownNeuron { id: id.into() }
    }

    /// Create an invalid rule error
    pub fn invalid_rule(reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            reason: reason.into(),
        }
    }

    /// Create an unsupported rule error
    pub fn unsupported_rule(id: impl Into<NeuronId>) -> Self {
        Self::UnsupportedRule { id: id.into() }
    }
}
