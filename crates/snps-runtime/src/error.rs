//! Error types for the SN-P runtime

use snps_model::{ModelError, NeuronId};
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the SN-P runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Data model or descriptor error
    #[error("Model error: {source}")]
    Model {
        #[from]
        /// Source model error
        source: ModelError,
    },

    /// Neuron id not present in the system
    #[error("Neuron `{id}` not found")]
    UnknownNeuron {
        /// The unresolved id
        id: NeuronId,
    },

    /// Neuron id already present in the system
    #[error("Neuron `{id}` already exists")]
    DuplicateNeuron {
        /// The repeated id
        id: NeuronId,
    },

    /// Structural mutation attempted after the batched snapshot was built
    #[error("Topology is frozen once the batched snapshot exists: {operation} rejected")]
    TopologyFrozen {
        /// The rejected operation
        operation: String,
    },

    /// The batched engine requires exactly one rule per neuron: none found
    #[error("Neuron `{id}` has no rule; the batched engine requires exactly one")]
    MissingRule {
        /// Neuron without a rule
        id: NeuronId,
    },

    /// The batched engine requires exactly one rule per neuron: several found
    #[error("Neuron `{id}` has {rules} rules; the batched engine requires exactly one")]
    MultiRuleNeuron {
        /// Neuron carrying several rules
        id: NeuronId,
        /// Number of rules found
        rules: usize,
    },

    /// The batched engine only accepts threshold-form conditions
    #[error("Neuron `{id}` uses a custom predicate; the batched engine only accepts thresholds")]
    UnsupportedCondition {
        /// Neuron carrying the predicate-form rule
        id: NeuronId,
    },
}

impl RuntimeError {
    /// Create an unknown neuron error
    pub fn unknown_neuron(id: impl Into<NeuronId>) -> Self {
        Self::UnknownNeuron { id: id.into() }
    }

    /// Create a duplicate neuron error
    pub fn duplicate_neuron(id: impl Into<NeuronId>) -> Self {
        Self::DuplicateNeuron { id: id.into() }
    }

    /// Create a frozen topology error
    pub fn topology_frozen(operation: impl Into<String>) -> Self {
        Self::TopologyFrozen {
            operation: operation.into(),
        }
    }
}
