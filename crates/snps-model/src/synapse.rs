//! Directed synapse edges

use crate::ids::NeuronId;

/// Directed edge between two neuron identifiers
///
/// A synapse is a pure relation and carries no state. Several synapses may
/// share a source (fan-out duplicates the released amount to each) or a
/// target (fan-in sums the independently delivered amounts).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Synapse {
    /// Source neuron id
    pub source: NeuronId,
    /// Target neuron id
    pub target: NeuronId,
}

impl Synapse {
    /// Create a new synapse
    pub fn new(source: impl Into<NeuronId>, target: impl Into<NeuronId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synapse_creation() {
        let synapse = Synapse::new("n1", "n2");
        assert_eq!(synapse.source.as_str(), "n1");
        assert_eq!(synapse.target.as_str(), "n2");
    }
}
