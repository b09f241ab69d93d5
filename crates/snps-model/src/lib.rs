//! Data model and textual descriptor format for Spiking Neural P systems
//!
//! This crate provides the fundamental building blocks of an SN-P system:
//! firing rules, neurons, synapses, and the line-oriented `.snps` descriptor
//! format used to persist a system between runs. The execution engines live
//! in `snps-runtime`.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod ids;
pub mod rule;
pub mod neuron;
pub mod synapse;

// Descriptor format
pub mod format;

// Re-export essential types
pub use error::{ModelError, Result};
pub use format::Descriptor;
pub use ids::NeuronId;
pub use neuron::{Neuron, PendingSpike};
pub use rule::{Condition, Rule, SpikePredicate};
pub use synapse::Synapse;

/// Model crate version for compatibility checking
pub const MODEL_VERSION: u32 = 1;
