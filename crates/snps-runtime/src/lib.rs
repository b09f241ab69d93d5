//! Simulation engines for Spiking Neural P systems
//!
//! This crate provides the execution layer of the SN-P simulator: the
//! [`System`] graph of neurons and synapses, the sequential reference engine
//! (one neuron at a time, synchronous two-phase update), and the batched
//! data-parallel engine (element-wise kernel over flattened arrays with a
//! fixed-depth delay ring). The data model and the textual `.snps`
//! descriptor format live in `snps-model` and are re-exported here.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export essential types from the data model
pub use snps_model::{
    Condition, Descriptor, ModelError, Neuron, NeuronId, PendingSpike, Rule, SpikePredicate,
    Synapse,
};

// Core modules
pub mod error;
pub mod history;
pub mod ring;
pub mod system;

// Execution engines
pub mod batched;
pub mod sequential;

// Re-export essential types
pub use batched::BatchedState;
pub use error::{Result, RuntimeError};
pub use history::SpikeHistory;
pub use ring::{DelayRing, Transmission, DELAY_RING_DEPTH};
pub use system::{DelayOverflow, EngineMode, System};

/// Runtime crate version for compatibility checking
pub const RUNTIME_VERSION: u32 = 1;
