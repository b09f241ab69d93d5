//! Firing rules and their conditions

use crate::error::{ModelError, Result};
use core::fmt;
use std::sync::Arc;

/// Predicate form of a firing condition: an arbitrary test over the spike count
pub type SpikePredicate = Arc<dyn Fn(u64) -> bool + Send + Sync>;

/// Firing condition of a rule
///
/// The batched engine only accepts the `Threshold` form; `Custom` predicates
/// are restricted to the sequential engine and cannot be persisted in the
/// textual descriptor format.
#[derive(Clone)]
pub enum Condition {
    /// Numeric threshold test: the rule may fire when `count >= threshold`
    Threshold(u64),
    /// Arbitrary predicate over the spike count (sequential engine only)
    Custom(SpikePredicate),
}

impl Condition {
    /// Evaluate the condition against a spike count
    pub fn is_met(&self, count: u64) -> bool {
        match self {
            Self::Threshold(threshold) => count >= *threshold,
            Self::Custom(predicate) => predicate(count),
        }
    }

    /// Threshold value, for threshold-form conditions only
    pub fn threshold(&self) -> Option<u64> {
        match self {
            Self::Threshold(threshold) => Some(*threshold),
            Self::Custom(_) => None,
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threshold(threshold) => f.debug_tuple("Threshold").field(threshold).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Immutable firing rule: condition plus consume/produce/delay effect
///
/// A rule may fire only if both the condition holds and the neuron's count
/// covers the consume requirement.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Spikes consumed when the rule fires (at least 1)
    consume: u64,
    /// Spikes produced when the rule fires
    produce: u64,
    /// Ticks between firing and the produced spikes becoming due
    delay: u32,
    /// Firing condition
    condition: Condition,
}

impl Rule {
    /// Create a new rule with validation
    pub fn new(consume: u64, produce: u64, delay: u32, condition: Condition) -> Result<Self> {
        if consume == 0 {
            return Err(ModelError::invalid_rule("consume must be >= 1"));
        }

        Ok(Self {
            consume,
            produce,
            delay,
            condition,
        })
    }

    /// Create a rule with a numeric threshold condition
    pub fn threshold(consume: u64, produce: u64, delay: u32, threshold: u64) -> Result<Self> {
        Self::new(consume, produce, delay, Condition::Threshold(threshold))
    }

    /// Create a rule with an arbitrary predicate condition
    pub fn custom(
        consume: u64,
        produce: u64,
        delay: u32,
        predicate: impl Fn(u64) -> bool + Send + Sync + 'static,
    ) -> Result<Self> {
        Self::new(consume, produce, delay, Condition::Custom(Arc::new(predicate)))
    }

    /// Spikes consumed per firing
    pub fn consume(&self) -> u64 {
        self.consume
    }

    /// Spikes produced per firing
    pub fn produce(&self) -> u64 {
        self.produce
    }

    /// Delivery delay in ticks
    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// The firing condition
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Whether the rule may fire at the given spike count
    pub fn matches(&self, count: u64) -> bool {
        self.condition.is_met(count) && count >= self.consume
    }
}
