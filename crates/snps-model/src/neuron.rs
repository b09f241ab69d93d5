//! Neuron state and the per-tick firing logic

use crate::{ids::NeuronId, rule::Rule};
use smallvec::SmallVec;

/// Inline capacity for pending-delivery queues; most neurons hold at most a
/// couple of in-flight spikes at a time.
const PENDING_INLINE: usize = 4;

/// A scheduled spike delivery in a neuron's own queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingSpike {
    /// Ticks until the amount becomes due
    pub remaining: u32,
    /// Number of spikes delivered when due
    pub amount: u64,
}

/// A single neuron: spike counter, ordered rule list, pending deliveries
///
/// The neuron owns its own firing logic; the surrounding system only routes
/// released spikes through the synapse graph.
#[derive(Debug, Clone)]
pub struct Neuron {
    id: NeuronId,
    spikes: u64,
    verbose: bool,
    rules: Vec<Rule>,
    pending: SmallVec<[PendingSpike; PENDING_INLINE]>,
}

impl Neuron {
    /// Create a neuron with no rules
    pub fn new(id: impl Into<NeuronId>, spikes: u64) -> Self {
        Self {
            id: id.into(),
            spikes,
            verbose: false,
            rules: Vec::new(),
            pending: SmallVec::new(),
        }
    }

    /// Replace the rule list
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    /// Set the verbose flag (gates per-firing debug logging)
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Append a rule to the end of the ordered rule list
    pub fn push_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Neuron identifier
    pub fn id(&self) -> &NeuronId {
        &self.id
    }

    /// Current spike count
    pub fn spikes(&self) -> u64 {
        self.spikes
    }

    /// Overwrite the spike count (delivery and engine read-back)
    pub fn set_spikes(&mut self, spikes: u64) {
        self.spikes = spikes;
    }

    /// Whether per-firing debug logging is enabled
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Ordered rule list
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Pending deliveries, in scheduling order
    pub fn pending(&self) -> &[PendingSpike] {
        &self.pending
    }

    /// Schedule a delivery against this neuron's own queue
    pub fn schedule(&mut self, remaining: u32, amount: u64) {
        self.pending.push(PendingSpike { remaining, amount });
    }

    /// Receive spikes from another neuron; no additional delay is imposed
    pub fn receive(&mut self, amount: u64) {
        self.spikes += amount;
    }

    /// One simulation step for this neuron alone
    ///
    /// Delivers every pending entry that is due (`remaining == 0`) directly
    /// into the spike count and ages the rest, then applies the first rule
    /// whose condition and consume requirement are both met. At most one rule
    /// fires per tick; scanning stops at the first match.
    pub fn step(&mut self) {
        let mut delivered = 0u64;
        self.pending.retain(|entry| {
            if entry.remaining == 0 {
                delivered += entry.amount;
                false
            } else {
                entry.remaining -= 1;
                true
            }
        });
        self.spikes += delivered;

        self.apply_first_rule();
    }

    /// Drain pending entries that are due now, returning their amounts
    ///
    /// Used by the delivery phase to hand released spikes to the synapse
    /// router; entries that are still waiting stay queued untouched.
    pub fn take_released(&mut self) -> SmallVec<[u64; PENDING_INLINE]> {
        let mut released = SmallVec::new();
        self.pending.retain(|entry| {
            if entry.remaining == 0 {
                released.push(entry.amount);
                false
            } else {
                true
            }
        });
        released
    }

    /// Apply the first matching rule, if any
    fn apply_first_rule(&mut self) {
        let fired = self
            .rules
            .iter()
            .find(|rule| rule.matches(self.spikes))
            .map(|rule| (rule.consume(), rule.produce(), rule.delay()));

        if let Some((consume, produce, delay)) = fired {
            self.spikes -= consume;
            self.pending.push(PendingSpike {
                remaining: delay,
                amount: produce,
            });
            if self.verbose {
                log::debug!(
                    "neuron {}: consumed {}, produces {} after {} tick(s)",
                    self.id,
                    consume,
                    produce,
                    delay
                );
            }
        }
    }
}
