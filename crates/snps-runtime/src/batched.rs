//! Batched data-parallel engine: flattened arrays plus a delay ring
//!
//! The engine mirrors a device kernel: per-neuron parameters are flattened
//! into parallel arrays and the firing rule is applied element-wise, one
//! logical worker per slot, with no cross-slot dependency. Unlike the
//! sequential engine, repeated firings within one tick collapse into a
//! single batched update (`fire_count` may exceed 1). Produced spikes travel
//! through a fixed-depth delay ring instead of per-neuron pending queues.

use crate::{
    error::{Result, RuntimeError},
    ring::{DelayRing, Transmission, DELAY_RING_DEPTH},
    system::{DelayOverflow, System},
};
use snps_model::Neuron;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Flattened per-neuron snapshot used by the batched engine
///
/// Built lazily from each neuron's single threshold rule at the first
/// batched tick. From then on the arrays are the single source of truth for
/// spike counts; the neuron structs are only updated through delivery.
#[derive(Debug, Clone)]
pub struct BatchedState {
    pub(crate) spikes: Vec<u64>,
    pub(crate) thresholds: Vec<u64>,
    pub(crate) consumes: Vec<u64>,
    pub(crate) produces: Vec<u64>,
    pub(crate) delays: Vec<u32>,
    pub(crate) fire_counts: Vec<u64>,
    pub(crate) ring: DelayRing,
}

impl BatchedState {
    /// Build the snapshot from the neurons' rules
    ///
    /// Every neuron must carry exactly one rule in threshold form; anything
    /// else is a configuration error, never a silent fallback to rule 0.
    pub(crate) fn build(neurons: &[Neuron]) -> Result<Self> {
        let count = neurons.len();
        let mut spikes = Vec::with_capacity(count);
        let mut thresholds = Vec::with_capacity(count);
        let mut consumes = Vec::with_capacity(count);
        let mut produces = Vec::with_capacity(count);
        let mut delays = Vec::with_capacity(count);

        for neuron in neurons {
            let rule = match neuron.rules() {
                [] => {
                    return Err(RuntimeError::MissingRule {
                        id: neuron.id().clone(),
                    })
                }
                [rule] => rule,
                rules => {
                    return Err(RuntimeError::MultiRuleNeuron {
                        id: neuron.id().clone(),
                        rules: rules.len(),
                    })
                }
            };
            let threshold =
                rule.condition()
                    .threshold()
                    .ok_or_else(|| RuntimeError::UnsupportedCondition {
                        id: neuron.id().clone(),
                    })?;

            spikes.push(neuron.spikes());
            thresholds.push(threshold);
            consumes.push(rule.consume());
            produces.push(rule.produce());
            delays.push(rule.delay());
        }

        log::debug!("batched snapshot built for {} neuron(s)", count);

        Ok(Self {
            spikes,
            thresholds,
            consumes,
            produces,
            delays,
            fire_counts: vec![0; count],
            ring: DelayRing::new(DELAY_RING_DEPTH),
        })
    }

    /// Canonical spike counts, in system insertion order
    pub fn spikes(&self) -> &[u64] {
        &self.spikes
    }

    /// Fire counts computed by the most recent kernel pass
    pub fn fire_counts(&self) -> &[u64] {
        &self.fire_counts
    }

    /// Element-wise firing kernel, one logical worker per slot
    ///
    /// Returning from here is the host/device barrier: every slot has been
    /// fully updated before results are read back.
    #[cfg(feature = "parallel")]
    fn apply_rules(&mut self) {
        self.spikes
            .par_iter_mut()
            .zip(self.fire_counts.par_iter_mut())
            .zip(self.thresholds.par_iter().zip(self.consumes.par_iter()))
            .for_each(|((spikes, fires), (&threshold, &consume))| {
                fire_slot(spikes, fires, threshold, consume);
            });
    }

    /// Element-wise firing kernel, serial fallback
    #[cfg(not(feature = "parallel"))]
    fn apply_rules(&mut self) {
        for slot in 0..self.spikes.len() {
            let (threshold, consume) = (self.thresholds[slot], self.consumes[slot]);
            fire_slot(
                &mut self.spikes[slot],
                &mut self.fire_counts[slot],
                threshold,
                consume,
            );
        }
    }
}

/// Kernel body for one slot
///
/// `consume` is at least 1 (enforced at rule construction), so the division
/// is always defined.
fn fire_slot(spikes: &mut u64, fires: &mut u64, threshold: u64, consume: u64) {
    if *spikes >= threshold && *spikes >= consume {
        let times = *spikes / consume;
        *spikes -= times * consume;
        *fires = times;
    } else {
        *fires = 0;
    }
}

impl System {
    /// One batched tick: kernel, transmission synthesis, delay ring update
    pub(crate) fn tick_batched(&mut self) -> Result<()> {
        let mut state = match self.batched.take() {
            Some(state) => state,
            None => BatchedState::build(&self.neurons)?,
        };

        // 1. Firing kernel over all slots.
        state.apply_rules();

        // 2. One transmission per outgoing synapse for every slot that
        //    fired, carrying the collapsed amount.
        let mut scheduled: Vec<(usize, u32, Transmission)> = Vec::new();
        for slot in 0..state.fire_counts.len() {
            let fires = state.fire_counts[slot];
            if fires == 0 {
                continue;
            }
            let amount = state.produces[slot] * fires;
            let delay = state.delays[slot];
            for &target in &self.outgoing[slot] {
                scheduled.push((slot, delay, Transmission { target, amount }));
            }
        }

        // 3. Delay ring: apply slot 0, rotate, insert the new transmissions.
        //    Deliveries update both the device-side array and the neuron
        //    struct so the two stay consistent.
        for transmission in state.ring.take_due() {
            state.spikes[transmission.target] += transmission.amount;
            self.neurons[transmission.target].receive(transmission.amount);
        }
        state.ring.rotate();
        for (source, delay, transmission) in scheduled {
            if !state.ring.schedule(delay, transmission) {
                let event = DelayOverflow {
                    tick: self.ticks_run,
                    source: self.neurons[source].id().clone(),
                    target: self.neurons[transmission.target].id().clone(),
                    amount: transmission.amount,
                    delay,
                };
                log::warn!(
                    "delay ring overflow at tick {}: {} -> {} dropped ({} spike(s), delay {})",
                    event.tick,
                    event.source,
                    event.target,
                    event.amount,
                    event.delay
                );
                self.overflows.push(event);
            }
        }

        self.batched = Some(state);
        Ok(())
    }
}
