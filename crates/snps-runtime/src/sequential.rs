//! Sequential reference engine: synchronous two-phase tick
//!
//! Each tick runs two strictly ordered phases. The compute phase advances
//! every neuron independently; the deliver phase routes released spikes
//! through the synapse graph and applies them afterwards. The split forms a
//! synchronization barrier: deliveries of tick T are always based on tick
//! T-1 state, so there are no intra-tick chain reactions and at most one
//! firing per neuron per tick.

use crate::system::System;

impl System {
    /// One reference-semantics tick
    pub(crate) fn tick_sequential(&mut self) {
        // Compute phase: each neuron only touches its own state, so the
        // iteration order is irrelevant here.
        for neuron in &mut self.neurons {
            neuron.step();
        }

        // Deliver phase: partition each pending set into released vs.
        // waiting, fan released amounts out over matching synapses, then
        // apply everything at once.
        let mut deliveries: Vec<(usize, u64)> = Vec::new();
        for slot in 0..self.neurons.len() {
            let released = self.neurons[slot].take_released();
            for amount in released {
                for &target in &self.outgoing[slot] {
                    deliveries.push((target, amount));
                }
            }
        }
        for (target, amount) in deliveries {
            self.neurons[target].receive(amount);
        }
    }
}
