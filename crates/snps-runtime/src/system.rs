//! The SN-P system: neuron graph, synapse routing, and tick dispatch

use crate::{
    batched::BatchedState,
    error::{Result, RuntimeError},
    history::SpikeHistory,
};
use snps_model::{Descriptor, Neuron, NeuronId, Synapse};
use std::collections::HashMap;
use std::path::Path;

/// Execution strategy for [`System::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// Reference semantics: one neuron at a time, at most one firing per
    /// neuron per tick
    #[default]
    Sequential,
    /// Data-parallel kernel over flattened arrays; collapses repeated
    /// firings of one tick into a single batched update
    Batched,
}

/// Observable record of a transmission dropped by the delay ring
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayOverflow {
    /// Tick at which the drop happened (0-based)
    pub tick: u64,
    /// Firing neuron
    pub source: NeuronId,
    /// Intended target neuron
    pub target: NeuronId,
    /// Spike amount lost
    pub amount: u64,
    /// Requested delay that exceeded the ring depth
    pub delay: u32,
}

/// A complete SN-P system: neurons, synapses, and one execution engine
///
/// Neurons iterate in insertion order, which keeps runs deterministic.
/// The batched engine's flattened snapshot is built lazily at the first
/// batched tick; once it exists it is the single source of truth for spike
/// counts and the topology is frozen.
#[derive(Debug)]
pub struct System {
    pub(crate) mode: EngineMode,
    pub(crate) neurons: Vec<Neuron>,
    pub(crate) index: HashMap<NeuronId, usize>,
    pub(crate) synapses: Vec<Synapse>,
    /// Outgoing target slots per neuron slot (source-indexed adjacency)
    pub(crate) outgoing: Vec<Vec<usize>>,
    pub(crate) batched: Option<BatchedState>,
    pub(crate) history: SpikeHistory,
    pub(crate) overflows: Vec<DelayOverflow>,
    pub(crate) ticks_run: u64,
}

impl System {
    /// Create an empty system with the given engine mode
    pub fn new(mode: EngineMode) -> Self {
        Self {
            mode,
            neurons: Vec::new(),
            index: HashMap::new(),
            synapses: Vec::new(),
            outgoing: Vec::new(),
            batched: None,
            history: SpikeHistory::new(),
            overflows: Vec::new(),
            ticks_run: 0,
        }
    }

    /// Create an empty system driven by the sequential reference engine
    pub fn sequential() -> Self {
        Self::new(EngineMode::Sequential)
    }

    /// Create an empty system driven by the batched engine
    pub fn batched() -> Self {
        Self::new(EngineMode::Batched)
    }

    /// The engine mode this system was built with
    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    /// Add a neuron to the system
    pub fn add_neuron(&mut self, neuron: Neuron) -> Result<()> {
        self.ensure_unfrozen("add_neuron")?;
        if self.index.contains_key(neuron.id().as_str()) {
            return Err(RuntimeError::duplicate_neuron(neuron.id().clone()));
        }

        let slot = self.neurons.len();
        self.index.insert(neuron.id().clone(), slot);
        self.outgoing.push(Vec::new());
        self.history.register_neuron();
        self.neurons.push(neuron);
        Ok(())
    }

    /// Add a directed synapse between two existing neurons
    ///
    /// Endpoints are validated at insertion time; an unresolved id is a
    /// structured error, never a delayed lookup failure.
    pub fn add_synapse(
        &mut self,
        source: impl Into<NeuronId>,
        target: impl Into<NeuronId>,
    ) -> Result<()> {
        self.ensure_unfrozen("add_synapse")?;
        let source = source.into();
        let target = target.into();
        let source_slot = self.slot(source.as_str())?;
        let target_slot = self.slot(target.as_str())?;

        self.outgoing[source_slot].push(target_slot);
        self.synapses.push(Synapse { source, target });
        Ok(())
    }

    /// Advance the whole system by exactly one discrete step
    pub fn tick(&mut self) -> Result<()> {
        match self.mode {
            EngineMode::Sequential => self.tick_sequential(),
            EngineMode::Batched => self.tick_batched()?,
        }

        let counts = self.counts();
        self.history.record(&counts);
        self.ticks_run += 1;
        Ok(())
    }

    /// Run the simulation for a number of ticks
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        log::info!(
            "running {} tick(s) over {} neuron(s), {} synapse(s), {:?} engine",
            ticks,
            self.neurons.len(),
            self.synapses.len(),
            self.mode
        );
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Current spike count of a neuron
    ///
    /// Reads the batched snapshot once it exists (the canonical counts in
    /// batched mode), otherwise the neuron itself.
    pub fn spike_count(&self, id: &str) -> Result<u64> {
        let slot = self.slot(id)?;
        Ok(match &self.batched {
            Some(state) => state.spikes()[slot],
            None => self.neurons[slot].spikes(),
        })
    }

    /// Canonical spike counts for every neuron, in insertion order
    pub fn counts(&self) -> Vec<u64> {
        match &self.batched {
            Some(state) => state.spikes().to_vec(),
            None => self.neurons.iter().map(Neuron::spikes).collect(),
        }
    }

    /// Look up a neuron by id
    pub fn neuron(&self, id: &str) -> Option<&Neuron> {
        self.index.get(id).map(|&slot| &self.neurons[slot])
    }

    /// Neuron ids in insertion order
    pub fn neuron_ids(&self) -> impl Iterator<Item = &NeuronId> {
        self.neurons.iter().map(Neuron::id)
    }

    /// Number of neurons
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Number of synapses
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// All synapses in insertion order
    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Per-neuron per-tick spike-count history
    pub fn history(&self) -> &SpikeHistory {
        &self.history
    }

    /// Recorded history series for one neuron
    pub fn history_of(&self, id: &str) -> Option<&[u64]> {
        self.index
            .get(id)
            .and_then(|&slot| self.history.series(slot))
    }

    /// Delay-ring drop events observed so far
    pub fn overflows(&self) -> &[DelayOverflow] {
        &self.overflows
    }

    /// Ticks executed since construction or the last reset
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Clear the system back to its empty post-construction state
    ///
    /// Drops the graph, the history, the batched snapshot, and the overflow
    /// log; the engine mode is kept.
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }

    /// Load a system from a textual descriptor file
    ///
    /// On any failure the system is left empty; a partial graph is never
    /// kept.
    pub fn load_from_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.reset();
        let descriptor = Descriptor::read_path(path)?;
        self.install(descriptor)
    }

    /// Load a system from descriptor text
    pub fn load_from_str(&mut self, text: &str) -> Result<()> {
        self.reset();
        let descriptor = Descriptor::parse(text)?;
        self.install(descriptor)
    }

    /// Snapshot the current graph as a descriptor
    ///
    /// Spike counts are taken from the canonical source (the batched arrays
    /// once they exist); pending deliveries are not part of the format.
    pub fn descriptor(&self) -> Descriptor {
        let mut neurons = self.neurons.clone();
        if let Some(state) = &self.batched {
            for (neuron, &spikes) in neurons.iter_mut().zip(state.spikes()) {
                neuron.set_spikes(spikes);
            }
        }
        Descriptor {
            neurons,
            synapses: self.synapses.clone(),
        }
    }

    /// Save the current graph to a textual descriptor file
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.descriptor().write_path(path)?;
        Ok(())
    }

    /// Resolve an id to its insertion-order slot
    pub(crate) fn slot(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| RuntimeError::unknown_neuron(id))
    }

    fn ensure_unfrozen(&self, operation: &str) -> Result<()> {
        if self.batched.is_some() {
            return Err(RuntimeError::topology_frozen(operation));
        }
        Ok(())
    }

    fn install(&mut self, descriptor: Descriptor) -> Result<()> {
        let result = self.try_install(descriptor);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn try_install(&mut self, descriptor: Descriptor) -> Result<()> {
        for neuron in descriptor.neurons {
            self.add_neuron(neuron)?;
        }
        for synapse in descriptor.synapses {
            self.add_synapse(synapse.source, synapse.target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snps_model::Rule;

    #[test]
    fn test_add_neuron_and_synapse() {
        let mut system = System::sequential();
        system.add_neuron(Neuron::new("n1", 2)).unwrap();
        system.add_neuron(Neuron::new("n2", 0)).unwrap();
        system.add_synapse("n1", "n2").unwrap();

        assert_eq!(system.neuron_count(), 2);
        assert_eq!(system.synapse_count(), 1);
        assert_eq!(system.spike_count("n1").unwrap(), 2);
    }

    #[test]
    fn test_duplicate_neuron_rejected() {
        let mut system = System::sequential();
        system.add_neuron(Neuron::new("n1", 0)).unwrap();
        let err = system.add_neuron(Neuron::new("n1", 5)).unwrap_err();
        assert!(matches!(err, RuntimeError::DuplicateNeuron { .. }));
    }

    #[test]
    fn test_dangling_synapse_rejected() {
        let mut system = System::sequential();
        system.add_neuron(Neuron::new("n1", 0)).unwrap();

        let err = system.add_synapse("n1", "ghost").unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownNeuron { .. }));

        let err = system.add_synapse("ghost", "n1").unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownNeuron { .. }));
        assert_eq!(system.synapse_count(), 0);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut system = System::sequential();
        for id in ["z", "a", "m"] {
            system.add_neuron(Neuron::new(id, 0)).unwrap();
        }
        let ids: Vec<&str> = system.neuron_ids().map(NeuronId::as_str).collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }

    #[test]
    fn test_zero_ticks_changes_nothing() {
        let mut system = System::sequential();
        let rule = Rule::threshold(1, 1, 1, 1).unwrap();
        system
            .add_neuron(Neuron::new("n1", 3).with_rules(vec![rule]))
            .unwrap();
        system.add_neuron(Neuron::new("n2", 0)).unwrap();
        system.add_synapse("n1", "n2").unwrap();

        system.run(0).unwrap();
        assert_eq!(system.spike_count("n1").unwrap(), 3);
        assert_eq!(system.spike_count("n2").unwrap(), 0);
        assert_eq!(system.history().ticks(), 0);
        assert_eq!(system.ticks_run(), 0);
    }

    #[test]
    fn test_history_records_every_tick() {
        let mut system = System::sequential();
        let rule = Rule::threshold(3, 2, 0, 3).unwrap();
        system
            .add_neuron(Neuron::new("n1", 3).with_rules(vec![rule]))
            .unwrap();
        system.add_neuron(Neuron::new("sink", 0)).unwrap();
        system.add_synapse("n1", "sink").unwrap();

        system.run(2).unwrap();
        assert_eq!(system.history().ticks(), 2);
        assert_eq!(system.history_of("n1").unwrap().len(), 2);
    }

    #[test]
    fn test_topology_freezes_after_first_batched_tick() {
        let mut system = System::batched();
        let rule = Rule::threshold(1, 1, 1, 1).unwrap();
        system
            .add_neuron(Neuron::new("n1", 1).with_rules(vec![rule.clone()]))
            .unwrap();
        system
            .add_neuron(Neuron::new("n2", 0).with_rules(vec![rule]))
            .unwrap();
        system.add_synapse("n1", "n2").unwrap();

        system.tick().unwrap();
        let err = system.add_neuron(Neuron::new("n3", 0)).unwrap_err();
        assert!(matches!(err, RuntimeError::TopologyFrozen { .. }));
        let err = system.add_synapse("n2", "n1").unwrap_err();
        assert!(matches!(err, RuntimeError::TopologyFrozen { .. }));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut system = System::sequential();
        system.add_neuron(Neuron::new("n1", 1)).unwrap();
        system.add_neuron(Neuron::new("n2", 0)).unwrap();
        system.add_synapse("n1", "n2").unwrap();
        system.run(3).unwrap();

        system.reset();
        assert_eq!(system.neuron_count(), 0);
        assert_eq!(system.synapse_count(), 0);
        assert_eq!(system.history().ticks(), 0);
        assert_eq!(system.ticks_run(), 0);
        assert_eq!(system.mode(), EngineMode::Sequential);
    }

    #[test]
    fn test_load_failure_leaves_system_empty() {
        let mut system = System::sequential();
        system.add_neuron(Neuron::new("old", 7)).unwrap();

        let err = system.load_from_str("invalid content\n").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Model {
                source: snps_model::ModelError::InvalidHeader { .. }
            }
        ));
        assert_eq!(system.neuron_count(), 0);
        assert_eq!(system.synapse_count(), 0);
    }

    #[test]
    fn test_load_from_str() {
        let text = "*N\nN1 1 0 1 1 1 1 1\nN2 0 0 0\n*S\nN1 N2\n";
        let mut system = System::sequential();
        system.load_from_str(text).unwrap();

        assert_eq!(system.neuron_count(), 2);
        assert_eq!(system.synapse_count(), 1);
        assert_eq!(system.spike_count("N1").unwrap(), 1);
        assert_eq!(system.neuron("N1").unwrap().rules().len(), 1);
    }
}
