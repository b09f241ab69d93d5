//! Per-neuron spike-count history recorder

/// Append-only record of per-neuron spike counts per tick
///
/// Owned by the [`System`](crate::System); recorded for downstream
/// visualization and diagnostics only, never consulted by the firing logic.
/// Cleared whenever the owning system is reset or reloaded.
#[derive(Debug, Clone, Default)]
pub struct SpikeHistory {
    /// One series per neuron, in system insertion order
    series: Vec<Vec<u64>>,
    /// Ticks recorded so far
    ticks: usize,
}

impl SpikeHistory {
    /// Create an empty history
    pub(crate) fn new() -> Self {
        Self {
            series: Vec::new(),
            ticks: 0,
        }
    }

    /// Start tracking one more neuron
    ///
    /// A neuron registered after ticks were already recorded gets zero
    /// samples backfilled so every series stays the same length.
    pub(crate) fn register_neuron(&mut self) {
        self.series.push(vec![0; self.ticks]);
    }

    /// Append one tick's snapshot, one count per tracked neuron
    pub(crate) fn record(&mut self, counts: &[u64]) {
        debug_assert_eq!(counts.len(), self.series.len());
        for (series, &count) in self.series.iter_mut().zip(counts) {
            series.push(count);
        }
        self.ticks += 1;
    }

    /// Number of recorded ticks
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Number of tracked neurons
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether no neurons are tracked
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Recorded series for the neuron at the given insertion-order slot
    pub fn series(&self, slot: usize) -> Option<&[u64]> {
        self.series.get(slot).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_recording() {
        let mut history = SpikeHistory::new();
        history.register_neuron();
        history.register_neuron();

        history.record(&[1, 0]);
        history.record(&[0, 1]);

        assert_eq!(history.ticks(), 2);
        assert_eq!(history.series(0), Some([1, 0].as_slice()));
        assert_eq!(history.series(1), Some([0, 1].as_slice()));
        assert_eq!(history.series(2), None);
    }

    #[test]
    fn test_late_registration_backfills() {
        let mut history = SpikeHistory::new();
        history.register_neuron();
        history.record(&[4]);

        history.register_neuron();
        history.record(&[4, 9]);

        assert_eq!(history.series(1), Some([0, 9].as_slice()));
        assert_eq!(history.ticks(), 2);
    }
}
