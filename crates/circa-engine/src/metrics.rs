//! Per-propagate counters for the simulation engine.
//!
//! [`StepMetrics`] describes the work done by one
//! [`Simulator::propagate`](crate::Simulator::propagate) call, for
//! profiling and for telling a quiet circuit from a busy one.

use circa_core::SimTime;

/// Work counters collected during a single `propagate()`.
///
/// Durations are in microseconds. The simulator keeps the counters of
/// the most recent call; see [`Simulator::last_metrics`](crate::Simulator::last_metrics).
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the whole call, in microseconds.
    pub total_us: u64,
    /// Time batches drained from the event queue.
    pub iterations: u32,
    /// Events applied to driver lists.
    pub events_applied: u64,
    /// Leaf and subcircuit component propagations.
    pub component_propagations: u64,
    /// Dirty-point resolution passes across all states.
    pub wire_passes: u64,
    /// Simulated time when the call returned.
    pub final_time: SimTime,
    /// Distinct (state, location) pairs recorded as oscillating.
    pub oscillation_points: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.iterations, 0);
        assert_eq!(m.events_applied, 0);
        assert_eq!(m.component_propagations, 0);
        assert_eq!(m.wire_passes, 0);
        assert_eq!(m.final_time, SimTime(0));
        assert_eq!(m.oscillation_points, 0);
    }
}
