//! Comparator-driven policies.
//!
//! FCFS, SJF, SRTF, both priority variants, HRRN, LJF, LRTF and RMS differ
//! only in their primary [`DispatchingRule`] and in how often the running
//! process is re-evaluated. Ties fall back to core affinity (when enabled),
//! then earliest arrival, then input order.

use std::cmp::Ordering;

use crate::dispatching::rules::{
    CoreAffinity, EarliestArrival, HighestResponseRatio, LongestBurst, LongestRemaining,
    LowestPriorityNumber, ShortestBurst, ShortestPeriod, ShortestRemaining,
};
use crate::dispatching::{DispatchingRule, RuleEngine, SchedulingContext};
use crate::models::SimulationOptions;
use crate::scheduler::simulator::{DispatchPolicy, SelectRequest, Selection};
use crate::scheduler::state::{ProcessTable, SliceEnd};

/// A single ready set ordered by a [`RuleEngine`].
#[derive(Debug, Clone)]
pub struct RankedPolicy {
    name: &'static str,
    engine: RuleEngine,
    ready: Vec<usize>,
    preemptive: bool,
    quantum: Option<f64>,
    checkpoint_interval: Option<f64>,
}

impl RankedPolicy {
    /// Non-preemptive policy ranked by `primary`.
    pub fn new<R: DispatchingRule + 'static>(
        name: &'static str,
        primary: R,
        options: &SimulationOptions,
    ) -> Self {
        let mut engine = RuleEngine::new().with_rule(primary);
        if options.enable_affinity {
            engine = engine.with_tie_breaker(CoreAffinity);
        }
        engine = engine.with_tie_breaker(EarliestArrival);

        Self {
            name,
            engine,
            ready: Vec::new(),
            preemptive: false,
            quantum: None,
            checkpoint_interval: None,
        }
    }

    /// First Come First Served.
    pub fn fcfs(options: &SimulationOptions) -> Self {
        Self::new("FCFS", EarliestArrival, options)
    }

    /// Shortest Job First (non-preemptive).
    pub fn sjf(options: &SimulationOptions) -> Self {
        Self::new("SJF", ShortestBurst, options)
    }

    /// Shortest Remaining Time First. Re-evaluated at every arrival.
    pub fn srtf(options: &SimulationOptions) -> Self {
        Self::new("SRTF", ShortestRemaining, options).preemptive()
    }

    /// Non-preemptive priority.
    pub fn priority(options: &SimulationOptions) -> Self {
        Self::new("PRIORITY", LowestPriorityNumber, options)
    }

    /// Preemptive priority. Re-evaluated at every arrival.
    pub fn priority_preemptive(options: &SimulationOptions) -> Self {
        Self::new("PRIORITY_P", LowestPriorityNumber, options).preemptive()
    }

    /// Highest Response Ratio Next (non-preemptive).
    pub fn hrrn(options: &SimulationOptions) -> Self {
        Self::new("HRRN", HighestResponseRatio, options)
    }

    /// Longest Job First (non-preemptive).
    pub fn ljf(options: &SimulationOptions) -> Self {
        Self::new("LJF", LongestBurst, options)
    }

    /// Longest Remaining Time First.
    ///
    /// The running process's remaining time shrinks while others' do not,
    /// so it is re-evaluated every tick as well as at arrivals.
    pub fn lrtf(options: &SimulationOptions) -> Self {
        Self::new("LRTF", LongestRemaining, options)
            .preemptive()
            .with_checkpoint_interval(1.0)
    }

    /// Rate Monotonic: one tick per decision.
    pub fn rate_monotonic(options: &SimulationOptions) -> Self {
        Self::new("RMS", ShortestPeriod, options).with_quantum(1.0)
    }

    /// Stops slices at arrivals so better processes can preempt.
    pub fn preemptive(mut self) -> Self {
        self.preemptive = true;
        self
    }

    /// Caps every slice; an expired process is re-ranked with the others.
    pub fn with_quantum(mut self, quantum: f64) -> Self {
        self.quantum = Some(quantum);
        self
    }

    /// Re-checks the running process at this interval.
    pub fn with_checkpoint_interval(mut self, interval: f64) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }
}

impl DispatchPolicy for RankedPolicy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn admit(&mut self, index: usize, _table: &ProcessTable, _now: f64) {
        self.ready.push(index);
    }

    fn requeue(&mut self, index: usize, _reason: SliceEnd, _table: &ProcessTable, _now: f64) {
        self.ready.push(index);
    }

    fn ready(&self) -> Vec<usize> {
        self.ready.clone()
    }

    fn select(&mut self, request: &SelectRequest<'_>) -> Option<Selection> {
        let table = request.table;
        let ctx = SchedulingContext::at_time(request.now).on_core(request.core_id);
        let best = self.engine.select_best(&self.ready, table, &ctx)?;

        let chosen = match request.incumbent {
            Some(inc)
                if inc != best
                    && self.ready.contains(&inc)
                    && !self.engine.strictly_better(&table[best], &table[inc], &ctx) =>
            {
                inc
            }
            _ => best,
        };

        self.ready.retain(|&i| i != chosen);
        Some(Selection::new(chosen, self.engine.justify(&table[chosen], &ctx)))
    }

    fn compare_running(&self, a: usize, b: usize, table: &ProcessTable, now: f64) -> Ordering {
        self.engine
            .compare(&table[a], &table[b], &SchedulingContext::at_time(now))
    }

    fn quantum(&self, _index: usize, _table: &ProcessTable) -> Option<f64> {
        self.quantum
    }

    fn preemptive(&self) -> bool {
        self.preemptive
    }

    fn checkpoint_interval(&self) -> Option<f64> {
        self.checkpoint_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    fn admit_all(policy: &mut RankedPolicy, table: &ProcessTable) {
        for i in 0..table.len() {
            policy.admit(i, table, 0.0);
        }
    }

    #[test]
    fn test_sjf_selects_shortest_then_earliest() {
        let table = ProcessTable::new(&[
            Process::new("A", 1.0, 3.0),
            Process::new("B", 0.0, 3.0),
            Process::new("C", 0.0, 5.0),
        ]);
        let mut policy = RankedPolicy::sjf(&SimulationOptions::default());
        admit_all(&mut policy, &table);

        let req = SelectRequest {
            now: 1.0,
            core_id: 0,
            incumbent: None,
            table: &table,
        };
        let sel = policy.select(&req).unwrap();
        assert_eq!(table.pid(sel.index), "B");
        assert!(sel.reason.contains("burst = 3"));
        assert_eq!(policy.ready(), vec![0, 2]);
    }

    #[test]
    fn test_incumbent_kept_on_tie() {
        let mut table =
            ProcessTable::new(&[Process::new("A", 0.0, 3.0), Process::new("B", 0.0, 5.0)]);
        table[1].remaining = 3.0;
        let mut policy = RankedPolicy::srtf(&SimulationOptions::default());
        admit_all(&mut policy, &table);

        // B runs and reaches a checkpoint tied with A: B keeps the core
        let req = SelectRequest {
            now: 2.0,
            core_id: 0,
            incumbent: Some(1),
            table: &table,
        };
        assert_eq!(policy.select(&req).unwrap().index, 1);
    }

    #[test]
    fn test_incumbent_preempted_when_strictly_worse() {
        let table =
            ProcessTable::new(&[Process::new("A", 0.0, 2.0), Process::new("B", 0.0, 5.0)]);
        let mut policy = RankedPolicy::srtf(&SimulationOptions::default());
        admit_all(&mut policy, &table);

        let req = SelectRequest {
            now: 2.0,
            core_id: 0,
            incumbent: Some(1),
            table: &table,
        };
        assert_eq!(policy.select(&req).unwrap().index, 0);
    }

    #[test]
    fn test_affinity_breaks_ties() {
        let mut table =
            ProcessTable::new(&[Process::new("A", 0.0, 3.0), Process::new("B", 0.0, 3.0)]);
        table[1].last_core = Some(1);
        let opts = SimulationOptions::default().with_affinity(true);
        let mut policy = RankedPolicy::sjf(&opts);
        admit_all(&mut policy, &table);

        let req = SelectRequest {
            now: 0.0,
            core_id: 1,
            incumbent: None,
            table: &table,
        };
        assert_eq!(table.pid(policy.select(&req).unwrap().index), "B");
    }

    #[test]
    fn test_compare_running_orders_by_primary_rule() {
        let mut table = ProcessTable::new(&[
            Process::new("A", 0.0, 8.0),
            Process::new("B", 0.0, 8.0),
            Process::new("C", 0.0, 8.0),
        ]);
        table[0].remaining = 6.0;
        table[1].remaining = 2.0;
        let opts = SimulationOptions::default();

        let srtf = RankedPolicy::srtf(&opts);
        assert_eq!(srtf.compare_running(0, 1, &table, 2.0), Ordering::Greater);
        assert_eq!(srtf.compare_running(1, 0, &table, 2.0), Ordering::Less);

        let lrtf = RankedPolicy::lrtf(&opts);
        assert_eq!(lrtf.compare_running(0, 1, &table, 2.0), Ordering::Less);
        // Equal remaining falls through to input order
        table[2].remaining = 6.0;
        assert_eq!(lrtf.compare_running(2, 0, &table, 2.0), Ordering::Greater);
    }

    #[test]
    fn test_policy_shapes() {
        let opts = SimulationOptions::default();
        assert!(!RankedPolicy::fcfs(&opts).preemptive);
        assert!(RankedPolicy::priority_preemptive(&opts).preemptive);
        assert_eq!(RankedPolicy::lrtf(&opts).checkpoint_interval, Some(1.0));
        assert_eq!(RankedPolicy::rate_monotonic(&opts).quantum, Some(1.0));
    }
}
