//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Arrival**: FCFS
//! - **Length**: SJF, LJF (total burst), SRTF, LRTF (remaining work)
//! - **Importance**: PRIORITY, RMS (period)
//! - **Aging**: HRRN
//! - **Placement**: AFFINITY
//!
//! # Score Convention
//! All rules return lower scores for processes that should run first.
//!
//! # References
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5
//! - Liu & Layland (1973), "Scheduling Algorithms for Multiprogramming in a
//!   Hard-Real-Time Environment"

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::scheduler::ProcessState;

// ======================== Arrival ========================

/// First Come First Served.
///
/// Prioritizes processes that arrived earlier.
#[derive(Debug, Clone, Copy)]
pub struct EarliestArrival;

impl DispatchingRule for EarliestArrival {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn evaluate(&self, process: &ProcessState, _context: &SchedulingContext) -> RuleScore {
        process.arrival
    }

    fn metric(&self) -> &'static str {
        "arrival"
    }

    fn description(&self) -> &'static str {
        "First Come First Served"
    }
}

// ======================== Length ========================

/// Shortest Job First.
///
/// Prioritizes processes with the shortest total burst.
/// Minimizes average waiting time when all jobs are available together.
#[derive(Debug, Clone, Copy)]
pub struct ShortestBurst;

impl DispatchingRule for ShortestBurst {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn evaluate(&self, process: &ProcessState, _context: &SchedulingContext) -> RuleScore {
        process.burst
    }

    fn metric(&self) -> &'static str {
        "burst"
    }

    fn description(&self) -> &'static str {
        "Shortest Job First"
    }
}

/// Longest Job First.
#[derive(Debug, Clone, Copy)]
pub struct LongestBurst;

impl DispatchingRule for LongestBurst {
    fn name(&self) -> &'static str {
        "LJF"
    }

    fn evaluate(&self, process: &ProcessState, _context: &SchedulingContext) -> RuleScore {
        -process.burst
    }

    fn metric(&self) -> &'static str {
        "burst"
    }

    fn metric_value(&self, process: &ProcessState, _context: &SchedulingContext) -> f64 {
        process.burst
    }

    fn description(&self) -> &'static str {
        "Longest Job First"
    }
}

/// Shortest Remaining Time First.
#[derive(Debug, Clone, Copy)]
pub struct ShortestRemaining;

impl DispatchingRule for ShortestRemaining {
    fn name(&self) -> &'static str {
        "SRTF"
    }

    fn evaluate(&self, process: &ProcessState, _context: &SchedulingContext) -> RuleScore {
        process.remaining
    }

    fn metric(&self) -> &'static str {
        "remaining time"
    }

    fn description(&self) -> &'static str {
        "Shortest Remaining Time First"
    }
}

/// Longest Remaining Time First.
#[derive(Debug, Clone, Copy)]
pub struct LongestRemaining;

impl DispatchingRule for LongestRemaining {
    fn name(&self) -> &'static str {
        "LRTF"
    }

    fn evaluate(&self, process: &ProcessState, _context: &SchedulingContext) -> RuleScore {
        -process.remaining
    }

    fn metric(&self) -> &'static str {
        "remaining time"
    }

    fn metric_value(&self, process: &ProcessState, _context: &SchedulingContext) -> f64 {
        process.remaining
    }

    fn description(&self) -> &'static str {
        "Longest Remaining Time First"
    }
}

// ======================== Importance ========================

/// Static priority. Lower number = more important.
///
/// Processes without a priority rank after every prioritized process.
#[derive(Debug, Clone, Copy)]
pub struct LowestPriorityNumber;

impl DispatchingRule for LowestPriorityNumber {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, process: &ProcessState, _context: &SchedulingContext) -> RuleScore {
        process.priority.map(f64::from).unwrap_or(f64::MAX)
    }

    fn metric(&self) -> &'static str {
        "priority"
    }

    fn description(&self) -> &'static str {
        "Static Priority"
    }
}

/// Rate Monotonic: shorter period = higher static priority.
///
/// # Reference
/// Liu & Layland (1973), optimal fixed-priority assignment for periodic tasks.
#[derive(Debug, Clone, Copy)]
pub struct ShortestPeriod;

impl DispatchingRule for ShortestPeriod {
    fn name(&self) -> &'static str {
        "RMS"
    }

    fn evaluate(&self, process: &ProcessState, _context: &SchedulingContext) -> RuleScore {
        process.period
    }

    fn metric(&self) -> &'static str {
        "period"
    }

    fn description(&self) -> &'static str {
        "Rate Monotonic"
    }
}

// ======================== Aging ========================

/// Highest Response Ratio Next.
///
/// Response ratio = (waiting + burst) / burst, recomputed at every dispatch.
/// Short jobs are favoured, long waits raise a job's ratio so it cannot starve.
///
/// # Reference
/// Brinch Hansen (1971), "Short-Term Scheduling in Multiprogramming Systems"
#[derive(Debug, Clone, Copy)]
pub struct HighestResponseRatio;

impl HighestResponseRatio {
    /// Response ratio of a process at the context's time.
    pub fn ratio(process: &ProcessState, context: &SchedulingContext) -> f64 {
        if process.burst <= 0.0 {
            return f64::MAX;
        }
        (process.waited(context.now) + process.burst) / process.burst
    }
}

impl DispatchingRule for HighestResponseRatio {
    fn name(&self) -> &'static str {
        "HRRN"
    }

    fn evaluate(&self, process: &ProcessState, context: &SchedulingContext) -> RuleScore {
        -Self::ratio(process, context)
    }

    fn metric(&self) -> &'static str {
        "response ratio"
    }

    fn metric_value(&self, process: &ProcessState, context: &SchedulingContext) -> f64 {
        Self::ratio(process, context)
    }

    fn description(&self) -> &'static str {
        "Highest Response Ratio Next"
    }
}

// ======================== Placement ========================

/// Core affinity: prefers the process that last ran on the deciding core.
///
/// Only meaningful as a tie-breaker.
#[derive(Debug, Clone, Copy)]
pub struct CoreAffinity;

impl DispatchingRule for CoreAffinity {
    fn name(&self) -> &'static str {
        "AFFINITY"
    }

    fn evaluate(&self, process: &ProcessState, context: &SchedulingContext) -> RuleScore {
        if process.last_core == Some(context.core_id) {
            0.0
        } else {
            1.0
        }
    }

    fn metric(&self) -> &'static str {
        "core affinity"
    }

    fn description(&self) -> &'static str {
        "Core Affinity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Process;

    fn state(pid: &str, arrival: f64, burst: f64) -> ProcessState {
        ProcessState::from_process(0, &Process::new(pid, arrival, burst))
    }

    #[test]
    fn test_fcfs() {
        let ctx = SchedulingContext::at_time(5.0);
        let early = state("early", 1.0, 3.0);
        let late = state("late", 4.0, 1.0);
        assert!(EarliestArrival.evaluate(&early, &ctx) < EarliestArrival.evaluate(&late, &ctx));
    }

    #[test]
    fn test_sjf_ljf() {
        let ctx = SchedulingContext::at_time(0.0);
        let short = state("short", 0.0, 1.0);
        let long = state("long", 0.0, 5.0);
        assert!(ShortestBurst.evaluate(&short, &ctx) < ShortestBurst.evaluate(&long, &ctx));
        assert!(LongestBurst.evaluate(&long, &ctx) < LongestBurst.evaluate(&short, &ctx));
        assert!((LongestBurst.metric_value(&long, &ctx) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_rules() {
        let ctx = SchedulingContext::at_time(0.0);
        let mut almost_done = state("a", 0.0, 10.0);
        almost_done.remaining = 1.0;
        let fresh = state("b", 0.0, 4.0);
        assert!(
            ShortestRemaining.evaluate(&almost_done, &ctx)
                < ShortestRemaining.evaluate(&fresh, &ctx)
        );
        assert!(
            LongestRemaining.evaluate(&fresh, &ctx) < LongestRemaining.evaluate(&almost_done, &ctx)
        );
    }

    #[test]
    fn test_priority_missing_ranks_last() {
        let ctx = SchedulingContext::at_time(0.0);
        let mut high = state("high", 0.0, 1.0);
        high.priority = Some(1);
        let mut low = state("low", 0.0, 1.0);
        low.priority = Some(7);
        let none = state("none", 0.0, 1.0);
        let rule = LowestPriorityNumber;
        assert!(rule.evaluate(&high, &ctx) < rule.evaluate(&low, &ctx));
        assert!(rule.evaluate(&low, &ctx) < rule.evaluate(&none, &ctx));
    }

    #[test]
    fn test_hrrn_ratio() {
        // At t=3: P2 (arr 1, burst 2) waited 2 → 2.0; P3 (arr 2, burst 5) waited 1 → 1.2
        let ctx = SchedulingContext::at_time(3.0);
        let p2 = state("P2", 1.0, 2.0);
        let p3 = state("P3", 2.0, 5.0);
        assert!((HighestResponseRatio::ratio(&p2, &ctx) - 2.0).abs() < 1e-9);
        assert!((HighestResponseRatio::ratio(&p3, &ctx) - 1.2).abs() < 1e-9);
        assert!(
            HighestResponseRatio.evaluate(&p2, &ctx) < HighestResponseRatio.evaluate(&p3, &ctx)
        );
    }

    #[test]
    fn test_rms_period_fallback() {
        let ctx = SchedulingContext::at_time(0.0);
        let periodic =
            ProcessState::from_process(0, &Process::new("p", 0.0, 4.0).with_period(3.0));
        let aperiodic = state("a", 0.0, 2.0);
        assert!((ShortestPeriod.evaluate(&periodic, &ctx) - 3.0).abs() < 1e-9);
        assert!((ShortestPeriod.evaluate(&aperiodic, &ctx) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_affinity() {
        let ctx = SchedulingContext::at_time(0.0).on_core(1);
        let mut warm = state("warm", 0.0, 1.0);
        warm.last_core = Some(1);
        let cold = state("cold", 0.0, 1.0);
        assert!(CoreAffinity.evaluate(&warm, &ctx) < CoreAffinity.evaluate(&cold, &ctx));
    }
}
