//! Policy entry points and name-based dispatch.
//!
//! Every `run_*` function has the same shape: processes and options in,
//! a complete [`SimulationResult`] out. Inputs are never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::policies::{
    FairSharePolicy, LotteryPolicy, MlfqPolicy, MultilevelQueuePolicy, RankedPolicy,
    RoundRobinPolicy,
};
use super::result::SimulationResult;
use super::simulator::run_policy;
use crate::error::SimulationError;
use crate::models::{Process, SimulationOptions};
use crate::validation::{validate_options, validate_processes};

/// First Come First Served.
pub fn run_fcfs(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::fcfs(options), processes, options)
}

/// Shortest Job First (non-preemptive).
pub fn run_sjf(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::sjf(options), processes, options)
}

/// Shortest Remaining Time First.
pub fn run_srtf(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::srtf(options), processes, options)
}

/// Round Robin with `options.quantum`.
pub fn run_round_robin(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    let quantum = options.normalized().quantum;
    run_policy(RoundRobinPolicy::new(quantum), processes, options)
}

/// Round Robin with a bare quantum and otherwise default options.
pub fn run_round_robin_with_quantum(processes: &[Process], quantum: f64) -> SimulationResult {
    run_round_robin(processes, &SimulationOptions::from(quantum))
}

/// Non-preemptive priority (lower number = more important).
pub fn run_priority(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::priority(options), processes, options)
}

/// Preemptive priority.
pub fn run_priority_preemptive(
    processes: &[Process],
    options: &SimulationOptions,
) -> SimulationResult {
    run_policy(RankedPolicy::priority_preemptive(options), processes, options)
}

/// Highest Response Ratio Next.
pub fn run_hrrn(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::hrrn(options), processes, options)
}

/// Longest Job First (non-preemptive).
pub fn run_ljf(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::ljf(options), processes, options)
}

/// Longest Remaining Time First.
pub fn run_lrtf(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::lrtf(options), processes, options)
}

/// Two-level fixed multilevel queue.
pub fn run_multilevel_queue(
    processes: &[Process],
    options: &SimulationOptions,
) -> SimulationResult {
    let quantum = options.normalized().quantum;
    run_policy(MultilevelQueuePolicy::new(quantum), processes, options)
}

/// Three-level feedback queue.
pub fn run_mlfq(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(MlfqPolicy::new(&options.normalized()), processes, options)
}

/// Weighted fair share between groups.
pub fn run_fair_share(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    let quantum = options.normalized().effective_fair_share_quantum();
    run_policy(FairSharePolicy::new(quantum), processes, options)
}

/// Lottery scheduling seeded from `options.random_seed`.
pub fn run_lottery(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(LotteryPolicy::new(options.random_seed), processes, options)
}

/// Rate Monotonic (shorter period = more important).
pub fn run_rate_monotonic(processes: &[Process], options: &SimulationOptions) -> SimulationResult {
    run_policy(RankedPolicy::rate_monotonic(options), processes, options)
}

/// Scheduling policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    /// First Come First Served.
    Fcfs,
    /// Shortest Job First.
    Sjf,
    /// Shortest Remaining Time First.
    Srtf,
    /// Round Robin.
    #[serde(rename = "RR")]
    RoundRobin,
    /// Non-preemptive priority.
    Priority,
    /// Preemptive priority.
    #[serde(rename = "PRIORITY_P")]
    PriorityPreemptive,
    /// Highest Response Ratio Next.
    Hrrn,
    /// Longest Job First.
    Ljf,
    /// Longest Remaining Time First.
    Lrtf,
    /// Two-level multilevel queue.
    #[serde(rename = "MQ")]
    MultilevelQueue,
    /// Multilevel feedback queue.
    Mlfq,
    /// Weighted fair share.
    FairShare,
    /// Lottery.
    Lottery,
    /// Rate Monotonic.
    #[serde(rename = "RMS")]
    RateMonotonic,
}

impl Algorithm {
    /// Every algorithm, in a stable order.
    pub const ALL: [Algorithm; 14] = [
        Algorithm::Fcfs,
        Algorithm::Sjf,
        Algorithm::Srtf,
        Algorithm::RoundRobin,
        Algorithm::Priority,
        Algorithm::PriorityPreemptive,
        Algorithm::Hrrn,
        Algorithm::Ljf,
        Algorithm::Lrtf,
        Algorithm::MultilevelQueue,
        Algorithm::Mlfq,
        Algorithm::FairShare,
        Algorithm::Lottery,
        Algorithm::RateMonotonic,
    ];

    /// Canonical short name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::Sjf => "SJF",
            Self::Srtf => "SRTF",
            Self::RoundRobin => "RR",
            Self::Priority => "PRIORITY",
            Self::PriorityPreemptive => "PRIORITY_P",
            Self::Hrrn => "HRRN",
            Self::Ljf => "LJF",
            Self::Lrtf => "LRTF",
            Self::MultilevelQueue => "MQ",
            Self::Mlfq => "MLFQ",
            Self::FairShare => "FAIR_SHARE",
            Self::Lottery => "LOTTERY",
            Self::RateMonotonic => "RMS",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        let algorithm = match key.as_str() {
            "FCFS" | "FIFO" => Self::Fcfs,
            "SJF" | "SJN" => Self::Sjf,
            "SRTF" | "SRT" | "SJF_P" | "SJF_PREEMPTIVE" => Self::Srtf,
            "RR" | "ROUND_ROBIN" | "ROUNDROBIN" => Self::RoundRobin,
            "PRIORITY" | "PRIORITY_NP" | "PRIORITY_NON_PREEMPTIVE" => Self::Priority,
            "PRIORITY_P" | "PRIORITY_PREEMPTIVE" => Self::PriorityPreemptive,
            "HRRN" => Self::Hrrn,
            "LJF" => Self::Ljf,
            "LRTF" => Self::Lrtf,
            "MQ" | "MULTILEVEL" | "MULTILEVEL_QUEUE" => Self::MultilevelQueue,
            "MLFQ" | "MULTILEVEL_FEEDBACK_QUEUE" => Self::Mlfq,
            "FAIR_SHARE" | "FAIRSHARE" | "FS" => Self::FairShare,
            "LOTTERY" => Self::Lottery,
            "RMS" | "RM" | "RATE_MONOTONIC" => Self::RateMonotonic,
            _ => return Err(SimulationError::UnknownAlgorithm(s.to_string())),
        };
        Ok(algorithm)
    }
}

/// Runs the policy named by `algorithm`.
pub fn simulate(
    algorithm: Algorithm,
    processes: &[Process],
    options: &SimulationOptions,
) -> SimulationResult {
    let run: fn(&[Process], &SimulationOptions) -> SimulationResult = match algorithm {
        Algorithm::Fcfs => run_fcfs,
        Algorithm::Sjf => run_sjf,
        Algorithm::Srtf => run_srtf,
        Algorithm::RoundRobin => run_round_robin,
        Algorithm::Priority => run_priority,
        Algorithm::PriorityPreemptive => run_priority_preemptive,
        Algorithm::Hrrn => run_hrrn,
        Algorithm::Ljf => run_ljf,
        Algorithm::Lrtf => run_lrtf,
        Algorithm::MultilevelQueue => run_multilevel_queue,
        Algorithm::Mlfq => run_mlfq,
        Algorithm::FairShare => run_fair_share,
        Algorithm::Lottery => run_lottery,
        Algorithm::RateMonotonic => run_rate_monotonic,
    };
    run(processes, options)
}

/// Validates processes and options, then runs the policy.
///
/// # Errors
/// [`SimulationError::InvalidInput`] with every problem found.
pub fn simulate_checked(
    algorithm: Algorithm,
    processes: &[Process],
    options: &SimulationOptions,
) -> Result<SimulationResult, SimulationError> {
    let mut errors = Vec::new();
    if let Err(e) = validate_processes(processes) {
        errors.extend(e);
    }
    if let Err(e) = validate_options(options) {
        errors.extend(e);
    }
    if !errors.is_empty() {
        return Err(SimulationError::InvalidInput(errors));
    }
    Ok(simulate(algorithm, processes, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("fcfs".parse::<Algorithm>().unwrap(), Algorithm::Fcfs);
        assert_eq!("rr".parse::<Algorithm>().unwrap(), Algorithm::RoundRobin);
        assert_eq!(
            "Round-Robin".parse::<Algorithm>().unwrap(),
            Algorithm::RoundRobin
        );
        assert_eq!(
            "priority_p".parse::<Algorithm>().unwrap(),
            Algorithm::PriorityPreemptive
        );
        assert_eq!(
            " fair share ".parse::<Algorithm>().unwrap(),
            Algorithm::FairShare
        );
        assert!(matches!(
            "edf".parse::<Algorithm>(),
            Err(SimulationError::UnknownAlgorithm(name)) if name == "edf"
        ));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Algorithm::PriorityPreemptive).unwrap();
        assert_eq!(json, r#""PRIORITY_P""#);
        let parsed: Algorithm = serde_json::from_str(r#""FAIR_SHARE""#).unwrap();
        assert_eq!(parsed, Algorithm::FairShare);
    }

    #[test]
    fn test_simulate_checked_rejects_bad_input() {
        let processes = vec![Process::new("P1", 0.0, 1.0), Process::new("P1", 0.0, 0.0)];
        let opts = SimulationOptions::default().with_core_count(0);
        let Err(SimulationError::InvalidInput(errors)) =
            simulate_checked(Algorithm::Fcfs, &processes, &opts)
        else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_round_robin_shorthand() {
        let processes = vec![Process::new("A", 0.0, 3.0), Process::new("B", 0.0, 3.0)];
        let short = run_round_robin_with_quantum(&processes, 1.0);
        let long = run_round_robin(&processes, &SimulationOptions::default().with_quantum(1.0));
        assert_eq!(short.events, long.events);
        assert_eq!(short.events[0].end, 1.0);
    }
}
