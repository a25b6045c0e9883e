//! Schedule performance metrics.
//!
//! Computed from the finished event stream and the input processes only,
//! so the same aggregator scores any timeline, including ones not produced
//! by this crate.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Completion | Latest end of the process's events |
//! | Turnaround | completion - arrival |
//! | Waiting | turnaround - burst |
//! | Response | first real execution - arrival |
//! | Context switches | `CS` events, or pid changes per core without overhead |
//! | CPU utilization | busy time / (makespan × cores) × 100 |
//! | Energy | busy × active W + idle × idle W + switches × switch J |
//!
//! Aggregates are the arithmetic mean, population standard deviation and
//! nearest-rank 95th percentile of each per-process distribution.
//!
//! # Reference
//! Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.2

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::state::EPSILON;
use crate::models::{EventPid, GanttEvent, Process, SimulationOptions};

/// Energy breakdown (J).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyMetrics {
    /// Sum of the three components.
    pub total_energy: f64,
    /// Energy spent executing processes.
    pub active_energy: f64,
    /// Energy spent idle.
    pub idle_energy: f64,
    /// Energy spent on context switches.
    pub switch_energy: f64,
}

/// Mean, 95th percentile and standard deviation of a distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Nearest-rank 95th percentile.
    pub p95: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl Summary {
    /// Summarizes `values`. Empty input gives all zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let rank = ((0.95 * n).ceil() as usize).clamp(1, sorted.len());

        Self {
            mean,
            p95: sorted[rank - 1],
            std_dev: variance.sqrt(),
        }
    }
}

/// Per-process and aggregate schedule metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Completion time per pid.
    pub completion: BTreeMap<String, f64>,
    /// Turnaround time per pid.
    pub turnaround: BTreeMap<String, f64>,
    /// Waiting time per pid.
    pub waiting: BTreeMap<String, f64>,
    /// Response time per pid.
    pub response: BTreeMap<String, f64>,
    /// Mean turnaround.
    pub avg_turnaround: f64,
    /// Mean waiting.
    pub avg_waiting: f64,
    /// Mean response.
    pub avg_response: f64,
    /// Turnaround distribution.
    pub turnaround_stats: Summary,
    /// Waiting distribution.
    pub waiting_stats: Summary,
    /// Response distribution.
    pub response_stats: Summary,
    /// Number of context switches.
    pub context_switches: usize,
    /// Busy share of total core capacity (0–100).
    pub cpu_utilization: f64,
    /// End of the last event.
    pub makespan: f64,
    /// Processes completing after their deadline.
    pub deadline_misses: usize,
    /// Energy breakdown.
    pub energy: EnergyMetrics,
}

impl Metrics {
    /// Computes metrics from a finished event stream.
    ///
    /// # Arguments
    /// * `events` - The timeline (missing `core_id` counts as core 0).
    /// * `processes` - The input processes (arrival, burst, deadline).
    /// * `options` - Core count, overhead and power model.
    pub fn calculate(
        events: &[GanttEvent],
        processes: &[Process],
        options: &SimulationOptions,
    ) -> Self {
        let mut completion_at: HashMap<&str, f64> = HashMap::new();
        let mut first_run_at: HashMap<&str, f64> = HashMap::new();
        let mut busy_time = 0.0;
        let mut switch_time = 0.0;
        let mut cs_events = 0usize;
        let mut makespan: f64 = 0.0;

        for ev in events {
            makespan = makespan.max(ev.end);
            match &ev.pid {
                EventPid::Process(pid) => {
                    busy_time += ev.duration();
                    let c = completion_at.entry(pid.as_str()).or_insert(ev.end);
                    *c = c.max(ev.end);
                    let f = first_run_at.entry(pid.as_str()).or_insert(ev.start);
                    *f = f.min(ev.start);
                }
                EventPid::ContextSwitch => {
                    switch_time += ev.duration();
                    cs_events += 1;
                }
                EventPid::Idle => {}
            }
        }

        let mut metrics = Self {
            makespan,
            ..Self::default()
        };

        for p in processes {
            let Some(&completion) = completion_at.get(p.pid.as_str()) else {
                continue;
            };
            let turnaround = completion - p.arrival;
            metrics.completion.insert(p.pid.clone(), completion);
            metrics.turnaround.insert(p.pid.clone(), turnaround);
            metrics.waiting.insert(p.pid.clone(), turnaround - p.burst);
            if let Some(&first) = first_run_at.get(p.pid.as_str()) {
                metrics.response.insert(p.pid.clone(), first - p.arrival);
            }
            if p.deadline.is_some_and(|d| completion > d + EPSILON) {
                metrics.deadline_misses += 1;
            }
        }

        metrics.turnaround_stats = Summary::of(&values(&metrics.turnaround));
        metrics.waiting_stats = Summary::of(&values(&metrics.waiting));
        metrics.response_stats = Summary::of(&values(&metrics.response));
        metrics.avg_turnaround = metrics.turnaround_stats.mean;
        metrics.avg_waiting = metrics.waiting_stats.mean;
        metrics.avg_response = metrics.response_stats.mean;

        metrics.context_switches = if options.context_switch_overhead > 0.0 {
            cs_events
        } else {
            pid_transitions(events)
        };

        let capacity = makespan * options.core_count.max(1) as f64;
        metrics.cpu_utilization = if capacity > 0.0 {
            busy_time / capacity * 100.0
        } else {
            0.0
        };

        let idle_time = (capacity - busy_time - switch_time).max(0.0);
        let power = &options.energy_config;
        let active_energy = busy_time * power.active_watts;
        let idle_energy = idle_time * power.idle_watts;
        let switch_energy = metrics.context_switches as f64 * power.switch_joules;
        metrics.energy = EnergyMetrics {
            total_energy: active_energy + idle_energy + switch_energy,
            active_energy,
            idle_energy,
            switch_energy,
        };

        metrics
    }
}

fn values(map: &BTreeMap<String, f64>) -> Vec<f64> {
    map.values().copied().collect()
}

/// Adjacent pid changes per core, ignoring `IDLE` and `CS`.
fn pid_transitions(events: &[GanttEvent]) -> usize {
    let mut by_core: BTreeMap<usize, Vec<&GanttEvent>> = BTreeMap::new();
    for ev in events.iter().filter(|e| e.pid.is_process()) {
        by_core.entry(ev.core()).or_default().push(ev);
    }

    by_core
        .values_mut()
        .map(|core_events| {
            core_events.sort_by(|a, b| a.start.total_cmp(&b.start));
            core_events
                .windows(2)
                .filter(|w| w[0].pid != w[1].pid)
                .count()
        })
        .sum()
}
