//! Per-tick state snapshots reconstructed from a finished timeline.

use serde::{Deserialize, Serialize};

use super::state::EPSILON;
use crate::models::{GanttEvent, Process, IDLE_PID};

/// System state at one integer time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Tick.
    pub time: u64,
    /// Occupant per core (`IDLE`, `CS` or a pid), indexed by core id.
    pub running_pid: Vec<String>,
    /// Arrived, unfinished, not-running pids by arrival then input order.
    pub ready_queue: Vec<String>,
}

/// Builds snapshots for ticks `0..=ceil(makespan)`.
///
/// Always yields at least the snapshot at `t = 0`.
pub fn generate_snapshots(
    events: &[GanttEvent],
    processes: &[Process],
    core_count: usize,
) -> Vec<Snapshot> {
    let core_count = core_count.max(1);
    let makespan = events.iter().map(|e| e.end).fold(0.0_f64, f64::max);
    let last_tick = (makespan - EPSILON).ceil().max(0.0) as u64;

    let mut completion: Vec<Option<f64>> = vec![None; processes.len()];
    for (i, p) in processes.iter().enumerate() {
        completion[i] = events
            .iter()
            .filter(|e| e.pid.process_id() == Some(p.pid.as_str()))
            .map(|e| e.end)
            .reduce(f64::max);
    }

    let mut by_arrival: Vec<usize> = (0..processes.len()).collect();
    by_arrival.sort_by(|&a, &b| {
        processes[a]
            .arrival
            .total_cmp(&processes[b].arrival)
            .then(a.cmp(&b))
    });

    (0..=last_tick)
        .map(|tick| {
            let t = tick as f64;
            let mut running_pid = vec![IDLE_PID.to_string(); core_count];
            for ev in events.iter().filter(|e| e.contains(t)) {
                if let Some(slot) = running_pid.get_mut(ev.core()) {
                    *slot = ev.pid.as_str().to_string();
                }
            }

            let ready_queue = by_arrival
                .iter()
                .copied()
                .filter(|&i| {
                    let p = &processes[i];
                    p.arrival <= t + EPSILON
                        && completion[i].map_or(true, |c| c > t + EPSILON)
                        && !running_pid.contains(&p.pid)
                })
                .map(|i| processes[i].pid.clone())
                .collect();

            Snapshot {
                time: tick,
                running_pid,
                ready_queue,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventPid;

    #[test]
    fn test_single_core_snapshots() {
        let processes = vec![Process::new("P1", 0.0, 2.0), Process::new("P2", 1.0, 1.0)];
        let events = vec![
            GanttEvent::new("P1", 0.0, 2.0, 0),
            GanttEvent::new("P2", 2.0, 3.0, 0),
        ];

        let snaps = generate_snapshots(&events, &processes, 1);
        assert_eq!(snaps.len(), 4);
        assert_eq!(snaps[0].running_pid, vec!["P1"]);
        assert!(snaps[0].ready_queue.is_empty());
        assert_eq!(snaps[1].ready_queue, vec!["P2"]);
        assert_eq!(snaps[2].running_pid, vec!["P2"]);
        assert!(snaps[2].ready_queue.is_empty());
        assert_eq!(snaps[3].running_pid, vec!["IDLE"]);
    }

    #[test]
    fn test_multi_core_and_context_switch() {
        let processes = vec![Process::new("A", 0.0, 1.0), Process::new("B", 0.0, 2.0)];
        let events = vec![
            GanttEvent::new("A", 0.0, 1.0, 0),
            GanttEvent::new(EventPid::ContextSwitch, 1.0, 2.0, 0),
            GanttEvent::new("B", 0.0, 2.0, 1),
        ];

        let snaps = generate_snapshots(&events, &processes, 2);
        assert_eq!(snaps[0].running_pid, vec!["A", "B"]);
        assert_eq!(snaps[1].running_pid, vec!["CS", "B"]);
        assert_eq!(snaps[2].running_pid, vec!["IDLE", "IDLE"]);
    }

    #[test]
    fn test_empty_input_yields_initial_snapshot() {
        let snaps = generate_snapshots(&[], &[], 2);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].time, 0);
        assert_eq!(snaps[0].running_pid, vec!["IDLE", "IDLE"]);
        assert!(snaps[0].ready_queue.is_empty());
    }

    #[test]
    fn test_fractional_makespan_rounds_up() {
        let processes = vec![Process::new("A", 0.0, 2.5)];
        let events = vec![GanttEvent::new("A", 0.0, 2.5, 0)];
        let snaps = generate_snapshots(&events, &processes, 1);
        assert_eq!(snaps.last().map(|s| s.time), Some(3));
    }
}
