//! Simulation output.

use serde::{Deserialize, Serialize};

use super::decision::DecisionLog;
use super::metrics::Metrics;
use super::snapshot::{generate_snapshots, Snapshot};
use crate::models::{GanttEvent, Process, SimulationOptions};

/// Everything one simulation run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Timeline sorted by start time, then core.
    pub events: Vec<GanttEvent>,
    /// Per-process and aggregate metrics.
    pub metrics: Metrics,
    /// Per-tick replay states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<Vec<Snapshot>>,
    /// Dispatch decisions, present only when logging was enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<DecisionLog>>,
    /// Human-readable step lines, present only when logging was enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_logs: Option<Vec<String>>,
}

impl SimulationResult {
    pub(crate) fn assemble(
        events: Vec<GanttEvent>,
        processes: &[Process],
        options: &SimulationOptions,
        logs: Option<Vec<DecisionLog>>,
        step_logs: Option<Vec<String>>,
    ) -> Self {
        let metrics = Metrics::calculate(&events, processes, options);
        let snapshots = generate_snapshots(&events, processes, options.core_count);
        Self {
            events,
            metrics,
            snapshots: Some(snapshots),
            logs,
            step_logs,
        }
    }

    /// Events of one core, in time order.
    pub fn core_events(&self, core_id: usize) -> impl Iterator<Item = &GanttEvent> {
        self.events.iter().filter(move |e| e.core() == core_id)
    }

    /// Events of real process work only.
    pub fn process_events(&self) -> impl Iterator<Item = &GanttEvent> {
        self.events.iter().filter(|e| e.pid.is_process())
    }
}
