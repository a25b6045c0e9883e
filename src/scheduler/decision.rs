//! Decision log recorder.
//!
//! Purely additive: the simulator reports every dispatch, preemption and
//! completion here, and the recorder drops everything when logging is
//! disabled. Nothing read back from the recorder feeds a scheduling
//! decision.

use serde::{Deserialize, Serialize};

use crate::dispatching::format_value;

/// One dispatch decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLog {
    /// Decision time.
    pub time: f64,
    /// Deciding core.
    pub core_id: usize,
    /// What happened (e.g. "Dispatch P2").
    pub message: String,
    /// Why, naming the winning comparator value.
    pub reason: String,
    /// Candidate pids at decision time, in the policy's queue order.
    pub queue_state: Vec<String>,
}

/// Collects [`DecisionLog`]s and step lines for one run.
#[derive(Debug, Clone, Default)]
pub struct DecisionRecorder {
    enabled: bool,
    logs: Vec<DecisionLog>,
    steps: Vec<String>,
}

impl DecisionRecorder {
    /// Creates a recorder. A disabled recorder discards everything.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            logs: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Whether anything is being recorded.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records a dispatch of `pid` chosen from `queue_state`.
    pub fn dispatch(
        &mut self,
        time: f64,
        core_id: usize,
        pid: &str,
        reason: String,
        queue_state: Vec<String>,
    ) {
        if !self.enabled {
            return;
        }
        self.steps.push(format!(
            "[t={}] core {core_id}: dispatch {pid} ({reason})",
            format_value(time)
        ));
        self.logs.push(DecisionLog {
            time,
            core_id,
            message: format!("Dispatch {pid}"),
            reason,
            queue_state,
        });
    }

    /// Records `victim` losing its core to `winner`.
    pub fn preemption(&mut self, time: f64, core_id: usize, victim: &str, winner: &str) {
        if !self.enabled {
            return;
        }
        self.steps.push(format!(
            "[t={}] core {core_id}: {winner} preempts {victim}",
            format_value(time)
        ));
    }

    /// Records a switch that was overtaken before its target ever ran.
    pub fn redirect(&mut self, time: f64, core_id: usize, abandoned: &str, winner: &str) {
        if !self.enabled {
            return;
        }
        self.steps.push(format!(
            "[t={}] core {core_id}: switch to {abandoned} redirected to {winner}",
            format_value(time)
        ));
    }

    /// Records a context switch on a core.
    pub fn context_switch(&mut self, time: f64, core_id: usize, from: &str, to: &str) {
        if !self.enabled {
            return;
        }
        self.steps.push(format!(
            "[t={}] core {core_id}: context switch {from} -> {to}",
            format_value(time)
        ));
    }

    /// Records a completion.
    pub fn completion(&mut self, time: f64, core_id: usize, pid: &str) {
        if !self.enabled {
            return;
        }
        self.steps.push(format!(
            "[t={}] core {core_id}: {pid} completes",
            format_value(time)
        ));
    }

    /// Structured logs and step lines, `None` when disabled.
    pub fn into_parts(self) -> (Option<Vec<DecisionLog>>, Option<Vec<String>>) {
        if self.enabled {
            (Some(self.logs), Some(self.steps))
        } else {
            (None, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_recorder_is_silent() {
        let mut rec = DecisionRecorder::new(false);
        rec.dispatch(0.0, 0, "P1", "FCFS".into(), vec!["P1".into()]);
        rec.completion(3.0, 0, "P1");
        assert_eq!(rec.into_parts(), (None, None));
    }

    #[test]
    fn test_records_dispatch_and_steps() {
        let mut rec = DecisionRecorder::new(true);
        rec.dispatch(
            2.0,
            1,
            "P2",
            "Shortest Job First: P2 burst = 2".into(),
            vec!["P2".into(), "P3".into()],
        );
        rec.preemption(2.0, 1, "P1", "P2");
        rec.completion(4.5, 1, "P2");

        let (logs, steps) = rec.into_parts();
        let logs = logs.unwrap();
        let steps = steps.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Dispatch P2");
        assert_eq!(logs[0].queue_state, vec!["P2", "P3"]);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1], "[t=2] core 1: P2 preempts P1");
        assert_eq!(steps[2], "[t=4.50] core 1: P2 completes");
    }

    #[test]
    fn test_redirect_is_not_a_preemption() {
        let mut rec = DecisionRecorder::new(true);
        rec.redirect(2.0, 0, "B", "C");

        let (_, steps) = rec.into_parts();
        let steps = steps.unwrap();
        assert_eq!(steps, vec!["[t=2] core 0: switch to B redirected to C"]);
        assert!(!steps[0].contains("preempts"));
    }
}
