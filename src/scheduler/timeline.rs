//! Event stream builder.
//!
//! Appends intervals per core and coalesces a new interval into the
//! previous one on the same core when the occupant is the same and the
//! two touch. 1-tick preemptive policies therefore still produce one
//! event per contiguous run. `CS` intervals are never merged: each one is
//! a separate switch.

use log::trace;

use super::state::EPSILON;
use crate::models::{EventPid, GanttEvent};

/// Append-only builder of [`GanttEvent`]s.
#[derive(Debug, Clone)]
pub struct Timeline {
    events: Vec<GanttEvent>,
    /// Index of the latest event per core.
    last_on_core: Vec<Option<usize>>,
}

impl Timeline {
    /// Creates an empty timeline for `core_count` cores.
    pub fn new(core_count: usize) -> Self {
        Self {
            events: Vec::new(),
            last_on_core: vec![None; core_count],
        }
    }

    /// Appends `[start, end)` on `core`. Empty intervals are dropped.
    pub fn push(&mut self, pid: EventPid, start: f64, end: f64, core: usize) {
        if end - start <= EPSILON {
            return;
        }
        if core >= self.last_on_core.len() {
            self.last_on_core.resize(core + 1, None);
        }

        if let Some(i) = self.last_on_core[core] {
            let last = &mut self.events[i];
            let mergeable = pid != EventPid::ContextSwitch && last.pid == pid;
            if mergeable && (last.end - start).abs() <= EPSILON {
                trace!("core {core}: extend {} to {end}", last.pid);
                last.end = end;
                return;
            }
        }

        trace!("core {core}: {pid} [{start}, {end})");
        self.last_on_core[core] = Some(self.events.len());
        self.events.push(GanttEvent::new(pid, start, end, core));
    }

    /// Number of events so far.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Finished stream ordered by start time, then core.
    pub fn into_events(self) -> Vec<GanttEvent> {
        let mut events = self.events;
        events.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.core().cmp(&b.core())));
        events
    }
}
