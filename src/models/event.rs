//! Gantt timeline events.
//!
//! A schedule is a list of half-open intervals `[start, end)` per core.
//! Besides real processes, the timeline carries two synthetic occupants:
//! `IDLE` (nothing ready) and `CS` (context-switch overhead).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire name of the idle pseudo-process.
pub const IDLE_PID: &str = "IDLE";

/// Wire name of the context-switch pseudo-process.
pub const CONTEXT_SWITCH_PID: &str = "CS";

/// Occupant of a timeline interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventPid {
    /// A real process.
    Process(String),
    /// Core idle.
    Idle,
    /// Context-switch overhead.
    ContextSwitch,
}

impl EventPid {
    /// Whether this interval is real process work.
    pub fn is_process(&self) -> bool {
        matches!(self, Self::Process(_))
    }

    /// The process id, if this is real work.
    pub fn process_id(&self) -> Option<&str> {
        match self {
            Self::Process(pid) => Some(pid),
            _ => None,
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Process(pid) => pid,
            Self::Idle => IDLE_PID,
            Self::ContextSwitch => CONTEXT_SWITCH_PID,
        }
    }
}

impl From<String> for EventPid {
    fn from(s: String) -> Self {
        match s.as_str() {
            IDLE_PID => Self::Idle,
            CONTEXT_SWITCH_PID => Self::ContextSwitch,
            _ => Self::Process(s),
        }
    }
}

impl From<&str> for EventPid {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<EventPid> for String {
    fn from(pid: EventPid) -> Self {
        match pid {
            EventPid::Process(pid) => pid,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventPid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One contiguous interval on one core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttEvent {
    /// Occupant of the interval.
    pub pid: EventPid,
    /// Start time (inclusive).
    pub start: f64,
    /// End time (exclusive).
    pub end: f64,
    /// Core index. Legacy single-core timelines omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_id: Option<usize>,
}

impl GanttEvent {
    /// Creates an event on the given core.
    pub fn new(pid: impl Into<EventPid>, start: f64, end: f64, core_id: usize) -> Self {
        Self {
            pid: pid.into(),
            start,
            end,
            core_id: Some(core_id),
        }
    }

    /// Core index with a missing `core_id` normalized to core 0.
    #[inline]
    pub fn core(&self) -> usize {
        self.core_id.unwrap_or(0)
    }

    /// Interval length.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` falls inside `[start, end)`.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_wire_names() {
        assert_eq!(EventPid::from("IDLE"), EventPid::Idle);
        assert_eq!(EventPid::from("CS"), EventPid::ContextSwitch);
        assert_eq!(EventPid::from("P1"), EventPid::Process("P1".into()));
        assert_eq!(String::from(EventPid::ContextSwitch), "CS");
    }

    #[test]
    fn test_legacy_event_defaults_to_core_zero() {
        let json = r#"{"pid":"P1","start":0,"end":3}"#;
        let ev: GanttEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.core_id, None);
        assert_eq!(ev.core(), 0);
        assert!(ev.contains(0.0));
        assert!(!ev.contains(3.0));
    }

    #[test]
    fn test_event_serializes_pid_as_string() {
        let ev = GanttEvent::new(EventPid::Idle, 1.0, 2.0, 1);
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains(r#""pid":"IDLE""#));
        assert!(json.contains(r#""coreId":1"#));
    }
}
