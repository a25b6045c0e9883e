//! Process model.
//!
//! A process is the unit of CPU work handed to the simulator. The record is
//! immutable: every simulation run copies it into its own working state
//! (remaining time, queue membership) and never writes back.
//!
//! # Time Representation
//! All times are logical ticks relative to t=0. Integral inputs stay integral
//! through every policy; fractional values are accepted.

use serde::{Deserialize, Serialize};

/// Default ticket count for lottery scheduling.
pub const DEFAULT_TICKETS: u32 = 1;

/// Default fair-share group weight.
pub const DEFAULT_SHARE_WEIGHT: f64 = 1.0;

/// Fair-share group used when a process names none.
pub const DEFAULT_SHARE_GROUP: &str = "default";

/// A process to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Unique process identifier.
    pub pid: String,
    /// Arrival time (ticks, ≥ 0).
    pub arrival: f64,
    /// Total CPU time required (ticks, > 0).
    pub burst: f64,
    /// Static priority. Lower = more important. `None` = least important.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Lottery tickets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<u32>,
    /// Fair-share group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_group: Option<String>,
    /// Fair-share group weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_weight: Option<f64>,
    /// Absolute completion deadline (ticks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<f64>,
    /// Period for rate-monotonic scheduling (ticks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<f64>,
}

impl Process {
    /// Creates a process with the given pid, arrival and burst.
    pub fn new(pid: impl Into<String>, arrival: f64, burst: f64) -> Self {
        Self {
            pid: pid.into(),
            arrival,
            burst,
            priority: None,
            tickets: None,
            share_group: None,
            share_weight: None,
            deadline: None,
            period: None,
        }
    }

    /// Sets the static priority (lower = more important).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the lottery ticket count.
    pub fn with_tickets(mut self, tickets: u32) -> Self {
        self.tickets = Some(tickets);
        self
    }

    /// Assigns the process to a fair-share group.
    pub fn with_share_group(mut self, group: impl Into<String>) -> Self {
        self.share_group = Some(group.into());
        self
    }

    /// Sets the fair-share weight of the process's group.
    pub fn with_share_weight(mut self, weight: f64) -> Self {
        self.share_weight = Some(weight);
        self
    }

    /// Sets the completion deadline.
    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the rate-monotonic period.
    pub fn with_period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }

    /// Ticket count with zero or missing coerced to [`DEFAULT_TICKETS`].
    pub fn effective_tickets(&self) -> u32 {
        match self.tickets {
            Some(t) if t > 0 => t,
            _ => DEFAULT_TICKETS,
        }
    }

    /// Rate-monotonic period: `period`, falling back to `burst`.
    pub fn effective_period(&self) -> f64 {
        match self.period {
            Some(p) if p > 0.0 => p,
            _ => self.burst,
        }
    }

    /// Fair-share group, falling back to [`DEFAULT_SHARE_GROUP`].
    pub fn effective_share_group(&self) -> &str {
        self.share_group.as_deref().unwrap_or(DEFAULT_SHARE_GROUP)
    }

    /// Fair-share weight; non-positive or missing weights count as 1.
    pub fn effective_share_weight(&self) -> f64 {
        match self.share_weight {
            Some(w) if w > 0.0 && w.is_finite() => w,
            _ => DEFAULT_SHARE_WEIGHT,
        }
    }
}
