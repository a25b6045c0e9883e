//! Input validation for simulation runs.
//!
//! The engine itself never rejects input; these checks are for callers
//! that want problems reported up front instead of a silently odd
//! timeline. Detects:
//! - Duplicate or reserved pids
//! - Negative arrivals and non-positive bursts
//! - Non-finite numeric fields
//! - Options outside their usable range

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Process, SimulationOptions, CONTEXT_SWITCH_PID, IDLE_PID};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two processes share the same pid.
    DuplicatePid,
    /// A pid is empty or collides with a synthetic timeline occupant.
    ReservedPid,
    /// A process arrives before time 0.
    NegativeArrival,
    /// A process has no work to do.
    NonPositiveBurst,
    /// A numeric field is NaN or infinite.
    NonFiniteValue,
    /// A simulation option is out of range.
    InvalidOption,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a process list.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_processes(processes: &[Process]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut pids = HashSet::new();

    for p in processes {
        if p.pid.is_empty() || p.pid == IDLE_PID || p.pid == CONTEXT_SWITCH_PID {
            errors.push(ValidationError::new(
                ValidationErrorKind::ReservedPid,
                format!("Reserved or empty pid: '{}'", p.pid),
            ));
        }
        if !pids.insert(p.pid.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicatePid,
                format!("Duplicate pid: {}", p.pid),
            ));
        }

        let numeric = [
            ("arrival", Some(p.arrival)),
            ("burst", Some(p.burst)),
            ("shareWeight", p.share_weight),
            ("deadline", p.deadline),
            ("period", p.period),
        ];
        for (field, value) in numeric {
            if value.is_some_and(|v| !v.is_finite()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NonFiniteValue,
                    format!("Process '{}' has non-finite {}", p.pid, field),
                ));
            }
        }

        if p.arrival < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeArrival,
                format!("Process '{}' arrives at {}", p.pid, p.arrival),
            ));
        }
        if p.burst <= 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveBurst,
                format!("Process '{}' has burst {}", p.pid, p.burst),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates simulation options.
///
/// The engine normalizes options anyway; this reports what normalization
/// would silently change.
pub fn validate_options(options: &SimulationOptions) -> ValidationResult {
    let mut errors = Vec::new();
    let mut positive = |name: &str, value: f64| {
        if !(value.is_finite() && value > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidOption,
                format!("{name} must be a positive finite number, got {value}"),
            ));
        }
    };

    positive("quantum", options.quantum);
    if let Some(q) = options.fair_share_quantum {
        positive("fairShareQuantum", q);
    }
    positive("mlfqQuanta[0]", options.mlfq_quanta[0]);
    positive("mlfqQuanta[1]", options.mlfq_quanta[1]);

    let overhead = options.context_switch_overhead;
    if !(overhead.is_finite() && overhead >= 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidOption,
            format!("contextSwitchOverhead must be >= 0, got {overhead}"),
        ));
    }
    if options.core_count == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidOption,
            "coreCount must be at least 1",
        ));
    }

    let energy = &options.energy_config;
    for (name, value) in [
        ("activeWatts", energy.active_watts),
        ("idleWatts", energy.idle_watts),
        ("switchJoules", energy.switch_joules),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidOption,
                format!("energyConfig.{name} must be >= 0, got {value}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
