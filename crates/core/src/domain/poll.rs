// Poll - a shell snippet re-executed on a fixed interval

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{DomainError, Result};
use super::name::validate_name;

/// Declarative definition of a polled value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSpec {
    /// Text shown before the first run completes and whenever a run fails
    pub fallback: String,
    /// Time between run starts (ms, must be > 0)
    pub interval_ms: u64,
    /// Shell snippet; its stdout becomes the displayed value
    pub script: String,
}

impl PollSpec {
    pub fn new(fallback: impl Into<String>, interval_ms: u64, script: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            interval_ms,
            script: script.into(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        validate_name("poll", name)?;
        self.check_schedule(name)
    }

    /// Interval and script checks, without the name rule
    pub fn check_schedule(&self, name: &str) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(DomainError::InvalidInterval {
                poll: name.to_string(),
                interval_ms: self.interval_ms,
            });
        }
        if self.script.trim().is_empty() {
            return Err(DomainError::EmptyCommand {
                kind: "poll",
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// How the current value of a poll was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    /// No run has completed yet; value is the fallback
    Pending,
    /// Value is the stdout of the last run
    Success,
    /// Last run failed; value is the fallback
    Fallback,
}

/// Observable state of one poller
///
/// Mutated only by the owning poller task. The value is always display-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollState {
    pub value: String,
    pub fallback: String,
    pub last_update_ms: Option<i64>,
    pub outcome: PollOutcome,
    pub runs: u64,
    pub failures: u64,
}

impl PollState {
    pub fn initial(fallback: impl Into<String>) -> Self {
        let fallback = fallback.into();
        Self {
            value: fallback.clone(),
            fallback,
            last_update_ms: None,
            outcome: PollOutcome::Pending,
            runs: 0,
            failures: 0,
        }
    }

    /// Record a successful run. Returns true if the displayed value or outcome changed.
    pub fn record_success(&mut self, stdout: &str, now_ms: i64) -> bool {
        let value = normalize_output(stdout);
        let changed = self.value != value || self.outcome != PollOutcome::Success;

        self.value = value.to_string();
        self.outcome = PollOutcome::Success;
        self.last_update_ms = Some(now_ms);
        self.runs += 1;
        changed
    }

    /// Record a failed run. Returns true if the displayed value or outcome changed.
    pub fn record_fallback(&mut self, now_ms: i64) -> bool {
        let changed = self.value != self.fallback || self.outcome != PollOutcome::Fallback;

        self.value = self.fallback.clone();
        self.outcome = PollOutcome::Fallback;
        self.last_update_ms = Some(now_ms);
        self.runs += 1;
        self.failures += 1;
        changed
    }
}

/// Strip the trailing line terminators a command prints after its value.
/// Interior newlines (multi-line values) are kept.
pub fn normalize_output(raw: &str) -> &str {
    raw.trim_end_matches(|c| c == '\n' || c == '\r')
}
