//! Freshness gate
//!
//! Decides, per source, whether a run proceeds at all and which timestamp
//! it commits. The gate moves through
//! `Pending → (UpToDate | StaleNoNewDate | Proceeding) → Done`:
//! a recently synced source is skipped outright; a declared source date
//! that is not newer than the stored one aborts the stream before any
//! further parsing; otherwise the declared date becomes the candidate
//! persisted on successful commit.

use chrono::{DateTime, Duration, Utc};

/// Gate lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No decision yet
    Pending,
    /// Stored timestamp is recent; run skipped with no stream read
    UpToDate,
    /// Declared source date is not newer than the stored timestamp
    StaleNoNewDate,
    /// Run continues; candidate timestamp is set
    Proceeding,
    /// Run finished (committed or abandoned)
    Done,
}

/// Decision returned when the gate observes a declared source date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Keep streaming
    Proceed,
    /// Stop reading immediately; no writes
    Abort,
}

/// Per-run freshness state machine
#[derive(Debug)]
pub struct FreshnessGate {
    stored: Option<DateTime<Utc>>,
    threshold: Duration,
    candidate: Option<DateTime<Utc>>,
    state: GateState,
}

impl FreshnessGate {
    /// Build a gate from the stored per-source timestamp (if any) and a
    /// freshness threshold in days
    pub fn new(stored: Option<DateTime<Utc>>, threshold_days: i64) -> Self {
        Self {
            stored,
            threshold: Duration::days(threshold_days),
            candidate: None,
            state: GateState::Pending,
        }
    }

    /// Pre-stream check: true when the stored timestamp is more recent
    /// than `now - threshold`, meaning the run should skip entirely
    pub fn is_recent(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(stored) = self.stored {
            if stored > now - self.threshold {
                self.state = GateState::UpToDate;
                return true;
            }
        }
        false
    }

    /// Feed a declared source date. Only the first one becomes the
    /// candidate; later date lines are ignored.
    pub fn observe(&mut self, declared: DateTime<Utc>) -> GateDecision {
        if self.candidate.is_some() {
            return GateDecision::Proceed;
        }
        match self.stored {
            Some(stored) if declared <= stored => {
                self.state = GateState::StaleNoNewDate;
                GateDecision::Abort
            }
            _ => {
                self.candidate = Some(declared);
                self.state = GateState::Proceeding;
                GateDecision::Proceed
            }
        }
    }

    /// The timestamp to persist on successful commit, if the gate saw one
    pub fn candidate(&self) -> Option<DateTime<Utc>> {
        self.candidate
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Mark the run finished
    pub fn finish(&mut self) {
        self.state = GateState::Done;
    }
}
