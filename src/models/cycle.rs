//! Cycle data model.
//!
//! A `Cycle` is created active and receives exactly one terminal timestamp
//! (`interrupted_at` or `finished_at`) over its lifetime.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(Uuid);

impl CycleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CycleStatus {
    Active,
    Interrupted,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: CycleId,
    pub task: String,
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub interrupted_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Cycle {
    pub(crate) fn start(task: String, duration_minutes: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            id: CycleId::new(),
            task,
            duration_minutes,
            started_at,
            interrupted_at: None,
            finished_at: None,
        }
    }

    pub fn status(&self) -> CycleStatus {
        match (self.interrupted_at, self.finished_at) {
            (Some(_), _) => CycleStatus::Interrupted,
            (None, Some(_)) => CycleStatus::Finished,
            (None, None) => CycleStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == CycleStatus::Active
    }

    /// Planned length of the cycle in seconds.
    pub fn total_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }

    /// Whole seconds between `started_at` and `now`, clamped at zero when the
    /// clock went backwards.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.started_at).num_seconds();
        u64::try_from(elapsed).unwrap_or(0)
    }

    /// Returns `false` and leaves the cycle untouched if it already ended.
    pub(crate) fn mark_interrupted(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.interrupted_at = Some(at);
        true
    }

    /// Returns `false` and leaves the cycle untouched if it already ended.
    pub(crate) fn mark_finished(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.finished_at = Some(at);
        true
    }
}
