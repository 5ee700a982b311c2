//! Pure projections of a `CycleSnapshot` into what the front-end shows.

use serde::Serialize;

use super::state::{CycleSnapshot, Remaining};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub minutes: String,
    pub seconds: String,
}

impl Countdown {
    pub fn from_remaining(remaining: Remaining) -> Self {
        Self {
            minutes: format!("{:02}", remaining.minutes()),
            seconds: format!("{:02}", remaining.seconds()),
        }
    }

    pub fn from_snapshot(snapshot: &CycleSnapshot) -> Self {
        Self::from_remaining(snapshot.remaining())
    }

    pub fn to_clock(&self) -> String {
        format!("{}:{}", self.minutes, self.seconds)
    }
}

/// Title text: the countdown while a cycle runs, `app_name` otherwise.
pub fn window_title(snapshot: &CycleSnapshot, app_name: &str) -> String {
    if snapshot.is_active() {
        Countdown::from_snapshot(snapshot).to_clock()
    } else {
        app_name.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub is_active: bool,
    pub show_stop: bool,
    pub show_start: bool,
    pub inputs_disabled: bool,
}

impl Controls {
    pub fn from_snapshot(snapshot: &CycleSnapshot) -> Self {
        let is_active = snapshot.is_active();
        Self {
            is_active,
            show_stop: is_active,
            show_start: !is_active,
            inputs_disabled: is_active,
        }
    }
}
