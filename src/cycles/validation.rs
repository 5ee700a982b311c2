use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_CYCLE_MINUTES: u32 = 1;
pub const MAX_CYCLE_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Describe your task")]
    EmptyTask,
    #[error("Cycle length must be between 1 and 60 minutes (got {0})")]
    MinutesOutOfRange(u32),
}

/// Raw input as typed by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCycleForm {
    pub task: String,
    pub minutes_amount: u32,
}

/// A new-cycle request that passed validation. Only `NewCycleForm::validate`
/// can build one, so the tracker never sees an empty task or an out-of-range
/// duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRequest {
    task: String,
    duration_minutes: u32,
}

impl CycleRequest {
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub(crate) fn into_parts(self) -> (String, u32) {
        (self.task, self.duration_minutes)
    }
}

impl NewCycleForm {
    pub fn new(task: impl Into<String>, minutes_amount: u32) -> Self {
        Self {
            task: task.into(),
            minutes_amount,
        }
    }

    pub fn validate(self) -> Result<CycleRequest, ValidationError> {
        let task = self.task.trim();
        if task.is_empty() {
            return Err(ValidationError::EmptyTask);
        }
        validate_minutes(self.minutes_amount)?;

        Ok(CycleRequest {
            task: task.to_string(),
            duration_minutes: self.minutes_amount,
        })
    }
}

pub fn validate_minutes(minutes: u32) -> Result<u32, ValidationError> {
    if (MIN_CYCLE_MINUTES..=MAX_CYCLE_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(ValidationError::MinutesOutOfRange(minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert!(NewCycleForm::new("Read", 1).validate().is_ok());
        assert!(NewCycleForm::new("Read", 60).validate().is_ok());
    }

    #[test]
    fn rejects_blank_task() {
        let err = NewCycleForm::new("   ", 25).validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyTask);
        assert_eq!(err.to_string(), "Describe your task");
    }

    #[test]
    fn rejects_out_of_range_minutes() {
        assert_eq!(
            NewCycleForm::new("Read", 0).validate().unwrap_err(),
            ValidationError::MinutesOutOfRange(0)
        );
        assert_eq!(
            NewCycleForm::new("Read", 61).validate().unwrap_err(),
            ValidationError::MinutesOutOfRange(61)
        );
    }

    #[test]
    fn trims_task() {
        let request = NewCycleForm::new("  Write report \n", 25).validate().unwrap();
        assert_eq!(request.task(), "Write report");
        assert_eq!(request.duration_minutes(), 25);
    }
}
