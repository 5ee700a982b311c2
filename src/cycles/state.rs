use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Cycle, CycleId};

use super::validation::CycleRequest;

/// Remaining time of the active cycle, in whole seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Remaining {
    pub total_secs: u64,
}

impl Remaining {
    pub const ZERO: Remaining = Remaining { total_secs: 0 };

    pub fn from_secs(total_secs: u64) -> Self {
        Self { total_secs }
    }

    pub fn minutes(&self) -> u64 {
        self.total_secs / 60
    }

    pub fn seconds(&self) -> u64 {
        self.total_secs % 60
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No active cycle; nothing changed.
    Idle,
    Counting {
        cycle_id: CycleId,
        remaining: Remaining,
    },
    /// The active cycle reached its duration and was marked finished.
    Finished { cycle: Cycle },
}

impl TickOutcome {
    pub fn remaining(&self) -> Remaining {
        match self {
            TickOutcome::Counting { remaining, .. } => *remaining,
            TickOutcome::Idle | TickOutcome::Finished { .. } => Remaining::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TickOutcome::Counting { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleSnapshot {
    pub active_cycle: Option<Cycle>,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
}

impl CycleSnapshot {
    pub fn is_active(&self) -> bool {
        self.active_cycle.is_some()
    }

    pub fn remaining(&self) -> Remaining {
        Remaining::from_secs(self.remaining_secs)
    }
}

/// Ordered, append-only collection of cycles plus the active-cycle pointer.
#[derive(Debug, Clone, Default)]
pub struct CycleTracker {
    cycles: Vec<Cycle>,
    active_cycle_id: Option<CycleId>,
    /// Seconds elapsed in the active cycle as of the last tick.
    elapsed_secs: u64,
}

impl CycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    pub fn active_cycle_id(&self) -> Option<CycleId> {
        self.active_cycle_id
    }

    pub fn active_cycle(&self) -> Option<&Cycle> {
        let id = self.active_cycle_id?;
        self.cycles.iter().find(|cycle| cycle.id == id)
    }

    fn active_cycle_mut(&mut self) -> Option<&mut Cycle> {
        let id = self.active_cycle_id?;
        self.cycles.iter_mut().find(|cycle| cycle.id == id)
    }

    pub fn is_active(&self) -> bool {
        self.active_cycle_id.is_some()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.active_cycle()
            .map(|cycle| cycle.total_secs().saturating_sub(self.elapsed_secs))
            .unwrap_or(0)
    }

    /// Appends a new active cycle. A cycle that is still active gets
    /// interrupted at `now` first.
    pub fn create(&mut self, request: CycleRequest, now: DateTime<Utc>) -> CycleId {
        self.interrupt(now);

        let (task, duration_minutes) = request.into_parts();
        let cycle = Cycle::start(task, duration_minutes, now);
        let id = cycle.id;

        self.cycles.push(cycle);
        self.active_cycle_id = Some(id);
        self.elapsed_secs = 0;
        id
    }

    /// Marks the active cycle interrupted and returns it. No-op without an
    /// active cycle.
    pub fn interrupt(&mut self, now: DateTime<Utc>) -> Option<Cycle> {
        let cycle = self.active_cycle_mut()?;
        cycle.mark_interrupted(now);
        let interrupted = cycle.clone();

        self.active_cycle_id = None;
        Some(interrupted)
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let Some(cycle) = self.active_cycle_mut() else {
            return TickOutcome::Idle;
        };

        let elapsed = cycle.elapsed_secs(now);
        let total = cycle.total_secs();

        if elapsed >= total {
            cycle.mark_finished(now);
            let finished = cycle.clone();
            self.active_cycle_id = None;
            self.elapsed_secs = total;
            return TickOutcome::Finished { cycle: finished };
        }

        let cycle_id = cycle.id;
        self.elapsed_secs = elapsed;
        TickOutcome::Counting {
            cycle_id,
            remaining: Remaining::from_secs(total - elapsed),
        }
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        let active_cycle = self.active_cycle().cloned();
        CycleSnapshot {
            elapsed_secs: if active_cycle.is_some() {
                self.elapsed_secs
            } else {
                0
            },
            remaining_secs: self.remaining_secs(),
            active_cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles::validation::NewCycleForm;
    use crate::models::CycleStatus;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn request(task: &str, minutes: u32) -> CycleRequest {
        NewCycleForm::new(task, minutes).validate().unwrap()
    }

    fn active_count(tracker: &CycleTracker) -> usize {
        tracker.cycles().iter().filter(|c| c.is_active()).count()
    }

    #[test]
    fn create_yields_single_active_cycle() {
        let mut tracker = CycleTracker::new();
        let id = tracker.create(request("Write report", 25), t0());

        let active = tracker.active_cycle().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.duration_minutes, 25);
        assert_eq!(active.started_at, t0());
        assert_eq!(tracker.elapsed_secs(), 0);
        assert_eq!(tracker.remaining_secs(), 1500);
        assert_eq!(active_count(&tracker), 1);
    }

    #[test]
    fn one_minute_cycle_counts_down_then_finishes() {
        let mut tracker = CycleTracker::new();
        tracker.create(request("Write report", 1), t0());

        let half = tracker.tick(t0() + Duration::seconds(30));
        assert_eq!(half.remaining(), Remaining::from_secs(30));
        assert_eq!(half.remaining().minutes(), 0);
        assert_eq!(half.remaining().seconds(), 30);
        assert!(tracker.is_active());

        let done = tracker.tick(t0() + Duration::seconds(60));
        assert_eq!(done.remaining(), Remaining::ZERO);
        assert!(!done.is_active());
        assert!(!tracker.is_active());

        let cycle = &tracker.cycles()[0];
        assert_eq!(cycle.status(), CycleStatus::Finished);
        assert_eq!(cycle.finished_at, Some(t0() + Duration::seconds(60)));
        assert_eq!(cycle.interrupted_at, None);
    }

    #[test]
    fn late_tick_finishes_exactly_once() {
        let mut tracker = CycleTracker::new();
        tracker.create(request("Write report", 1), t0());

        let late = t0() + Duration::seconds(95);
        assert!(matches!(tracker.tick(late), TickOutcome::Finished { .. }));
        assert_eq!(tracker.tick(late + Duration::seconds(1)), TickOutcome::Idle);
        assert_eq!(tracker.cycles()[0].finished_at, Some(late));
    }

    #[test]
    fn tick_uses_wall_clock_not_tick_count() {
        let mut tracker = CycleTracker::new();
        tracker.create(request("Write report", 5), t0());

        // A single delayed callback still lands on the right remaining time.
        let outcome = tracker.tick(t0() + Duration::seconds(185));
        assert_eq!(outcome.remaining(), Remaining::from_secs(115));
        assert_eq!(tracker.elapsed_secs(), 185);
    }

    #[test]
    fn interrupt_marks_cycle_and_silences_ticks() {
        let mut tracker = CycleTracker::new();
        tracker.create(request("Write report", 5), t0());

        let at = t0() + Duration::seconds(10);
        let interrupted = tracker.interrupt(at).unwrap();
        assert_eq!(interrupted.interrupted_at, Some(at));
        assert_eq!(interrupted.finished_at, None);
        assert!(!tracker.is_active());

        assert_eq!(tracker.tick(t0() + Duration::seconds(600)), TickOutcome::Idle);
        assert_eq!(tracker.cycles()[0].finished_at, None);
    }

    #[test]
    fn interrupt_twice_equals_once() {
        let mut tracker = CycleTracker::new();
        tracker.create(request("Write report", 5), t0());

        tracker.interrupt(t0() + Duration::seconds(10));
        let after_first = tracker.cycles().to_vec();
        assert!(tracker.interrupt(t0() + Duration::seconds(20)).is_none());
        assert_eq!(tracker.cycles(), after_first.as_slice());
    }

    #[test]
    fn idle_operations_are_no_ops() {
        let mut tracker = CycleTracker::new();
        assert!(tracker.interrupt(t0()).is_none());
        assert_eq!(tracker.tick(t0()), TickOutcome::Idle);
        assert!(tracker.cycles().is_empty());
        assert_eq!(tracker.snapshot().remaining_secs, 0);
    }

    #[test]
    fn create_while_active_interrupts_previous() {
        let mut tracker = CycleTracker::new();
        let first = tracker.create(request("First", 5), t0());
        tracker.tick(t0() + Duration::seconds(42));
        let second = tracker.create(request("Second", 10), t0() + Duration::seconds(50));

        assert_eq!(tracker.cycles().len(), 2);
        assert_eq!(active_count(&tracker), 1);
        assert_eq!(tracker.active_cycle_id(), Some(second));
        assert_eq!(tracker.elapsed_secs(), 0);

        let previous = tracker.cycles().iter().find(|c| c.id == first).unwrap();
        assert_eq!(previous.interrupted_at, Some(t0() + Duration::seconds(50)));
    }

    #[test]
    fn single_active_invariant_holds_across_mixed_operations() {
        let mut tracker = CycleTracker::new();
        let mut now = t0();
        for step in 0..40u32 {
            now += Duration::seconds(17);
            match step % 4 {
                0 => {
                    tracker.create(request("Task", 1 + step % 3), now);
                }
                1 | 2 => {
                    tracker.tick(now);
                }
                _ => {
                    tracker.interrupt(now);
                }
            }
            assert!(active_count(&tracker) <= 1);
            assert_eq!(tracker.is_active(), active_count(&tracker) == 1);
            for cycle in tracker.cycles() {
                assert!(!(cycle.interrupted_at.is_some() && cycle.finished_at.is_some()));
            }
        }
        assert_eq!(tracker.cycles().len(), 10);
    }

    #[test]
    fn snapshot_reflects_last_tick() {
        let mut tracker = CycleTracker::new();
        tracker.create(request("Write report", 2), t0());
        tracker.tick(t0() + Duration::seconds(75));

        let snapshot = tracker.snapshot();
        assert!(snapshot.is_active());
        assert_eq!(snapshot.elapsed_secs, 75);
        assert_eq!(snapshot.remaining_secs, 45);
    }
}
