use std::sync::Arc;

use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    time::Duration,
};

use crate::{
    models::{Cycle, CycleId},
    settings::TimerSettings,
    utils::logging,
};

use super::{
    clock::Clock,
    schedule::{TickContext, TickSchedule},
    state::{CycleSnapshot, CycleTracker, TickOutcome},
    validation::CycleRequest,
};

// Set to true to log cycle transitions in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CycleEvent {
    StateChanged { snapshot: CycleSnapshot },
    Tick { cycle_id: CycleId, remaining_secs: u64 },
    CycleFinished { cycle: Cycle },
    CycleInterrupted { cycle: Cycle },
}

/// Owns the tracker and the tick schedule of the active cycle.
#[derive(Clone)]
pub struct CycleController {
    state: Arc<Mutex<CycleTracker>>,
    schedule: Arc<Mutex<Option<TickSchedule>>>,
    events: broadcast::Sender<CycleEvent>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    log_every_ticks: u32,
}

impl CycleController {
    pub fn with_clock(settings: &TimerSettings, clock: Arc<dyn Clock>) -> Self {
        let debug_mode = logging::debug_mode();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(CycleTracker::new())),
            schedule: Arc::new(Mutex::new(None)),
            events,
            clock,
            tick_interval: Duration::from_millis(settings.tick_interval_ms.max(1)),
            log_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CycleEvent> {
        self.events.subscribe()
    }

    /// Current state, re-derived from the clock rather than the last tick.
    pub async fn get_snapshot(&self) -> CycleSnapshot {
        self.read_synced(CycleTracker::snapshot).await
    }

    /// All cycles created so far, oldest first.
    pub async fn cycles(&self) -> Vec<Cycle> {
        self.read_synced(|state| state.cycles().to_vec()).await
    }

    pub async fn start_cycle(&self, request: CycleRequest) -> CycleSnapshot {
        let mut schedule_guard = self.schedule.lock().await;
        if let Some(schedule) = schedule_guard.take() {
            schedule.cancel().await;
        }

        let now = self.clock.now();
        let (cycle_id, replaced, snapshot) = {
            let mut state = self.state.lock().await;
            // Interrupt here to report the replaced cycle; `create` then finds
            // nothing active.
            let replaced = state.interrupt(now);
            let cycle_id = state.create(request, now);
            (cycle_id, replaced, state.snapshot())
        };

        if let Some(cycle) = replaced {
            log_info!("cycle {} interrupted by a new cycle", cycle.id);
            let _ = self.events.send(CycleEvent::CycleInterrupted { cycle });
        }

        if let Some(active) = snapshot.active_cycle.as_ref() {
            log_info!(
                "cycle {} started: {} ({} min)",
                cycle_id,
                active.task,
                active.duration_minutes
            );
        }

        *schedule_guard = Some(TickSchedule::arm(TickContext {
            state: self.state.clone(),
            events: self.events.clone(),
            clock: self.clock.clone(),
            cycle_id,
            tick_interval: self.tick_interval,
            log_every_ticks: self.log_every_ticks,
        }));
        drop(schedule_guard);

        let _ = self.events.send(CycleEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    /// Stops the active cycle. Safe to call when nothing is running.
    pub async fn interrupt_cycle(&self) -> CycleSnapshot {
        self.cancel_schedule().await;

        let now = self.clock.now();
        let (interrupted, snapshot) = {
            let mut state = self.state.lock().await;
            let interrupted = state.interrupt(now);
            (interrupted, state.snapshot())
        };

        match interrupted {
            Some(cycle) => {
                log_info!("cycle {} interrupted", cycle.id);
                let _ = self.events.send(CycleEvent::CycleInterrupted { cycle });
                let _ = self.events.send(CycleEvent::StateChanged {
                    snapshot: snapshot.clone(),
                });
            }
            None => log_debug!("interrupt requested with no active cycle"),
        }

        snapshot
    }

    /// Teardown: stops the tick schedule without touching the active cycle.
    pub async fn shutdown(&self) {
        self.cancel_schedule().await;
    }

    pub async fn has_armed_schedule(&self) -> bool {
        self.schedule
            .lock()
            .await
            .as_ref()
            .map(|schedule| !schedule.is_finished())
            .unwrap_or(false)
    }

    /// Ticks the tracker at `clock.now()` before reading, so a cycle whose
    /// time ran out between scheduled ticks is finished here.
    async fn read_synced<T>(&self, read: impl FnOnce(&CycleTracker) -> T) -> T {
        let now = self.clock.now();
        let (value, finished) = {
            let mut state = self.state.lock().await;
            let finished = match state.tick(now) {
                TickOutcome::Finished { cycle } => Some((cycle, state.snapshot())),
                TickOutcome::Idle | TickOutcome::Counting { .. } => None,
            };
            (read(&state), finished)
        };

        if let Some((cycle, snapshot)) = finished {
            publish_finished(&self.events, cycle, snapshot);
        }
        value
    }

    async fn cancel_schedule(&self) {
        if let Some(schedule) = self.schedule.lock().await.take() {
            log_debug!("stopping ticks for cycle {}", schedule.cycle_id());
            schedule.cancel().await;
        }
    }
}

pub(crate) fn publish_finished(
    events: &broadcast::Sender<CycleEvent>,
    cycle: Cycle,
    snapshot: CycleSnapshot,
) {
    log_info!("cycle {} finished ({})", cycle.id, cycle.task);
    let _ = events.send(CycleEvent::CycleFinished { cycle });
    let _ = events.send(CycleEvent::StateChanged { snapshot });
}
