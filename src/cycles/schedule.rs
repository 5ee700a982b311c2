use std::sync::Arc;

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::models::CycleId;

use super::{
    clock::Clock,
    controller::{publish_finished, CycleEvent},
    state::{CycleTracker, TickOutcome},
};

// Set to true to log every schedule arm/cancel in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

pub(crate) struct TickContext {
    pub state: Arc<Mutex<CycleTracker>>,
    pub events: broadcast::Sender<CycleEvent>,
    pub clock: Arc<dyn Clock>,
    pub cycle_id: CycleId,
    pub tick_interval: Duration,
    pub log_every_ticks: u32,
}

/// Recurring tick task bound to one active cycle. Cancelled explicitly on
/// every transition away from that cycle, and on drop.
pub struct TickSchedule {
    cycle_id: CycleId,
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl TickSchedule {
    pub(crate) fn arm(ctx: TickContext) -> Self {
        let cycle_id = ctx.cycle_id;
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(ctx, cancel_token.clone()));

        log_debug!("tick schedule armed for cycle {}", cycle_id);

        Self {
            cycle_id,
            handle: Some(handle),
            cancel_token,
        }
    }

    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }

    /// Stops the loop and waits for it to exit.
    pub async fn cancel(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                log_warn!("tick loop for cycle {} failed to join: {err}", self.cycle_id);
            }
        }
        log_debug!("tick schedule cancelled for cycle {}", self.cycle_id);
    }
}

impl Drop for TickSchedule {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn tick_loop(ctx: TickContext, cancel_token: CancellationToken) {
    let mut ticker = time::interval(ctx.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                if !tick_once(&ctx, &mut ticks).await {
                    break;
                }
            }
        }
    }
}

/// Returns `false` once the loop has nothing left to tick.
async fn tick_once(ctx: &TickContext, ticks: &mut u32) -> bool {
    let (outcome, snapshot) = {
        let mut guard = ctx.state.lock().await;
        if guard.active_cycle_id() != Some(ctx.cycle_id) {
            return false;
        }
        let outcome = guard.tick(ctx.clock.now());
        (outcome, guard.snapshot())
    };

    match outcome {
        TickOutcome::Idle => false,
        TickOutcome::Counting {
            cycle_id,
            remaining,
        } => {
            *ticks = ticks.wrapping_add(1);
            if *ticks % ctx.log_every_ticks.max(1) == 0 {
                log_info!(
                    "cycle {} running, {}s remaining",
                    cycle_id,
                    remaining.total_secs
                );
            }

            let _ = ctx.events.send(CycleEvent::Tick {
                cycle_id,
                remaining_secs: remaining.total_secs,
            });
            true
        }
        TickOutcome::Finished { cycle } => {
            publish_finished(&ctx.events, cycle, snapshot);
            false
        }
    }
}
