use crate::{
    cycles::{CycleSnapshot, NewCycleForm},
    history::{history_rows, HistoryRow},
    settings::TimerSettings,
    AppState,
};

pub async fn get_cycle_state(state: &AppState) -> Result<CycleSnapshot, String> {
    Ok(state.cycles.get_snapshot().await)
}

pub async fn start_cycle(
    state: &AppState,
    task: String,
    minutes_amount: u32,
) -> Result<CycleSnapshot, String> {
    let request = NewCycleForm::new(task, minutes_amount)
        .validate()
        .map_err(|e| e.to_string())?;
    Ok(state.cycles.start_cycle(request).await)
}

pub async fn interrupt_cycle(state: &AppState) -> Result<CycleSnapshot, String> {
    Ok(state.cycles.interrupt_cycle().await)
}

pub async fn list_history(state: &AppState) -> Result<Vec<HistoryRow>, String> {
    let cycles = state.cycles.cycles().await;
    Ok(history_rows(&cycles, state.clock.now()))
}

pub fn get_timer_settings(state: &AppState) -> Result<TimerSettings, String> {
    Ok(state.settings.timer())
}

/// Persists new settings. The tick period applies to controllers created
/// afterwards; the running one keeps its cadence.
pub fn set_timer_settings(state: &AppState, settings: TimerSettings) -> Result<(), String> {
    state
        .settings
        .update_timer(settings)
        .map_err(|e| e.to_string())
}
