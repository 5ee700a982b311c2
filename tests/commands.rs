use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pomodoro_lib::{
    cycles::{commands, ManualClock},
    models::CycleStatus,
    settings::{SettingsStore, TimerSettings},
    AppState,
};

fn app_state(dir: &tempfile::TempDir) -> (AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    ));
    let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();
    (AppState::with_clock(settings, clock.clone()), clock)
}

#[tokio::test(start_paused = true)]
async fn start_cycle_rejects_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _clock) = app_state(&dir);

    let err = commands::start_cycle(&state, "  ".into(), 25).await.unwrap_err();
    assert_eq!(err, "Describe your task");

    let err = commands::start_cycle(&state, "Read".into(), 0).await.unwrap_err();
    assert!(err.contains("between 1 and 60"));

    assert!(commands::list_history(&state).await.unwrap().is_empty());
    assert!(!commands::get_cycle_state(&state).await.unwrap().is_active());
}

#[tokio::test(start_paused = true)]
async fn history_tracks_cycle_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let (state, clock) = app_state(&dir);

    commands::start_cycle(&state, "Read".into(), 5).await.unwrap();
    clock.advance(chrono::Duration::minutes(2));
    commands::interrupt_cycle(&state).await.unwrap();
    commands::interrupt_cycle(&state).await.unwrap();
    commands::start_cycle(&state, "Write".into(), 25).await.unwrap();
    clock.advance(chrono::Duration::minutes(3));

    let rows = commands::list_history(&state).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].task, "Write");
    assert_eq!(rows[0].status, CycleStatus::Active);
    assert_eq!(rows[0].started, "3 minutes ago");
    assert_eq!(rows[1].task, "Read");
    assert_eq!(rows[1].status_label, "Interrupted");
    assert_eq!(rows[1].duration, "5 minutes");
    assert_eq!(rows[1].started, "5 minutes ago");

    state.cycles().shutdown().await;
}

#[tokio::test]
async fn timer_settings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _clock) = app_state(&dir);

    assert_eq!(
        commands::get_timer_settings(&state).unwrap(),
        TimerSettings::default()
    );

    let updated = TimerSettings {
        default_minutes: 45,
        ..TimerSettings::default()
    };
    commands::set_timer_settings(&state, updated.clone()).unwrap();
    assert_eq!(commands::get_timer_settings(&state).unwrap(), updated);

    let reloaded = SettingsStore::new(dir.path().join("settings.json")).unwrap();
    assert_eq!(reloaded.timer(), updated);

    assert!(commands::set_timer_settings(
        &state,
        TimerSettings {
            default_minutes: 0,
            ..TimerSettings::default()
        }
    )
    .is_err());
}
