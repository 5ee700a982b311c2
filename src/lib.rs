pub mod cycles;
pub mod history;
pub mod models;
pub mod settings;
pub mod terminal;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use cycles::{Clock, CycleController, SystemClock};
use settings::SettingsStore;

pub struct AppState {
    pub(crate) cycles: CycleController,
    pub(crate) settings: SettingsStore,
    pub(crate) clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(settings: SettingsStore) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// The controller and the history view share `clock`.
    pub fn with_clock(settings: SettingsStore, clock: Arc<dyn Clock>) -> Self {
        let cycles = CycleController::with_clock(&settings.timer(), clock.clone());
        Self {
            cycles,
            settings,
            clock,
        }
    }

    pub fn cycles(&self) -> &CycleController {
        &self.cycles
    }
}

pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    utils::logging::init(utils::logging::debug_mode());

    log::info!("Pomodoro starting up...");

    let result = (|| -> anyhow::Result<()> {
        let settings_path = settings::default_settings_path();
        let settings_store = SettingsStore::new(settings_path)?;
        log::info!("Using settings at {}", settings_store.path().display());

        // One logical thread: ticks and user commands never interleave mid-transition.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start the async runtime")?;

        runtime.block_on(async move {
            let state = AppState::new(settings_store);
            let result = terminal::run_shell(&state).await;
            state.cycles.shutdown().await;
            result
        })
    })();

    if let Err(err) = result {
        log::error!("Pomodoro failed: {err:#}");
        std::process::exit(1);
    }
}
