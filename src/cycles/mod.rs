pub mod clock;
pub mod commands;
pub mod controller;
pub mod display;
pub mod schedule;
pub mod state;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{CycleController, CycleEvent};
pub use display::{window_title, Controls, Countdown};
pub use state::{CycleSnapshot, CycleTracker, Remaining, TickOutcome};
pub use validation::{CycleRequest, NewCycleForm, ValidationError};
