pub mod cycle;

pub use cycle::{Cycle, CycleId, CycleStatus};
