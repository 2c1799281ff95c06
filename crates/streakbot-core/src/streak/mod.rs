mod policy;
mod state;
mod tracker;

pub use policy::{ReentryPolicy, ResetPolicy, StartPolicy};
pub use state::{Advancement, StreakState};
pub use tracker::StreakTracker;
