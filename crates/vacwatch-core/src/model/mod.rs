//! Locally owned state: the poller's settings and the last poll result.
//!
//! Everything the API returns is a DTO from `vacwatch_api::types`; this
//! module only models what vacwatch itself persists.

mod de;
pub mod settings;
pub mod state;

pub use settings::{MIN_INTERVAL_SECS, PollSettings, PushOptions};
pub use de::format_timestamp;
pub use state::{PollState, PollStatus, Record};
