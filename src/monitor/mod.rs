//! Periodic status monitoring.
//!
//! The monitor loop runs one cycle at a time: collect status data from the
//! configured registry, write (or echo) the record, then wait until the next
//! interval boundary. Wake times anchor to the loop's start instant, so
//! cycles stay phase-aligned no matter how long collection and writing take.
//! Failures inside a cycle are logged and the loop continues; only an
//! explicit cancellation or a startup error ends it.

pub mod scheduler;
pub mod status;

pub use scheduler::{next_cycle_start, start_monitoring, write_status_data, ExitSignal};
pub use status::{get_status_data, StatusDataItem, StatusFn, StatusRegistry};
