pub mod board;
pub mod key;
pub mod merge;
pub mod status;
pub mod types;

pub use board::ArrivalBoard;
pub use key::route_key;
pub use merge::{merge, RetentionPolicy, DEFAULT_RETENTION_WINDOW};
pub use status::StatusColor;
pub use types::{ArrivalDisplay, ArrivalRecord, ReconciledArrival, ScheduleContext};
