pub mod client;
pub mod poller;
pub mod supervisor;
pub mod types;

pub use client::BackendClient;
pub use poller::{CancelFlag, PollTask};
pub use supervisor::PollSupervisor;
pub use types::VehicleSampleWire;
