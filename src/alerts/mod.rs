//! Alert decision logic: records, persisted per-asset state and the
//! hysteresis machine.

pub mod machine;
pub mod record;
pub mod state;

pub use machine::AlertMachine;
pub use record::{AlertRecord, AlertType, Severity};
pub use state::{AssetMonitoringState, Direction, MonitoringState, StateRepository};
