pub mod angle;
pub mod config;
pub mod control_loop;
pub mod error;
pub mod history;
pub mod logger;
pub mod metrics;
pub mod pid;
pub mod shared;

pub use angle::{compute_error, normalize_heading};
pub use config::{load_config, DriverConfig, DriverMode, LoopConfig, SimulationConfig};
pub use control_loop::{ControlLoop, LoopStatus, TickOutput};
pub use error::ControlError;
pub use history::{History, Sample, HISTORY_CAPACITY};
pub use metrics::{SimulationReport, TickRecorder, TickTiming};
pub use pid::{Gains, PidComponents};
pub use shared::SharedControlLoop;
