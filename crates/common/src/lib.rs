pub mod domain;
pub mod garde;
pub mod telemetry;

pub use domain::*;
pub use telemetry::{init_telemetry, TelemetryConfig};
