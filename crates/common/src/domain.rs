pub mod device;
pub mod device_profile;
pub mod in_memory;
pub mod provision_watcher;
pub mod result;
pub mod settings;
pub mod system_event;
pub mod units;

pub use device::*;
pub use device_profile::*;
pub use in_memory::*;
pub use provision_watcher::*;
pub use result::*;
pub use settings::*;
pub use system_event::*;
pub use units::*;
