mod device_profile_service;
mod pagination;

pub use device_profile_service::*;
pub use pagination::*;
