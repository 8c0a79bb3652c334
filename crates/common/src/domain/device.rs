use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::result::DomainResult;

/// A registered device instance. Only the fields the profile core consults
/// are modeled; the device lifecycle itself is owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub profile_name: String,
    pub service_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository trait for device storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// List devices referencing the given profile name, name-ordered.
    async fn devices_by_profile_name(
        &self,
        offset: i64,
        limit: i64,
        profile_name: &str,
    ) -> DomainResult<Vec<Device>>;
}
