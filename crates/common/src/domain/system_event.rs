use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::device_profile::DeviceProfile;
use crate::domain::result::DomainResult;

/// Entity tag carried by device profile change notifications.
pub const DEVICE_PROFILE_SYSTEM_EVENT_TYPE: &str = "deviceProfile";

/// Source identity stamped on every event this service emits.
pub const METADATA_SERVICE_KEY: &str = "cairn-metadata";

/// The kind of mutation a system event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemEventAction {
    Add,
    Update,
    Delete,
}

impl fmt::Display for SystemEventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            SystemEventAction::Add => "add",
            SystemEventAction::Update => "update",
            SystemEventAction::Delete => "delete",
        };
        f.write_str(action)
    }
}

/// Asynchronous change notification describing a committed profile mutation.
///
/// The correlation id is the originating request's tracing identifier; it is
/// carried for diagnostic correlation only and never used for cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub event_type: String,
    pub action: SystemEventAction,
    pub source: String,
    pub correlation_id: String,
    pub timestamp: DateTime<Utc>,
    pub details: DeviceProfile,
}

impl SystemEvent {
    /// Build a device profile event sourced from this service.
    pub fn new(
        action: SystemEventAction,
        correlation_id: impl Into<String>,
        details: DeviceProfile,
    ) -> Self {
        Self {
            event_type: DEVICE_PROFILE_SYSTEM_EVENT_TYPE.to_string(),
            action,
            source: METADATA_SERVICE_KEY.to_string(),
            correlation_id: correlation_id.into(),
            timestamp: Utc::now(),
            details,
        }
    }
}

/// Publisher trait for system event delivery.
/// The transport implementation (e.g. cairn-nats) owns retry and durability.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SystemEventPublisher: Send + Sync {
    /// Deliver one event. The caller treats delivery as best-effort.
    async fn publish(&self, event: SystemEvent) -> DomainResult<()>;
}
