use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::result::DomainResult;

/// A provision watcher waiting to auto-register devices against a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProvisionWatcher {
    pub id: String,
    pub name: String,
    pub profile_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository trait for provision watcher storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProvisionWatcherRepository: Send + Sync {
    /// List provision watchers referencing the given profile name, name-ordered.
    async fn provision_watchers_by_profile_name(
        &self,
        offset: i64,
        limit: i64,
        profile_name: &str,
    ) -> DomainResult<Vec<ProvisionWatcher>>;
}
