use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::result::DomainResult;

/// Typed value properties of a single device resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceProperties {
    pub value_type: String,
    pub read_write: String,
    pub units: String,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub default_value: Option<String>,
}

/// A named value a device of this class can report or accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceResource {
    pub name: String,
    pub description: String,
    pub is_hidden: bool,
    pub properties: ResourceProperties,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// One step of a device command, referencing a device resource by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceOperation {
    pub device_resource: String,
    pub default_value: String,
    pub mappings: HashMap<String, String>,
}

/// A named command composed of ordered resource operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceCommand {
    pub name: String,
    pub is_hidden: bool,
    pub read_write: String,
    pub resource_operations: Vec<ResourceOperation>,
}

/// Template describing a class of connected device: its resources, commands
/// and measurement units.
///
/// `id` is assigned by the repository at insert time and never changes;
/// `name` is the unique human-facing key and is used interchangeably with the
/// id in lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceProfile {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub description: String,
    pub labels: Vec<String>,
    pub device_resources: Vec<DeviceResource>,
    pub device_commands: Vec<DeviceCommand>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Flat projection of a profile's identifying fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfileBasicInfo {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub description: String,
    pub labels: Vec<String>,
}

impl From<&DeviceProfile> for DeviceProfileBasicInfo {
    fn from(profile: &DeviceProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            manufacturer: profile.manufacturer.clone(),
            model: profile.model.clone(),
            description: profile.description.clone(),
            labels: profile.labels.clone(),
        }
    }
}

/// Partial update of a profile's basic fields.
///
/// `id` and `name` select the target record; the remaining fields replace the
/// stored values only when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UpdateDeviceProfileBasicInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
}

impl UpdateDeviceProfileBasicInfo {
    /// Replace the basic-info fields present in this patch on `profile`.
    ///
    /// The selector fields are not applied: `id` is immutable and `name` must
    /// already equal the stored name when present.
    pub fn apply_to(&self, profile: &mut DeviceProfile) {
        if let Some(manufacturer) = &self.manufacturer {
            profile.manufacturer = manufacturer.clone();
        }
        if let Some(model) = &self.model {
            profile.model = model.clone();
        }
        if let Some(description) = &self.description {
            profile.description = description.clone();
        }
        if let Some(labels) = &self.labels {
            profile.labels = labels.clone();
        }
    }
}

/// Repository trait for device profile storage operations
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceProfileRepository: Send + Sync {
    /// Persist a new profile, assigning its id. Returns the stored record.
    async fn add_device_profile(&self, profile: DeviceProfile) -> DomainResult<DeviceProfile>;

    /// Replace an existing profile in full.
    async fn update_device_profile(&self, profile: DeviceProfile) -> DomainResult<()>;

    /// Fetch a profile by id.
    async fn device_profile_by_id(&self, id: &str) -> DomainResult<Option<DeviceProfile>>;

    /// Fetch a profile by name.
    async fn device_profile_by_name(&self, name: &str) -> DomainResult<Option<DeviceProfile>>;

    /// Delete a profile by name.
    async fn delete_device_profile_by_name(&self, name: &str) -> DomainResult<()>;

    /// Count profiles carrying all of the given labels (all profiles when empty).
    async fn device_profile_count_by_labels(&self, labels: &[String]) -> DomainResult<u64>;

    /// Count profiles with the given model.
    async fn device_profile_count_by_model(&self, model: &str) -> DomainResult<u64>;

    /// Count profiles with the given manufacturer.
    async fn device_profile_count_by_manufacturer(&self, manufacturer: &str) -> DomainResult<u64>;

    /// Count profiles with the given manufacturer and model.
    async fn device_profile_count_by_manufacturer_and_model(
        &self,
        manufacturer: &str,
        model: &str,
    ) -> DomainResult<u64>;

    /// List profiles carrying all of the given labels, name-ordered.
    async fn all_device_profiles(
        &self,
        offset: i64,
        limit: i64,
        labels: &[String],
    ) -> DomainResult<Vec<DeviceProfile>>;

    /// List profiles with the given model, name-ordered.
    async fn device_profiles_by_model(
        &self,
        offset: i64,
        limit: i64,
        model: &str,
    ) -> DomainResult<Vec<DeviceProfile>>;

    /// List profiles with the given manufacturer, name-ordered.
    async fn device_profiles_by_manufacturer(
        &self,
        offset: i64,
        limit: i64,
        manufacturer: &str,
    ) -> DomainResult<Vec<DeviceProfile>>;

    /// List profiles with the given manufacturer and model, name-ordered.
    async fn device_profiles_by_manufacturer_and_model(
        &self,
        offset: i64,
        limit: i64,
        manufacturer: &str,
        model: &str,
    ) -> DomainResult<Vec<DeviceProfile>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_basic_info() -> DeviceProfile {
        DeviceProfile {
            id: "profile-001".to_string(),
            name: "Temp-Sensor-X".to_string(),
            manufacturer: "Acme".to_string(),
            model: "TS-100".to_string(),
            description: "thermal sensor".to_string(),
            labels: vec!["sensor".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn basic_info_projects_identifying_fields() {
        let profile = profile_with_basic_info();
        let info = DeviceProfileBasicInfo::from(&profile);

        assert_eq!(info.id, "profile-001");
        assert_eq!(info.name, "Temp-Sensor-X");
        assert_eq!(info.manufacturer, "Acme");
        assert_eq!(info.model, "TS-100");
        assert_eq!(info.labels, vec!["sensor".to_string()]);
    }

    #[test]
    fn apply_to_replaces_only_present_fields() {
        let mut profile = profile_with_basic_info();

        let patch = UpdateDeviceProfileBasicInfo {
            manufacturer: Some("NewCo".to_string()),
            description: Some("revised".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut profile);

        assert_eq!(profile.manufacturer, "NewCo");
        assert_eq!(profile.description, "revised");
        // Untouched fields keep their stored values.
        assert_eq!(profile.model, "TS-100");
        assert_eq!(profile.labels, vec!["sensor".to_string()]);
    }

    #[test]
    fn apply_to_never_touches_identity() {
        let mut profile = profile_with_basic_info();

        let patch = UpdateDeviceProfileBasicInfo {
            id: Some("other-id".to_string()),
            name: Some("Temp-Sensor-X".to_string()),
            model: Some("TS-200".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut profile);

        assert_eq!(profile.id, "profile-001");
        assert_eq!(profile.name, "Temp-Sensor-X");
        assert_eq!(profile.model, "TS-200");
    }
}
