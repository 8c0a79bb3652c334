use std::sync::Arc;

use garde::Validate;
use tracing::{debug, instrument, warn};

use common::domain::{
    DeviceProfile, DeviceProfileBasicInfo, DeviceProfileRepository, DeviceRepository, DomainError,
    DomainResult, ProvisionWatcherRepository, SystemEvent, SystemEventAction, SystemEventPublisher,
    UnitsOfMeasure, UpdateDeviceProfileBasicInfo, WritableSettings,
};

use crate::domain::pagination::check_count_range;

/// Service request for adding a device profile
#[derive(Debug, Clone)]
pub struct AddDeviceProfileRequest {
    pub correlation_id: String,
    pub profile: DeviceProfile,
}

/// Service request for a full profile replacement
#[derive(Debug, Clone)]
pub struct UpdateDeviceProfileRequest {
    pub correlation_id: String,
    pub profile: DeviceProfile,
}

/// Service request for patching a profile's basic info
#[derive(Debug, Clone)]
pub struct PatchDeviceProfileBasicInfoRequest {
    pub correlation_id: String,
    pub basic_info: UpdateDeviceProfileBasicInfo,
}

/// Service request for deleting a profile by name
#[derive(Debug, Clone)]
pub struct DeleteDeviceProfileByNameRequest {
    pub correlation_id: String,
    pub name: String,
}

/// Service request for fetching a profile by name
#[derive(Debug, Clone, Validate)]
pub struct DeviceProfileByNameRequest {
    #[garde(length(min = 1))]
    pub name: String,
}

/// Service request for listing profiles, optionally filtered by labels
#[derive(Debug, Clone, Default)]
pub struct ListDeviceProfilesRequest {
    pub offset: i64,
    pub limit: i64,
    pub labels: Vec<String>,
}

/// Service request for listing profiles by model
#[derive(Debug, Clone, Validate)]
pub struct ListDeviceProfilesByModelRequest {
    #[garde(skip)]
    pub offset: i64,
    #[garde(skip)]
    pub limit: i64,
    #[garde(length(min = 1))]
    pub model: String,
}

/// Service request for listing profiles by manufacturer
#[derive(Debug, Clone, Validate)]
pub struct ListDeviceProfilesByManufacturerRequest {
    #[garde(skip)]
    pub offset: i64,
    #[garde(skip)]
    pub limit: i64,
    #[garde(length(min = 1))]
    pub manufacturer: String,
}

/// Service request for listing profiles by manufacturer and model
#[derive(Debug, Clone, Validate)]
pub struct ListDeviceProfilesByManufacturerAndModelRequest {
    #[garde(skip)]
    pub offset: i64,
    #[garde(skip)]
    pub limit: i64,
    #[garde(length(min = 1))]
    pub manufacturer: String,
    #[garde(length(min = 1))]
    pub model: String,
}

/// Domain service for device profile management.
///
/// Runs validation and referential guards synchronously, persists through the
/// repository, then hands the change notification to a detached task. The
/// caller observes completion as soon as persistence (and, on update, the
/// mandatory re-fetch) succeeds.
pub struct DeviceProfileService {
    profile_repository: Arc<dyn DeviceProfileRepository>,
    device_repository: Arc<dyn DeviceRepository>,
    provision_watcher_repository: Arc<dyn ProvisionWatcherRepository>,
    units_of_measure: Arc<dyn UnitsOfMeasure>,
    settings: Arc<dyn WritableSettings>,
    event_publisher: Arc<dyn SystemEventPublisher>,
}

impl DeviceProfileService {
    pub fn new(
        profile_repository: Arc<dyn DeviceProfileRepository>,
        device_repository: Arc<dyn DeviceRepository>,
        provision_watcher_repository: Arc<dyn ProvisionWatcherRepository>,
        units_of_measure: Arc<dyn UnitsOfMeasure>,
        settings: Arc<dyn WritableSettings>,
        event_publisher: Arc<dyn SystemEventPublisher>,
    ) -> Self {
        Self {
            profile_repository,
            device_repository,
            provision_watcher_repository,
            units_of_measure,
            settings,
            event_publisher,
        }
    }

    /// Create a new device profile. The repository assigns the id, which is
    /// returned to the caller.
    #[instrument(skip(self, request), fields(name = %request.profile.name, correlation_id = %request.correlation_id))]
    pub async fn add_device_profile(
        &self,
        request: AddDeviceProfileRequest,
    ) -> DomainResult<String> {
        self.validate_units_of_measure(&request.profile)?;

        let added = self
            .profile_repository
            .add_device_profile(request.profile)
            .await?;

        debug!(id = %added.id, "device profile created");

        let id = added.id.clone();
        self.publish_profile_event(SystemEventAction::Add, &request.correlation_id, added);

        Ok(id)
    }

    /// Replace an existing device profile in full.
    ///
    /// The emitted event must describe exactly what is stored, so the profile
    /// is re-read after the replace; a miss on that re-read surfaces as an
    /// error even though the write already committed.
    #[instrument(skip(self, request), fields(name = %request.profile.name, correlation_id = %request.correlation_id))]
    pub async fn update_device_profile(
        &self,
        request: UpdateDeviceProfileRequest,
    ) -> DomainResult<()> {
        self.validate_units_of_measure(&request.profile)?;

        if self.settings.max_resources() > 0 {
            self.check_resource_capacity(&request.profile).await?;
        }

        let name = request.profile.name.clone();
        self.profile_repository
            .update_device_profile(request.profile)
            .await?;

        debug!("device profile updated");

        let stored = self
            .profile_repository
            .device_profile_by_name(&name)
            .await?
            .ok_or_else(|| DomainError::DeviceProfileNotFound(name.clone()))?;

        self.publish_profile_event(SystemEventAction::Update, &request.correlation_id, stored);

        Ok(())
    }

    /// Patch a profile's basic fields. Resources and commands are untouched,
    /// so no units-of-measure validation runs on this path.
    #[instrument(skip(self, request), fields(correlation_id = %request.correlation_id))]
    pub async fn patch_device_profile_basic_info(
        &self,
        request: PatchDeviceProfileBasicInfoRequest,
    ) -> DomainResult<()> {
        let mut profile = self
            .device_profile_by_basic_info(&request.basic_info)
            .await?;

        request.basic_info.apply_to(&mut profile);

        self.profile_repository
            .update_device_profile(profile.clone())
            .await?;

        debug!(name = %profile.name, "device profile basic info patched");

        self.publish_profile_event(SystemEventAction::Update, &request.correlation_id, profile);

        Ok(())
    }

    /// Delete a profile by name once every gate passes: strict-delete mode,
    /// non-empty name, existence, and no referencing device or provision
    /// watcher.
    #[instrument(skip(self, request), fields(name = %request.name, correlation_id = %request.correlation_id))]
    pub async fn delete_device_profile_by_name(
        &self,
        request: DeleteDeviceProfileByNameRequest,
    ) -> DomainResult<()> {
        if self.settings.strict_device_profile_deletes() {
            return Err(DomainError::ProfileDeletionLocked);
        }
        if request.name.is_empty() {
            return Err(DomainError::ValidationError("name is empty".to_string()));
        }

        let profile = self
            .profile_repository
            .device_profile_by_name(&request.name)
            .await?
            .ok_or_else(|| DomainError::DeviceProfileNotFound(request.name.clone()))?;

        self.ensure_profile_not_referenced(&request.name).await?;

        self.profile_repository
            .delete_device_profile_by_name(&request.name)
            .await?;

        debug!("device profile deleted");

        self.publish_profile_event(SystemEventAction::Delete, &request.correlation_id, profile);

        Ok(())
    }

    /// Fetch a single profile by name.
    pub async fn device_profile_by_name(
        &self,
        request: DeviceProfileByNameRequest,
    ) -> DomainResult<DeviceProfile> {
        common::garde::validate_struct(&request)?;

        self.profile_repository
            .device_profile_by_name(&request.name)
            .await?
            .ok_or_else(|| DomainError::DeviceProfileNotFound(request.name.clone()))
    }

    /// List profiles carrying all of the requested labels, with the total
    /// matching count.
    pub async fn all_device_profiles(
        &self,
        request: ListDeviceProfilesRequest,
    ) -> DomainResult<(Vec<DeviceProfile>, u64)> {
        let total_count = self
            .profile_repository
            .device_profile_count_by_labels(&request.labels)
            .await?;
        if !check_count_range(total_count, request.offset, request.limit)? {
            return Ok((Vec::new(), total_count));
        }

        let profiles = self
            .profile_repository
            .all_device_profiles(request.offset, request.limit, &request.labels)
            .await?;
        Ok((profiles, total_count))
    }

    /// List profiles with the given model, with the total matching count.
    pub async fn device_profiles_by_model(
        &self,
        request: ListDeviceProfilesByModelRequest,
    ) -> DomainResult<(Vec<DeviceProfile>, u64)> {
        common::garde::validate_struct(&request)?;

        let total_count = self
            .profile_repository
            .device_profile_count_by_model(&request.model)
            .await?;
        if !check_count_range(total_count, request.offset, request.limit)? {
            return Ok((Vec::new(), total_count));
        }

        let profiles = self
            .profile_repository
            .device_profiles_by_model(request.offset, request.limit, &request.model)
            .await?;
        Ok((profiles, total_count))
    }

    /// List profiles with the given manufacturer, with the total matching count.
    pub async fn device_profiles_by_manufacturer(
        &self,
        request: ListDeviceProfilesByManufacturerRequest,
    ) -> DomainResult<(Vec<DeviceProfile>, u64)> {
        common::garde::validate_struct(&request)?;

        let total_count = self
            .profile_repository
            .device_profile_count_by_manufacturer(&request.manufacturer)
            .await?;
        if !check_count_range(total_count, request.offset, request.limit)? {
            return Ok((Vec::new(), total_count));
        }

        let profiles = self
            .profile_repository
            .device_profiles_by_manufacturer(request.offset, request.limit, &request.manufacturer)
            .await?;
        Ok((profiles, total_count))
    }

    /// List profiles with the given manufacturer and model, with the total
    /// matching count.
    pub async fn device_profiles_by_manufacturer_and_model(
        &self,
        request: ListDeviceProfilesByManufacturerAndModelRequest,
    ) -> DomainResult<(Vec<DeviceProfile>, u64)> {
        common::garde::validate_struct(&request)?;

        let total_count = self
            .profile_repository
            .device_profile_count_by_manufacturer_and_model(&request.manufacturer, &request.model)
            .await?;
        if !check_count_range(total_count, request.offset, request.limit)? {
            return Ok((Vec::new(), total_count));
        }

        let profiles = self
            .profile_repository
            .device_profiles_by_manufacturer_and_model(
                request.offset,
                request.limit,
                &request.manufacturer,
                &request.model,
            )
            .await?;
        Ok((profiles, total_count))
    }

    /// List basic-info projections of profiles carrying all of the requested
    /// labels, with the total matching count.
    pub async fn all_device_profile_basic_infos(
        &self,
        request: ListDeviceProfilesRequest,
    ) -> DomainResult<(Vec<DeviceProfileBasicInfo>, u64)> {
        let total_count = self
            .profile_repository
            .device_profile_count_by_labels(&request.labels)
            .await?;
        if !check_count_range(total_count, request.offset, request.limit)? {
            return Ok((Vec::new(), total_count));
        }

        let profiles = self
            .profile_repository
            .all_device_profiles(request.offset, request.limit, &request.labels)
            .await?;
        let basic_infos = profiles.iter().map(DeviceProfileBasicInfo::from).collect();
        Ok((basic_infos, total_count))
    }

    fn validate_units_of_measure(&self, profile: &DeviceProfile) -> DomainResult<()> {
        if !self.settings.uom_validation_enabled() {
            return Ok(());
        }
        for resource in &profile.device_resources {
            if !self.units_of_measure.validate(&resource.properties.units) {
                return Err(DomainError::InvalidUnitsOfMeasure(
                    resource.name.clone(),
                    resource.properties.units.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Compare the resource count a replacement implies against the
    /// configured ceiling. Reads the stored profile at call time; there is no
    /// snapshot isolation against concurrent updates.
    async fn check_resource_capacity(&self, proposed: &DeviceProfile) -> DomainResult<()> {
        let max_resources = self.settings.max_resources();
        let stored = self
            .profile_repository
            .device_profile_by_name(&proposed.name)
            .await?
            .ok_or_else(|| DomainError::DeviceProfileNotFound(proposed.name.clone()))?;

        let implied = proposed.device_resources.len();
        debug!(
            current = stored.device_resources.len(),
            proposed = implied,
            max = max_resources,
            "checking device profile resource capacity"
        );
        if implied as u32 > max_resources {
            return Err(DomainError::ResourceCapacityExceeded(
                proposed.name.clone(),
                implied,
                max_resources,
            ));
        }
        Ok(())
    }

    /// Resolve the patch target by id when present, else by name, and refuse
    /// a payload name that disagrees with the stored record.
    async fn device_profile_by_basic_info(
        &self,
        basic_info: &UpdateDeviceProfileBasicInfo,
    ) -> DomainResult<DeviceProfile> {
        let profile = match &basic_info.id {
            Some(id) if !id.is_empty() => self
                .profile_repository
                .device_profile_by_id(id)
                .await?
                .ok_or_else(|| DomainError::DeviceProfileNotFound(id.clone()))?,
            _ => match &basic_info.name {
                Some(name) if !name.is_empty() => self
                    .profile_repository
                    .device_profile_by_name(name)
                    .await?
                    .ok_or_else(|| DomainError::DeviceProfileNotFound(name.clone()))?,
                _ => {
                    return Err(DomainError::ValidationError(
                        "either id or name is required to identify the device profile".to_string(),
                    ))
                }
            },
        };

        if let Some(name) = &basic_info.name {
            if name != &profile.name {
                return Err(DomainError::ValidationError(format!(
                    "device profile name '{}' does not match the existing '{}'",
                    name, profile.name
                )));
            }
        }

        Ok(profile)
    }

    /// Bounded existence probes: one row at offset 0 proves a reference.
    async fn ensure_profile_not_referenced(&self, name: &str) -> DomainResult<()> {
        let devices = self
            .device_repository
            .devices_by_profile_name(0, 1, name)
            .await?;
        if let Some(device) = devices.first() {
            return Err(DomainError::DeviceProfileInUse(format!(
                "'{name}' is referenced by device '{}'",
                device.name
            )));
        }

        let watchers = self
            .provision_watcher_repository
            .provision_watchers_by_profile_name(0, 1, name)
            .await?;
        if let Some(watcher) = watchers.first() {
            return Err(DomainError::DeviceProfileInUse(format!(
                "'{name}' is referenced by provision watcher '{}'",
                watcher.name
            )));
        }

        Ok(())
    }

    /// Hand the event to the publisher on a detached task. Delivery is
    /// best-effort: a publish failure is logged and never reaches the caller.
    fn publish_profile_event(
        &self,
        action: SystemEventAction,
        correlation_id: &str,
        profile: DeviceProfile,
    ) {
        let publisher = Arc::clone(&self.event_publisher);
        let event = SystemEvent::new(action, correlation_id, profile);
        tokio::spawn(async move {
            if let Err(err) = publisher.publish(event).await {
                warn!(error = %err, action = %action, "failed to publish device profile system event");
            }
        });
    }
}
