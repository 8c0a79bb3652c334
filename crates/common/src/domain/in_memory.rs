use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::device::{Device, DeviceRepository};
use crate::domain::device_profile::{DeviceProfile, DeviceProfileRepository};
use crate::domain::provision_watcher::{ProvisionWatcher, ProvisionWatcherRepository};
use crate::domain::result::{DomainError, DomainResult};

/// In-memory metadata store implementing the repository traits.
///
/// Stands in for the external storage backend in tests and the all-in-one
/// binary. Profiles are keyed by name; all listings are name-ordered.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    profiles: RwLock<HashMap<String, DeviceProfile>>,
    devices: RwLock<Vec<Device>>,
    provision_watchers: RwLock<Vec<ProvisionWatcher>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a device referencing a profile.
    pub async fn insert_device(&self, device: Device) {
        self.devices.write().await.push(device);
    }

    /// Seed a provision watcher referencing a profile.
    pub async fn insert_provision_watcher(&self, watcher: ProvisionWatcher) {
        self.provision_watchers.write().await.push(watcher);
    }

    /// Drop all seeded devices.
    pub async fn clear_devices(&self) {
        self.devices.write().await.clear();
    }

    /// Drop all seeded provision watchers.
    pub async fn clear_provision_watchers(&self) {
        self.provision_watchers.write().await.clear();
    }

    async fn profiles_matching<F>(&self, filter: F) -> Vec<DeviceProfile>
    where
        F: Fn(&DeviceProfile) -> bool,
    {
        let profiles = self.profiles.read().await;
        let mut matching: Vec<DeviceProfile> =
            profiles.values().filter(|p| filter(p)).cloned().collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        matching
    }
}

fn matches_labels(profile: &DeviceProfile, labels: &[String]) -> bool {
    labels.iter().all(|label| profile.labels.contains(label))
}

fn apply_window<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    let start = offset.max(0) as usize;
    items
        .into_iter()
        .skip(start)
        .take(if limit < 0 { usize::MAX } else { limit as usize })
        .collect()
}

#[async_trait]
impl DeviceProfileRepository for InMemoryMetadataStore {
    async fn add_device_profile(&self, profile: DeviceProfile) -> DomainResult<DeviceProfile> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.name) {
            return Err(DomainError::DeviceProfileAlreadyExists(profile.name));
        }

        let now = Utc::now();
        let mut stored = profile;
        if stored.id.is_empty() {
            stored.id = xid::new().to_string();
        }
        stored.created_at = Some(now);
        stored.updated_at = Some(now);

        profiles.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_device_profile(&self, profile: DeviceProfile) -> DomainResult<()> {
        let mut profiles = self.profiles.write().await;

        let existing_name = if !profile.id.is_empty() {
            profiles
                .values()
                .find(|p| p.id == profile.id)
                .map(|p| p.name.clone())
        } else {
            profiles.get(&profile.name).map(|p| p.name.clone())
        };
        let existing_name = existing_name.ok_or_else(|| {
            DomainError::DeviceProfileNotFound(if profile.id.is_empty() {
                profile.name.clone()
            } else {
                profile.id.clone()
            })
        })?;

        // A rename must not collide with another stored profile.
        if existing_name != profile.name && profiles.contains_key(&profile.name) {
            return Err(DomainError::DeviceProfileAlreadyExists(profile.name));
        }

        let existing = match profiles.remove(&existing_name) {
            Some(existing) => existing,
            None => return Err(DomainError::DeviceProfileNotFound(existing_name)),
        };
        let mut stored = profile;
        stored.id = existing.id;
        stored.created_at = existing.created_at;
        stored.updated_at = Some(Utc::now());
        profiles.insert(stored.name.clone(), stored);
        Ok(())
    }

    async fn device_profile_by_id(&self, id: &str) -> DomainResult<Option<DeviceProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.values().find(|p| p.id == id).cloned())
    }

    async fn device_profile_by_name(&self, name: &str) -> DomainResult<Option<DeviceProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(name).cloned())
    }

    async fn delete_device_profile_by_name(&self, name: &str) -> DomainResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DomainError::DeviceProfileNotFound(name.to_string()))
    }

    async fn device_profile_count_by_labels(&self, labels: &[String]) -> DomainResult<u64> {
        Ok(self.profiles_matching(|p| matches_labels(p, labels)).await.len() as u64)
    }

    async fn device_profile_count_by_model(&self, model: &str) -> DomainResult<u64> {
        Ok(self.profiles_matching(|p| p.model == model).await.len() as u64)
    }

    async fn device_profile_count_by_manufacturer(&self, manufacturer: &str) -> DomainResult<u64> {
        Ok(self
            .profiles_matching(|p| p.manufacturer == manufacturer)
            .await
            .len() as u64)
    }

    async fn device_profile_count_by_manufacturer_and_model(
        &self,
        manufacturer: &str,
        model: &str,
    ) -> DomainResult<u64> {
        Ok(self
            .profiles_matching(|p| p.manufacturer == manufacturer && p.model == model)
            .await
            .len() as u64)
    }

    async fn all_device_profiles(
        &self,
        offset: i64,
        limit: i64,
        labels: &[String],
    ) -> DomainResult<Vec<DeviceProfile>> {
        let matching = self.profiles_matching(|p| matches_labels(p, labels)).await;
        Ok(apply_window(matching, offset, limit))
    }

    async fn device_profiles_by_model(
        &self,
        offset: i64,
        limit: i64,
        model: &str,
    ) -> DomainResult<Vec<DeviceProfile>> {
        let matching = self.profiles_matching(|p| p.model == model).await;
        Ok(apply_window(matching, offset, limit))
    }

    async fn device_profiles_by_manufacturer(
        &self,
        offset: i64,
        limit: i64,
        manufacturer: &str,
    ) -> DomainResult<Vec<DeviceProfile>> {
        let matching = self
            .profiles_matching(|p| p.manufacturer == manufacturer)
            .await;
        Ok(apply_window(matching, offset, limit))
    }

    async fn device_profiles_by_manufacturer_and_model(
        &self,
        offset: i64,
        limit: i64,
        manufacturer: &str,
        model: &str,
    ) -> DomainResult<Vec<DeviceProfile>> {
        let matching = self
            .profiles_matching(|p| p.manufacturer == manufacturer && p.model == model)
            .await;
        Ok(apply_window(matching, offset, limit))
    }
}

#[async_trait]
impl DeviceRepository for InMemoryMetadataStore {
    async fn devices_by_profile_name(
        &self,
        offset: i64,
        limit: i64,
        profile_name: &str,
    ) -> DomainResult<Vec<Device>> {
        let devices = self.devices.read().await;
        let mut matching: Vec<Device> = devices
            .iter()
            .filter(|d| d.profile_name == profile_name)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apply_window(matching, offset, limit))
    }
}

#[async_trait]
impl ProvisionWatcherRepository for InMemoryMetadataStore {
    async fn provision_watchers_by_profile_name(
        &self,
        offset: i64,
        limit: i64,
        profile_name: &str,
    ) -> DomainResult<Vec<ProvisionWatcher>> {
        let watchers = self.provision_watchers.read().await;
        let mut matching: Vec<ProvisionWatcher> = watchers
            .iter()
            .filter(|w| w.profile_name == profile_name)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apply_window(matching, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, manufacturer: &str, model: &str, labels: &[&str]) -> DeviceProfile {
        DeviceProfile {
            name: name.to_string(),
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn add_assigns_id_and_timestamps() {
        let store = InMemoryMetadataStore::new();
        let added = store
            .add_device_profile(profile("Temp-Sensor-X", "Acme", "TS-100", &[]))
            .await
            .unwrap();

        assert!(!added.id.is_empty());
        assert!(added.created_at.is_some());

        let fetched = store.device_profile_by_name("Temp-Sensor-X").await.unwrap();
        assert_eq!(fetched.unwrap().id, added.id);
    }

    #[tokio::test]
    async fn add_rejects_duplicate_name() {
        let store = InMemoryMetadataStore::new();
        store
            .add_device_profile(profile("Temp-Sensor-X", "Acme", "TS-100", &[]))
            .await
            .unwrap();

        let result = store
            .add_device_profile(profile("Temp-Sensor-X", "Other", "Z-1", &[]))
            .await;
        assert!(matches!(
            result,
            Err(DomainError::DeviceProfileAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_id_and_supports_rename() {
        let store = InMemoryMetadataStore::new();
        let added = store
            .add_device_profile(profile("Temp-Sensor-X", "Acme", "TS-100", &[]))
            .await
            .unwrap();

        let mut renamed = added.clone();
        renamed.name = "Temp-Sensor-Y".to_string();
        store.update_device_profile(renamed).await.unwrap();

        assert!(store
            .device_profile_by_name("Temp-Sensor-X")
            .await
            .unwrap()
            .is_none());
        let fetched = store
            .device_profile_by_name("Temp-Sensor-Y")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, added.id);
    }

    #[tokio::test]
    async fn update_unknown_profile_fails() {
        let store = InMemoryMetadataStore::new();
        let result = store
            .update_device_profile(profile("ghost", "Acme", "TS-100", &[]))
            .await;
        assert!(matches!(result, Err(DomainError::DeviceProfileNotFound(_))));
    }

    #[tokio::test]
    async fn listings_filter_and_window() {
        let store = InMemoryMetadataStore::new();
        store
            .add_device_profile(profile("a", "Acme", "TS-100", &["sensor", "indoor"]))
            .await
            .unwrap();
        store
            .add_device_profile(profile("b", "Acme", "TS-200", &["sensor"]))
            .await
            .unwrap();
        store
            .add_device_profile(profile("c", "Other", "TS-100", &[]))
            .await
            .unwrap();

        let labels = vec!["sensor".to_string()];
        assert_eq!(store.device_profile_count_by_labels(&labels).await.unwrap(), 2);
        assert_eq!(
            store
                .device_profile_count_by_labels(&["sensor".to_string(), "indoor".to_string()])
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.device_profile_count_by_model("TS-100").await.unwrap(), 2);
        assert_eq!(
            store
                .device_profile_count_by_manufacturer_and_model("Acme", "TS-100")
                .await
                .unwrap(),
            1
        );

        let page = store.all_device_profiles(1, 1, &[]).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "b");

        let unbounded = store.all_device_profiles(0, -1, &[]).await.unwrap();
        assert_eq!(unbounded.len(), 3);
    }

    #[tokio::test]
    async fn device_probe_sees_only_matching_profile() {
        let store = InMemoryMetadataStore::new();
        store
            .insert_device(Device {
                id: "dev-1".to_string(),
                name: "thermostat-1".to_string(),
                profile_name: "Temp-Sensor-X".to_string(),
                ..Default::default()
            })
            .await;

        let hits = store
            .devices_by_profile_name(0, 1, "Temp-Sensor-X")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = store.devices_by_profile_name(0, 1, "other").await.unwrap();
        assert!(misses.is_empty());
    }
}
