/// Writable service settings consulted on every call.
///
/// Providers may change the returned values at runtime; the profile core
/// never caches them.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait WritableSettings: Send + Sync {
    /// Whether device resource units are validated on add/update.
    fn uom_validation_enabled(&self) -> bool;

    /// Maximum resources allowed per profile. 0 means unlimited.
    fn max_resources(&self) -> u32;

    /// Whether profile deletion is unconditionally refused.
    fn strict_device_profile_deletes(&self) -> bool;
}

/// Fixed settings snapshot, typically built from the service configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticWritableSettings {
    pub uom_validation: bool,
    pub max_resources: u32,
    pub strict_device_profile_deletes: bool,
}

impl WritableSettings for StaticWritableSettings {
    fn uom_validation_enabled(&self) -> bool {
        self.uom_validation
    }

    fn max_resources(&self) -> u32 {
        self.max_resources
    }

    fn strict_device_profile_deletes(&self) -> bool {
        self.strict_device_profile_deletes
    }
}
