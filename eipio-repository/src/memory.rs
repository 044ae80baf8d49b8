use crate::{DeviceRepository, RepositoryError, RepositoryResult};
use eipio_models::Device;
use std::{
    collections::BTreeMap,
    sync::RwLock,
};

/// Volatile registry keyed by device name.
#[derive(Default)]
pub struct InMemoryDeviceRepository {
    devices: RwLock<BTreeMap<String, Device>>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot used by the JSON variant to persist the whole table.
    pub(crate) fn replace_all(&self, devices: Vec<Device>) {
        let mut guard = self.devices.write().unwrap();
        guard.clear();
        for device in devices {
            guard.insert(device.name.clone(), device);
        }
    }
}

impl DeviceRepository for InMemoryDeviceRepository {
    fn create(&self, device: Device) -> RepositoryResult<()> {
        device
            .validate()
            .map_err(|e| RepositoryError::Validation(e.0))?;
        let mut guard = self.devices.write().unwrap();
        if guard.contains_key(&device.name) {
            return Err(RepositoryError::Duplicate);
        }
        guard.insert(device.name.clone(), device);
        Ok(())
    }

    fn find(&self, name: &str) -> Option<Device> {
        self.devices.read().unwrap().get(name).cloned()
    }

    fn list(&self) -> Vec<Device> {
        self.devices.read().unwrap().values().cloned().collect()
    }

    fn update(&self, name: &str, device: Device) -> RepositoryResult<()> {
        device
            .validate()
            .map_err(|e| RepositoryError::Validation(e.0))?;
        let mut guard = self.devices.write().unwrap();
        if !guard.contains_key(name) {
            return Err(RepositoryError::NotFound);
        }
        if device.name != name && guard.contains_key(&device.name) {
            return Err(RepositoryError::Duplicate);
        }
        if device.name != name {
            guard.remove(name);
        }
        guard.insert(device.name.clone(), device);
        Ok(())
    }

    fn remove(&self, name: &str) -> RepositoryResult<()> {
        let mut guard = self.devices.write().unwrap();
        guard
            .remove(name)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, ip: &str) -> Device {
        Device::new(name, ip)
    }

    #[test]
    fn create_find_update_remove() {
        let repo = InMemoryDeviceRepository::new();
        repo.create(device("Test", "192.168.1.10")).unwrap();
        assert_eq!(repo.find("Test").unwrap().ip_address, "192.168.1.10");

        let mut updated = device("Test", "10.0.0.5");
        updated.timeout_ms = 2000;
        repo.update("Test", updated).unwrap();
        assert_eq!(repo.find("Test").unwrap().ip_address, "10.0.0.5");

        repo.remove("Test").unwrap();
        assert!(repo.find("Test").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let repo = InMemoryDeviceRepository::new();
        repo.create(device("A", "10.0.0.1")).unwrap();
        assert!(matches!(
            repo.create(device("A", "10.0.0.2")),
            Err(RepositoryError::Duplicate)
        ));
    }

    #[test]
    fn rename_keeps_uniqueness() {
        let repo = InMemoryDeviceRepository::new();
        repo.create(device("A", "10.0.0.1")).unwrap();
        repo.create(device("B", "10.0.0.2")).unwrap();
        // Renaming A over B must collide.
        assert!(matches!(
            repo.update("A", device("B", "10.0.0.1")),
            Err(RepositoryError::Duplicate)
        ));
        // Renaming A to C drops the old key.
        repo.update("A", device("C", "10.0.0.1")).unwrap();
        assert!(repo.find("A").is_none());
        assert!(repo.find("C").is_some());
    }

    #[test]
    fn list_is_name_ordered() {
        let repo = InMemoryDeviceRepository::new();
        repo.create(device("Zeta", "10.0.0.1")).unwrap();
        repo.create(device("Alpha", "10.0.0.2")).unwrap();
        let names: Vec<String> = repo.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn invalid_devices_are_rejected() {
        let repo = InMemoryDeviceRepository::new();
        let mut bad = device("", "10.0.0.1");
        assert!(matches!(
            repo.create(bad.clone()),
            Err(RepositoryError::Validation(_))
        ));
        bad.name = "Ok".into();
        bad.timeout_ms = 0;
        assert!(matches!(
            repo.create(bad),
            Err(RepositoryError::Validation(_))
        ));
    }
}
