use crate::{memory::InMemoryDeviceRepository, DeviceRepository, RepositoryResult};
use eipio_models::Device;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Durable registry: an in-memory table loaded from a JSON array file at
/// construction and rewritten after every successful mutation.
pub struct JsonDeviceRepository {
    inner: InMemoryDeviceRepository,
    path: PathBuf,
}

impl JsonDeviceRepository {
    pub fn open(path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let repo = Self {
            inner: InMemoryDeviceRepository::new(),
            path: path.into(),
        };
        repo.load()?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> RepositoryResult<()> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            // A missing file is a fresh registry, not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        let devices: Vec<Device> = serde_json::from_str(&raw)?;
        self.inner.replace_all(devices);
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!(path = %self.path.display(), error = %e, "failed to persist device registry");
        }
    }

    fn try_persist(&self) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_string_pretty(&self.inner.list())?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

impl DeviceRepository for JsonDeviceRepository {
    fn create(&self, device: Device) -> RepositoryResult<()> {
        self.inner.create(device)?;
        self.persist();
        Ok(())
    }

    fn find(&self, name: &str) -> Option<Device> {
        self.inner.find(name)
    }

    fn list(&self) -> Vec<Device> {
        self.inner.list()
    }

    fn update(&self, name: &str, device: Device) -> RepositoryResult<()> {
        self.inner.update(name, device)?;
        self.persist();
        Ok(())
    }

    fn remove(&self, name: &str) -> RepositoryResult<()> {
        self.inner.remove(name)?;
        self.persist();
        Ok(())
    }
}
