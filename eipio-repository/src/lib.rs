pub mod json;
pub mod memory;

use eipio_models::Device;
use thiserror::Error;

pub use json::JsonDeviceRepository;
pub use memory::InMemoryDeviceRepository;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{0}")]
    Validation(String),
    #[error("Device name already exists")]
    Duplicate,
    #[error("Device not found")]
    NotFound,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
}

/// Read/write source of device configuration. The core treats this purely as
/// a read source; mutation is driven by whatever management surface sits on
/// top. Implementations are selected at construction and passed around as
/// `Arc<dyn DeviceRepository>`.
pub trait DeviceRepository: Send + Sync {
    fn create(&self, device: Device) -> RepositoryResult<()>;
    fn find(&self, name: &str) -> Option<Device>;
    /// All devices, ordered by name.
    fn list(&self) -> Vec<Device>;
    /// Replace the device stored under `name`. A differing `device.name`
    /// renames the entry; the new name must not collide.
    fn update(&self, name: &str, device: Device) -> RepositoryResult<()>;
    fn remove(&self, name: &str) -> RepositoryResult<()>;
}
