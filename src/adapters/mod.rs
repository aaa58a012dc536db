// Adapters layer: concrete storage sinks.

pub mod local;
pub mod platform;

pub use local::{LocalDataset, LocalKeyValueStore};
pub use platform::{PlatformClient, PlatformDataset, PlatformKeyValueStore};
