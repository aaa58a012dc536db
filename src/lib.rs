pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{InputDocument, RelayConfig, RunInput, StorageKind};

pub use adapters::{LocalDataset, LocalKeyValueStore, PlatformClient};
pub use crate::core::{engine::RelayEngine, pipeline::RelayPipeline};
pub use utils::error::{RelayError, Result};
