#[cfg(feature = "cli")]
pub mod cli;
pub mod input;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use input::{InputDocument, RunInput};
pub use toml_config::{RelayConfig, StorageKind};
