pub mod course_split;
pub mod engine;
pub mod locator;
pub mod pipeline;
pub mod provision;
pub mod records;
pub mod runner;

pub use crate::domain::model::{Artifact, LoadSummary, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Dataset, KeyValueStore, Pipeline};
pub use crate::utils::error::Result;
