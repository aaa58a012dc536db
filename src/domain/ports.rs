use crate::domain::model::{Artifact, LoadSummary, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 逐筆附加的資料集
pub trait Dataset: Send + Sync {
    fn push_data(&self, item: &Value) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 以 key 覆寫的儲存區
pub trait KeyValueStore: Send + Sync {
    fn set_value(
        &self,
        key: &str,
        value: &Value,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn repo_url(&self) -> &str;
    fn scraper_root(&self) -> &Path;
    fn interpreter(&self) -> &str;
    fn script_timeout(&self) -> Duration;
    /// 相對於 scraper_root 的輸出目錄
    fn output_dirs(&self) -> Vec<PathBuf>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Artifact>;
    async fn transform(&self, artifact: Artifact) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadSummary>;
}
