use crate::config::input::RunInput;
use crate::core::locator::{latest_json, load_artifact, modified_before};
use crate::core::provision::{ensure_scraper, script_path, scripts_dir};
use crate::core::records::{assign_filenames, normalize, stamp};
use crate::core::runner::{run_script, ScriptInvocation};
use crate::domain::model::{Artifact, ArtifactSource, LoadSummary, TransformResult};
use crate::domain::ports::{ConfigProvider, Dataset, KeyValueStore, Pipeline};
use crate::utils::error::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde_json::Value;
use std::path::PathBuf;
use std::time::SystemTime;

pub const OUTPUT_KEY: &str = "OUTPUT";

/// scraper → 輸出檔 → 資料集與 key-value 儲存
pub struct RelayPipeline<D: Dataset, K: KeyValueStore, C: ConfigProvider> {
    dataset: D,
    store: K,
    config: C,
    input: RunInput,
    captured_at: DateTime<Utc>,
}

impl<D: Dataset, K: KeyValueStore, C: ConfigProvider> RelayPipeline<D, K, C> {
    pub fn new(dataset: D, store: K, config: C, input: RunInput) -> Self {
        Self {
            dataset,
            store,
            config,
            input,
            captured_at: Utc::now(),
        }
    }

    pub fn with_capture_time(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    fn today(&self) -> NaiveDate {
        self.captured_at.with_timezone(&Local).date_naive()
    }

    fn output_dirs(&self) -> Vec<PathBuf> {
        let root = self.config.scraper_root();
        self.config
            .output_dirs()
            .into_iter()
            .map(|dir| root.join(dir))
            .collect()
    }
}

#[async_trait::async_trait]
impl<D: Dataset, K: KeyValueStore, C: ConfigProvider> Pipeline for RelayPipeline<D, K, C> {
    async fn extract(&self) -> Result<Artifact> {
        let root = self.config.scraper_root();
        ensure_scraper(self.config.repo_url(), root).await?;
        script_path(root, &self.input.command)?;

        let invocation = ScriptInvocation {
            interpreter: self.config.interpreter().to_string(),
            script_file: self.input.script_file(),
            date: self.input.date.clone(),
            working_dir: scripts_dir(root),
            timeout: self.config.script_timeout(),
        };

        let started = SystemTime::now();
        let output = run_script(&invocation).await?;

        // scraper 寫檔而非輸出到 stdout
        let output_file = latest_json(&self.output_dirs())?;
        if let Some(path) = &output_file {
            if modified_before(path, started) {
                tracing::warn!(
                    "⚠️ {} was modified before this run started and may be stale",
                    path.display()
                );
            }
        }

        load_artifact(output_file.as_deref(), &output.stdout).await
    }

    async fn transform(&self, artifact: Artifact) -> Result<TransformResult> {
        let mut records = normalize(&artifact.value);
        stamp(&mut records, self.captured_at);
        // 記錄不可佔用 OUTPUT 與批次 key
        let batch_key = self.input.batch_key(self.today());
        let records = assign_filenames(records, &[OUTPUT_KEY, batch_key.as_str()]);

        tracing::debug!("Prepared {} records for publishing", records.len());
        Ok(TransformResult { records, artifact })
    }

    async fn load(&self, result: TransformResult) -> Result<LoadSummary> {
        let TransformResult { records, artifact } = result;
        let records_published = records.len();
        let mut batch = Vec::with_capacity(records_published);

        for named in records {
            let value = named.record.into_value();
            self.dataset.push_data(&value).await?;
            self.store.set_value(&named.filename, &value).await?;
            tracing::debug!("Stored {}", named.filename);
            batch.push(value);
        }
        tracing::info!("Data pushed to dataset: {} records", records_published);

        let batch_key = self.input.batch_key(self.today());
        self.store.set_value(&batch_key, &Value::Array(batch)).await?;
        tracing::info!("Batch stored in key-value store as {}", batch_key);

        self.store.set_value(OUTPUT_KEY, &artifact.value).await?;
        tracing::info!("Data stored in key-value store as {}", OUTPUT_KEY);

        match &artifact.source {
            ArtifactSource::File(path) => {
                tracing::info!("rpscrape file location: {}", path.display())
            }
            _ => tracing::info!("rpscrape output taken from captured stdout"),
        }

        Ok(LoadSummary {
            records_published,
            batch_key,
            source: artifact.source,
        })
    }
}
