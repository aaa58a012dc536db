use crate::core::records::is_valid_key;
use crate::domain::ports::{Dataset, KeyValueStore};
use crate::utils::error::{RelayError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// 本機資料集：`<base>/datasets/<id>/000000001.json` 依序遞增
#[derive(Debug)]
pub struct LocalDataset {
    dir: PathBuf,
    next_seq: AtomicU64,
}

impl LocalDataset {
    pub fn open(base_path: &Path, dataset_id: &str) -> Result<Self> {
        let dir = base_path.join("datasets").join(dataset_id);
        fs::create_dir_all(&dir)?;

        // 接續既有項目編號
        let mut last = 0u64;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let seq = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok());
            if let Some(seq) = seq {
                last = last.max(seq);
            }
        }

        Ok(Self {
            dir,
            next_seq: AtomicU64::new(last + 1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Dataset for LocalDataset {
    async fn push_data(&self, item: &Value) -> Result<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(format!("{:09}.json", seq));
        let json = serde_json::to_vec_pretty(item)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }
}

/// 本機 key-value 儲存：`<base>/key_value_stores/<id>/<key>.json`
#[derive(Debug, Clone)]
pub struct LocalKeyValueStore {
    dir: PathBuf,
}

impl LocalKeyValueStore {
    pub fn open(base_path: &Path, store_id: &str) -> Result<Self> {
        let dir = base_path.join("key_value_stores").join(store_id);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// key 必須已符合命名規則，不做截斷或改寫
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(RelayError::ValidationError {
                message: format!("Invalid storage key: {:?}", key),
            });
        }

        let filename = if key.ends_with(".json") {
            key.to_string()
        } else {
            format!("{}.json", key)
        };
        Ok(self.dir.join(filename))
    }
}

impl KeyValueStore for LocalKeyValueStore {
    async fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        let json = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, json).await?;
        Ok(())
    }
}
