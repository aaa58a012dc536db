use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// 一筆比賽資料（JSON 物件），欄位由外部 scraper 決定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }
}

/// scraper 輸出的來源
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactSource {
    File(PathBuf),
    Stdout,
    RawStdout,
    Empty,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub value: Value,
    pub source: ArtifactSource,
}

#[derive(Debug, Clone)]
pub struct NamedRecord {
    pub filename: String,
    pub record: Record,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<NamedRecord>,
    /// 整份 scraper 輸出，存為 OUTPUT
    pub artifact: Artifact,
}

#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub records_published: usize,
    pub batch_key: String,
    pub source: ArtifactSource,
}
