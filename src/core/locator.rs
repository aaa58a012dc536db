use crate::domain::model::{Artifact, ArtifactSource};
use crate::utils::error::Result;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 在輸出目錄中找出最近修改的 `.json` 檔（不遞迴，不存在的目錄略過）
pub fn latest_json(dirs: &[PathBuf]) -> Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for dir in dirs {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Output directory {} does not exist", dir.display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            let modified = metadata.modified()?;
            let is_newer = match &newest {
                Some((best, best_path)) => (modified, &path) > (*best, best_path),
                None => true,
            };
            if is_newer {
                newest = Some((modified, path));
            }
        }
    }

    if let Some((_, path)) = &newest {
        tracing::info!("📄 Found output file: {}", path.display());
    }

    Ok(newest.map(|(_, path)| path))
}

pub fn modified_before(path: &Path, instant: SystemTime) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|modified| modified < instant)
        .unwrap_or(false)
}

/// 與 Python 的真值判斷一致：null、空容器、空字串、false、0 都算沒有資料
fn has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("{} records", items.len()),
        Value::Object(obj) => format!("{} top-level keys", obj.len()),
        _ => "data".to_string(),
    }
}

/// 讀取輸出檔；失敗時依序退回 stdout JSON、原始 stdout、空結果訊息
pub async fn load_artifact(file: Option<&Path>, stdout: &str) -> Result<Artifact> {
    if let Some(path) = file {
        let content = tokio::fs::read_to_string(path).await?;
        match serde_json::from_str::<Value>(&content) {
            Ok(value) if has_data(&value) => {
                tracing::info!("Loaded JSON from file: {}", describe(&value));
                return Ok(Artifact {
                    value,
                    source: ArtifactSource::File(path.to_path_buf()),
                });
            }
            Ok(_) => tracing::warn!("Output file {} holds no data", path.display()),
            Err(e) => tracing::warn!("Could not parse file as JSON: {}", e),
        }
    }

    let trimmed = stdout.trim();
    if !trimmed.is_empty() {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) if has_data(&value) => {
                tracing::info!("Parsed JSON from stdout: {}", describe(&value));
                return Ok(Artifact {
                    value,
                    source: ArtifactSource::Stdout,
                });
            }
            Ok(_) => {}
            Err(_) => {
                tracing::info!("Treating stdout as raw text");
                return Ok(Artifact {
                    value: json!({ "raw_output": stdout }),
                    source: ArtifactSource::RawStdout,
                });
            }
        }
    }

    tracing::warn!("No output generated by the scraper");
    Ok(Artifact {
        value: json!({ "message": "No output generated", "stdout": stdout }),
        source: ArtifactSource::Empty,
    })
}
