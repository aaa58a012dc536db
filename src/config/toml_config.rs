use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "relay.toml";
pub const DEFAULT_REPO_URL: &str = "https://github.com/joenano/rpscrape.git";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub repo_url: String,
    pub root: PathBuf,
    pub interpreter: String,
    pub timeout_seconds: u64,
    pub output_dirs: Vec<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            repo_url: DEFAULT_REPO_URL.to_string(),
            root: PathBuf::from("rpscrape"),
            interpreter: "python".to_string(),
            timeout_seconds: 300,
            output_dirs: vec![PathBuf::from("data"), PathBuf::from("racecards")],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Local,
    Platform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub local_dir: PathBuf,
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub dataset_id: String,
    pub key_value_store_id: String,
    /// 平台請求逾時秒數
    pub timeout_seconds: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::Local,
            local_dir: PathBuf::from("storage"),
            base_url: None,
            token: None,
            dataset_id: "default".to_string(),
            key_value_store_id: "default".to_string(),
            timeout_seconds: Some(30),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl RelayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RelayError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RelayError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 指定路徑優先；否則讀取工作目錄下的 relay.toml，不存在時使用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${RELAY_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RelayError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn storage_timeout(&self) -> Option<Duration> {
        self.storage.timeout_seconds.map(Duration::from_secs)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl ConfigProvider for RelayConfig {
    fn repo_url(&self) -> &str {
        &self.scraper.repo_url
    }

    fn scraper_root(&self) -> &Path {
        &self.scraper.root
    }

    fn interpreter(&self) -> &str {
        &self.scraper.interpreter
    }

    fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.scraper.timeout_seconds)
    }

    fn output_dirs(&self) -> Vec<PathBuf> {
        self.scraper.output_dirs.clone()
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_repo_source("scraper.repo_url", &self.scraper.repo_url)?;
        validation::validate_path(
            "scraper.root",
            &self.scraper.root.to_string_lossy(),
        )?;
        validation::validate_non_empty_string("scraper.interpreter", &self.scraper.interpreter)?;
        validation::validate_range("scraper.timeout_seconds", self.scraper.timeout_seconds, 1, 3600)?;

        if self.scraper.output_dirs.is_empty() {
            return Err(RelayError::InvalidConfigValueError {
                field: "scraper.output_dirs".to_string(),
                value: "[]".to_string(),
                reason: "At least one output directory is required".to_string(),
            });
        }

        match self.storage.kind {
            StorageKind::Local => {
                validation::validate_path(
                    "storage.local_dir",
                    &self.storage.local_dir.to_string_lossy(),
                )?;
            }
            StorageKind::Platform => {
                let base_url =
                    validation::validate_required_field("storage.base_url", &self.storage.base_url)?;
                validation::validate_url("storage.base_url", base_url)?;
                let token =
                    validation::validate_required_field("storage.token", &self.storage.token)?;
                validation::validate_non_empty_string("storage.token", token)?;
                validation::validate_non_empty_string("storage.dataset_id", &self.storage.dataset_id)?;
                validation::validate_non_empty_string(
                    "storage.key_value_store_id",
                    &self.storage.key_value_store_id,
                )?;
                if let Some(timeout) = self.storage.timeout_seconds {
                    validation::validate_range("storage.timeout_seconds", timeout, 1, 600)?;
                }
            }
        }

        tracing::debug!("✅ Relay configuration validation passed");
        Ok(())
    }
}
