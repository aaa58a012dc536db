use crate::core::records::sanitize_key;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_COMMAND: &str = "racecards";
pub const DEFAULT_DATE: &str = "today";
pub const DEFAULT_INPUT_FILE: &str = "storage/key_value_stores/default/INPUT.json";

/// 執行輸入文件（JSON），未知欄位忽略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDocument {
    pub command: Option<String>,
    pub date: Option<String>,
}

impl InputDocument {
    /// 檔案不存在或內容為空時視為沒有輸入
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No input file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(content).map_err(|e| RelayError::ConfigValidationError {
            field: "input".to_string(),
            message: format!("Input is not a valid JSON object: {}", e),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    pub command: String,
    pub date: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RunInput {
    /// 命令列覆寫 > 輸入文件 > 預設值
    pub fn resolve(overrides: &InputDocument, document: &InputDocument) -> Self {
        let command = present(&overrides.command)
            .or_else(|| present(&document.command))
            .unwrap_or(DEFAULT_COMMAND)
            .to_string();
        let date = present(&overrides.date)
            .or_else(|| present(&document.date))
            .unwrap_or(DEFAULT_DATE)
            .to_string();

        Self { command, date }
    }

    /// `today` / `tomorrow` 轉為 ISO 日期，其他值原樣保留
    pub fn resolved_date(&self, today: NaiveDate) -> String {
        let resolved = match self.date.to_ascii_lowercase().as_str() {
            "today" => Some(today),
            "tomorrow" => today.succ_opt(),
            _ => None,
        };

        resolved
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| self.date.clone())
    }

    pub fn batch_key(&self, today: NaiveDate) -> String {
        sanitize_key(&format!("{}_{}", self.command, self.resolved_date(today)))
    }

    pub fn script_file(&self) -> String {
        format!("{}.py", self.command)
    }
}

impl Validate for RunInput {
    fn validate(&self) -> Result<()> {
        validation::validate_script_name("command", &self.command)?;
        validation::validate_non_empty_string("date", &self.date)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(command: Option<&str>, date: Option<&str>) -> InputDocument {
        InputDocument {
            command: command.map(String::from),
            date: date.map(String::from),
        }
    }

    #[test]
    fn test_defaults_when_nothing_given() {
        let input = RunInput::resolve(&InputDocument::default(), &InputDocument::default());
        assert_eq!(input.command, "racecards");
        assert_eq!(input.date, "today");
        assert_eq!(input.script_file(), "racecards.py");
    }

    #[test]
    fn test_overrides_win_over_document() {
        let input = RunInput::resolve(
            &doc(None, Some("2025-01-02")),
            &doc(Some("racedays"), Some("tomorrow")),
        );
        assert_eq!(input.command, "racedays");
        assert_eq!(input.date, "2025-01-02");
    }

    #[test]
    fn test_blank_values_count_as_absent() {
        let input = RunInput::resolve(&doc(Some("  "), None), &doc(Some(""), Some(" ")));
        assert_eq!(input.command, "racecards");
        assert_eq!(input.date, "today");
    }

    #[test]
    fn test_document_ignores_unknown_keys() {
        let document =
            InputDocument::from_json_str(r#"{"command": "racedays", "proxy": {"useApify": true}}"#)
                .unwrap();
        assert_eq!(document, doc(Some("racedays"), None));
        assert_eq!(InputDocument::from_json_str("  ").unwrap(), InputDocument::default());
        assert!(InputDocument::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_missing_input_file_is_empty_document() {
        let document = InputDocument::from_file("definitely/not/here/INPUT.json").unwrap();
        assert_eq!(document, InputDocument::default());
    }

    #[test]
    fn test_resolved_date_and_batch_key() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

        let input = RunInput::resolve(&InputDocument::default(), &InputDocument::default());
        assert_eq!(input.resolved_date(today), "2025-12-31");
        assert_eq!(input.batch_key(today), "racecards_2025-12-31");

        let tomorrow = RunInput::resolve(&doc(None, Some("Tomorrow")), &InputDocument::default());
        assert_eq!(tomorrow.resolved_date(today), "2026-01-01");

        let fixed = RunInput::resolve(&doc(Some("racedays"), Some("2025/06/01")), &InputDocument::default());
        assert_eq!(fixed.resolved_date(today), "2025/06/01");
        assert_eq!(fixed.batch_key(today), "racedays_2025-06-01");
    }

    #[test]
    fn test_command_validation() {
        let bad = RunInput::resolve(&doc(Some("../../bin/sh"), None), &InputDocument::default());
        assert!(bad.validate().is_err());
        let good = RunInput::resolve(&InputDocument::default(), &InputDocument::default());
        assert!(good.validate().is_ok());
    }
}
