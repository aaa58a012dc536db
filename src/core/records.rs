use crate::core::course_split::flatten_races;
use crate::domain::model::{NamedRecord, Record};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const TIMESTAMP_FIELD: &str = "scraped_at";
pub const MAX_KEY_LEN: usize = 250;
const JSON_EXT: &str = ".json";

/// 把 scraper 輸出整理成記錄序列
pub fn normalize(value: &Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => Record::new(obj.clone()),
                other => {
                    let mut data = Map::new();
                    data.insert("value".to_string(), other.clone());
                    Record::new(data)
                }
            })
            .collect(),
        Value::Object(obj) => {
            let races = flatten_races(value);
            if races.is_empty() {
                vec![Record::new(obj.clone())]
            } else {
                races.into_iter().map(|race| race.record).collect()
            }
        }
        Value::Null => Vec::new(),
        other => {
            let mut data = Map::new();
            data.insert("value".to_string(), other.clone());
            vec![Record::new(data)]
        }
    }
}

pub fn stamp(records: &mut [Record], captured_at: DateTime<Utc>) {
    let timestamp = captured_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    for record in records.iter_mut() {
        record
            .data
            .insert(TIMESTAMP_FIELD.to_string(), Value::String(timestamp.clone()));
    }
}

/// 只保留 `[A-Za-z0-9._-]`，其他連續字元合併為一個 `-`
pub fn sanitize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.chars() {
        if is_key_char(c) {
            if pending_dash && !key.is_empty() {
                key.push('-');
            }
            pending_dash = false;
            key.push(c);
        } else {
            pending_dash = true;
        }
    }

    key.truncate(MAX_KEY_LEN);
    key
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_KEY_LEN && key.chars().all(is_key_char)
}

/// stem 只含 ASCII；截斷 stem 使 stem + suffix + `.json` 不超過 MAX_KEY_LEN
fn fit_filename(stem: &str, suffix: &str) -> String {
    let room = MAX_KEY_LEN - suffix.len() - JSON_EXT.len();
    let stem = &stem[..stem.len().min(room)];
    format!("{}{}{}", stem, suffix, JSON_EXT)
}

fn field_text(record: &Record, key: &str) -> Option<String> {
    match record.data.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn derive_stem(record: &Record, index: usize) -> String {
    let parts: Vec<String> = ["course", "off_time", "race_id"]
        .iter()
        .filter_map(|key| field_text(record, key))
        .collect();

    let stem = sanitize_key(&parts.join("_"));
    if stem.is_empty() {
        format!("record_{}", index)
    } else {
        stem
    }
}

pub fn derive_filename(record: &Record, index: usize) -> String {
    fit_filename(&derive_stem(record, index), "")
}

/// 為整批記錄命名，重複的檔名加上 `_<n>`；`reserved` 中的 key（含 `.json` 形式）不會被使用
pub fn assign_filenames(records: Vec<Record>, reserved: &[&str]) -> Vec<NamedRecord> {
    let mut used: HashSet<String> = HashSet::new();
    for key in reserved {
        used.insert(key.to_string());
        used.insert(format!("{}{}", key, JSON_EXT));
    }

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let stem = derive_stem(&record, index);
            let mut filename = fit_filename(&stem, "");
            let mut n = 2usize;
            while used.contains(&filename) {
                filename = fit_filename(&stem, &format!("_{}", n));
                n += 1;
            }
            used.insert(filename.clone());

            NamedRecord { filename, record }
        })
        .collect()
}
