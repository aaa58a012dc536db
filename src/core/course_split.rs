use crate::domain::model::Record;
use crate::utils::error::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FlatRace {
    pub course: String,
    pub record: Record,
}

/// 單一場地當日的全部比賽
#[derive(Debug, Clone, PartialEq)]
pub struct CourseGroup {
    pub course: String,
    pub races: Vec<Record>,
}

#[derive(Debug, Clone)]
pub struct SavedCourse {
    pub course: String,
    pub race_count: usize,
    pub path: PathBuf,
}

/// 展開巢狀 racecard 結構；只收含有 `runners` 的比賽物件
pub fn flatten_races(data: &Value) -> Vec<FlatRace> {
    let mut races = Vec::new();

    let Some(countries) = data.as_object() else {
        return races;
    };

    for (country, courses) in countries {
        let Some(courses) = courses.as_object() else {
            continue;
        };
        for (course_name, race_times) in courses {
            let Some(race_times) = race_times.as_object() else {
                continue;
            };
            for (off_time, race_data) in race_times {
                let Some(race_data) = race_data.as_object() else {
                    continue;
                };
                if !race_data.contains_key("runners") {
                    continue;
                }

                let mut full_race = Map::new();
                full_race.insert("country".to_string(), Value::String(country.clone()));
                full_race.insert("course".to_string(), Value::String(course_name.clone()));
                full_race.insert("off_time".to_string(), Value::String(off_time.clone()));
                // 比賽本身的欄位優先
                for (key, value) in race_data {
                    full_race.insert(key.clone(), value.clone());
                }

                races.push(FlatRace {
                    course: course_name.clone(),
                    record: Record::new(full_race),
                });
            }
        }
    }

    races
}

/// 依場地分組，保留場地首次出現的順序
pub fn group_by_course(data: &Value) -> Vec<CourseGroup> {
    let mut groups: Vec<CourseGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for race in flatten_races(data) {
        match index.get(&race.course) {
            Some(&i) => groups[i].races.push(race.record),
            None => {
                index.insert(race.course.clone(), groups.len());
                groups.push(CourseGroup {
                    course: race.course,
                    races: vec![race.record],
                });
            }
        }
    }

    groups
}

pub fn safe_file_stem(course: &str) -> String {
    let kept: String = course
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let trimmed = kept.trim_end();

    if trimmed.is_empty() {
        "course".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn write_groups(groups: &[CourseGroup], output_dir: &Path) -> Result<Vec<SavedCourse>> {
    std::fs::create_dir_all(output_dir)?;

    let mut saved = Vec::with_capacity(groups.len());
    for group in groups {
        let path = output_dir.join(format!("{}.json", safe_file_stem(&group.course)));
        let json = serde_json::to_string_pretty(&group.races)?;
        std::fs::write(&path, json)?;

        tracing::debug!(course = %group.course, path = %path.display(), "Course file written");
        saved.push(SavedCourse {
            course: group.course.clone(),
            race_count: group.races.len(),
            path,
        });
    }

    Ok(saved)
}
