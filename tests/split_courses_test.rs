use racecard_relay::core::course_split::{group_by_course, write_groups};
use serde_json::{json, Value};
use std::process::Command;
use tempfile::TempDir;

fn racecards() -> Value {
    json!({
        "GB": {
            "Ascot": {
                "13:30": {"race_id": 1, "runners": [{"name": "Alpha"}]},
                "14:05": {"race_id": 2, "runners": [{"name": "Beta"}]}
            },
            "Kempton (AW)": {
                "18:00": {"race_id": 3, "runners": []}
            }
        },
        "IRE": {
            "Naas": {
                "12:00": {"race_id": 4, "runners": []}
            }
        }
    })
}

#[test]
fn test_split_groups_and_writes_files() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("output").join("2025-06-17");

    let saved = write_groups(&group_by_course(&racecards()), &output_dir).unwrap();
    let summary: Vec<(String, usize)> = saved
        .iter()
        .map(|s| (s.course.clone(), s.race_count))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Ascot".to_string(), 2),
            ("Kempton (AW)".to_string(), 1),
            ("Naas".to_string(), 1)
        ]
    );

    let naas: Value =
        serde_json::from_str(&std::fs::read_to_string(output_dir.join("Naas.json")).unwrap())
            .unwrap();
    assert_eq!(
        naas,
        json!([{"country": "IRE", "course": "Naas", "off_time": "12:00", "race_id": 4, "runners": []}])
    );
}

#[test]
fn test_split_courses_binary() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("2025-06-17.json");
    let output_dir = dir.path().join("out");
    std::fs::write(&input, serde_json::to_string(&racecards()).unwrap()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_split-courses"))
        .arg("--input")
        .arg(&input)
        .arg("--output-dir")
        .arg(&output_dir)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Saved 2 race(s) for Ascot to Ascot.json"));
    assert!(stdout.contains("Saved 1 race(s) for Kempton (AW) to Kempton AW.json"));
    assert!(stdout.contains("All done!"));
    assert!(output_dir.join("Kempton AW.json").exists());
}

#[test]
fn test_split_courses_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_split-courses"))
        .arg("--input")
        .arg(dir.path().join("missing.json"))
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}
