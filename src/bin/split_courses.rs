use anyhow::Context;
use chrono::Local;
use clap::Parser;
use racecard_relay::core::course_split::{group_by_course, write_groups};
use racecard_relay::utils::logger;
use std::path::PathBuf;

/// Split a day's racecard JSON into one file per racecourse
#[derive(Parser)]
#[command(name = "split-courses")]
struct Args {
    /// Racecard date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    date: Option<String>,

    /// Input file, defaults to rpscrape/racecards/<date>.json
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory, defaults to output/<date>
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let date = args
        .date
        .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());
    let input = args.input.unwrap_or_else(|| {
        PathBuf::from("rpscrape")
            .join("racecards")
            .join(format!("{}.json", date))
    });
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from("output").join(&date));

    tracing::debug!("Reading racecards from {}", input.display());
    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let data: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;

    let groups = group_by_course(&data);
    let saved = write_groups(&groups, &output_dir)
        .with_context(|| format!("failed to write course files to {}", output_dir.display()))?;

    for course in &saved {
        let file_name = course
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!(
            "Saved {} race(s) for {} to {}",
            course.race_count, course.course, file_name
        );
    }

    println!("\n✅ All done! Files saved to: {}", output_dir.display());
    Ok(())
}
