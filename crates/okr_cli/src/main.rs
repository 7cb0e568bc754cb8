//! CLI smoke entry point.
//!
//! Prints core linkage info and the default timeline window for today.
//! An optional first argument names a TOML config file.

use chrono::Local;
use okr_core::{compute_range, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match std::env::args().nth(1) {
        Some(path) => match CoreConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("okr_cli: {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => CoreConfig::default(),
    };
    if let Err(err) = okr_core::init_logging_from_config(&config.logging) {
        eprintln!("okr_cli: {err}");
        return ExitCode::FAILURE;
    }

    println!("okr_core ping={}", okr_core::ping());
    println!("okr_core version={}", okr_core::core_version());

    let range = compute_range(&[], Local::now().date_naive(), &config.timeline);
    let labels: Vec<&str> = range
        .months
        .iter()
        .map(|month| month.label.as_str())
        .collect();
    println!("timeline start={} end={}", range.start, range.end);
    println!("timeline months={}", labels.join(", "));
    ExitCode::SUCCESS
}
