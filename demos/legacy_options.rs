//! Convert first-generation flat options into a nested descriptor
//!
//! Reads a flat JSON object (`imageAPath`, `delta`, `hShift`, ...) and
//! prints the equivalent descriptor, or runs it with `--run`.

use visual_diff::config::legacy::LegacyOptions;
use visual_diff::{Config, ConfigOptions, Runner};
use std::{env, fs, process};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let run = args.iter().any(|a| a == "--run");
    let Some(input) = args.iter().skip(1).find(|a| !a.starts_with("--")) else {
        eprintln!("Usage: {} [--run] <legacy_options.json>", args[0]);
        process::exit(1);
    };

    let content = match fs::read_to_string(input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", input, e);
            process::exit(1);
        }
    };

    let legacy: LegacyOptions = match serde_json::from_str(&content) {
        Ok(legacy) => legacy,
        Err(e) => {
            eprintln!("Error parsing legacy options: {}", e);
            process::exit(1);
        }
    };
    let options = ConfigOptions::from(legacy);

    if !run {
        match serde_json::to_string_pretty(&options) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing descriptor: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let result = Config::from_options(&options).and_then(|config| Runner::new(config).run());
    match result {
        Ok(result) => {
            eprintln!(
                "{}: {} differences, {} shifts",
                result.code, result.differences, result.shifts
            );
            if !result.has_passed() {
                process::exit(2);
            }
        }
        Err(error) => {
            eprintln!("Comparison failed: {}", error);
            eprintln!("Suggestion: {}", error.user_message());
            process::exit(1);
        }
    }
}
