//! Command-line interface for visual_diff
//!
//! Compares two screenshots, either named directly or through a JSON
//! descriptor, and prints the result as JSON.

use visual_diff::config::{Composition, CopySource, Output, OutputLimit};
use visual_diff::{Config, ConfigOptions, ImageSource, ResultCode, Runner};
use std::{env, path::PathBuf, process};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut output_path = None;
    let mut parallel = false;
    let mut images = Vec::new();

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(PathBuf::from(path)),
                    None => {
                        eprintln!("Error: --config needs a file");
                        process::exit(1);
                    }
                }
            }
            "--output" | "-o" => {
                i += 1;
                match args.get(i) {
                    Some(path) => output_path = Some(PathBuf::from(path)),
                    None => {
                        eprintln!("Error: --output needs a file");
                        process::exit(1);
                    }
                }
            }
            "--parallel" => parallel = true,
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => images.push(PathBuf::from(arg)),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match (config_path, images.as_slice()) {
        (Some(path), []) => Config::from_json_file(&path),
        (None, [a, b]) => Config::from_options(&ConfigOptions::for_images(a.clone(), b.clone())),
        _ => {
            print_help(&args[0]);
            process::exit(1);
        }
    };

    let mut config = match config {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Invalid configuration: {}", error);
            eprintln!("Suggestion: {}", error.user_message());
            process::exit(1);
        }
    };

    config.settings.parallel |= parallel;
    if let Some(path) = output_path {
        let output = &config.settings.output;
        config.settings.output = Output::new(
            Some(path),
            output.limit(),
            output.composition(),
            output.copy_source(),
        );
    }

    describe(&config);

    match Runner::new(config).run() {
        Ok(result) => {
            match serde_json::to_string_pretty(&result.summary()) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error serializing result: {}", e),
            }
            if result.code == ResultCode::Different {
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

fn describe(config: &Config) {
    let source = |s: &ImageSource| match s.crop() {
        Some(crop) => format!("{} (crop {:?})", s.path().display(), crop),
        None => s.path().display().to_string(),
    };
    eprintln!("Comparing:");
    eprintln!("  A: {}", source(&config.image_a));
    eprintln!("  B: {}", source(&config.image_b));
    eprintln!("  Passes: {}", config.settings.comparisons.len());

    let output = &config.settings.output;
    if let Some(path) = output.image_path() {
        let layout = match output.composition() {
            Composition::Off => "highlight only",
            Composition::Auto => "auto layout",
            Composition::LeftToRight => "left to right",
            Composition::TopToBottom => "top to bottom",
        };
        let base = match output.copy_source() {
            CopySource::None => "blank",
            CopySource::ImageA => "image A",
            CopySource::ImageB => "image B",
        };
        let limit = match output.limit() {
            OutputLimit::Different => "different results",
            OutputLimit::Similar => "similar or different results",
            OutputLimit::All => "every result",
        };
        eprintln!(
            "  Output: {} ({}, {} base, written for {})",
            path.display(),
            layout,
            base,
            limit
        );
    }
    eprintln!();
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_a> <image_b>", program_name);
    eprintln!("       {} [OPTIONS] --config <compare.json>", program_name);
    eprintln!();
    eprintln!("Compare two screenshots and report whether they differ.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config, -c FILE   Read a JSON comparison descriptor");
    eprintln!("  --output, -o FILE   Write the composed output image");
    eprintln!("  --parallel          Compare rows on all cores");
    eprintln!("  --help, -h          Show this help message");
    eprintln!();
    eprintln!("Exit status is 2 when the images are different.");
    eprintln!("Set RUST_LOG=visual_diff=debug for a trace of the run.");
}
