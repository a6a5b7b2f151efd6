//! Generate a default comparison descriptor
//!
//! Creates a JSON descriptor with all default parameters for two images

use visual_diff::config::ComparisonOptions;
use visual_diff::ConfigOptions;
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: {} <output_config.json> <image_a> <image_b>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} compare.json baseline/home.png current/home.png", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let options = ConfigOptions::for_images(&args[2], &args[3]);

    match options.to_json_file(output_path) {
        Ok(()) => {
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            for (i, comparison) in options.comparisons.iter().enumerate() {
                match comparison {
                    ComparisonOptions::Pixel(pixel) => eprintln!(
                        "  Pass {}: pixel, delta {:.0}, shift {}x{}{}",
                        i,
                        pixel.color_delta,
                        pixel.shift.horizontal,
                        pixel.shift.vertical,
                        if pixel.perceptual { ", perceptual" } else { "" }
                    ),
                    ComparisonOptions::Structure(structure) => {
                        eprintln!("  Pass {}: structure on '{}'", i, structure.selector)
                    }
                }
            }
            eprintln!(
                "  Threshold: {:?} {}",
                options.threshold.kind, options.threshold.value
            );
            eprintln!(
                "  Output: {:?} layout, limit {:?}",
                options.output.composition, options.output.limit
            );
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e);
            process::exit(1);
        }
    }
}
