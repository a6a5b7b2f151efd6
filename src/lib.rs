//! # Visual Diff
//!
//! A Rust crate for comparing two screenshots and deciding whether they
//! differ in a way a person would notice.
//!
//! This library provides visual-regression checks by:
//! - Measuring per-pixel color distance, raw or in CIELab space
//! - Tolerating anti-aliasing and sub-pixel shifts within a small window
//! - Masking dynamic regions with block-outs
//! - Classifying the run against a pixel or percentage threshold
//! - Composing a highlight image next to both sources for review
//!
//! ## Example
//!
//! ```rust,no_run
//! use visual_diff::{compare_files, ResultCode};
//! use std::path::Path;
//!
//! let result = compare_files(Path::new("compare.json"))?;
//! if result.code == ResultCode::Different {
//!     println!("{} pixels differ", result.differences);
//! }
//! # Ok::<(), visual_diff::CompareError>(())
//! ```

use std::path::Path;

pub mod color;
pub mod compare;
pub mod compose;
pub mod config;
pub mod constants;
pub mod error;
pub mod filters;
pub mod image_loader;
pub mod region;
pub mod runner;

pub use color::Color;
pub use compare::ResultCode;
pub use config::{
    Comparison, ComparisonOptions, Config, ConfigOptions, DiffSettings, ImageSource, PixelPass,
    Shift, Threshold,
};
pub use error::{CompareError, ErrorKind, Result};
pub use region::{Area, Rect};
pub use runner::{compare_images, CompareResult, Runner};

/// Run the comparison described by a JSON configuration file
///
/// This is the main entry point for file-based runs. It loads both images
/// named in the descriptor, compares them and writes the output image when
/// the result is within the configured output limit.
///
/// # Errors
///
/// Returns `CompareError` if:
/// - The descriptor cannot be read or is invalid
/// - Either image cannot be loaded
/// - The output image cannot be written
pub fn compare_files(config_path: &Path) -> Result<CompareResult> {
    Runner::from_json_file(config_path)?.run()
}
