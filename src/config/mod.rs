//! Configuration for a comparison run.
//!
//! Configuration is read in two steps. The option structs mirror the JSON
//! descriptor format and accept partial input; the `from_options`
//! factories validate them into immutable values that the engine uses.
//!
//! # Configuration Loading
//!
//! ```no_run
//! use visual_diff::Config;
//! use std::path::Path;
//!
//! // Load from file
//! let config = Config::from_json_file(Path::new("compare.json"))?;
//!
//! // Or from an inline descriptor
//! let config = Config::from_json_str(
//!     r#"{"imageA": {"image": "a.png"}, "imageB": {"image": "b.png"}}"#,
//! )?;
//! # Ok::<(), visual_diff::CompareError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`ImageOptions`]: image paths and optional crops
//! - [`ComparisonOptions`]: the list of pixel or structure passes
//! - [`ThresholdOptions`]: when a run counts as "different"
//! - [`OutputOptions`]: output image path, gating and layout

pub mod legacy;
pub mod output;
pub mod pass;
pub mod structure;
pub mod threshold;

pub use output::{Composition, CopySource, Output, OutputLimit, OutputOptions};
pub use pass::{
    BlockOut, BlockOutOptions, Comparison, ComparisonOptions, GammaOptions, PixelOptions,
    PixelPass, Shift, ShiftOptions,
};
pub use structure::{StructureOptions, StructurePass};
pub use threshold::{Threshold, ThresholdKind, ThresholdOptions};

use crate::color::value::ColorOptions;
use crate::color::Color;
use crate::constants::defaults;
use crate::region::Area;
use crate::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Image reference of a descriptor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// Path to the image file
    pub image: PathBuf,

    /// Region to cut out before comparing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Area>,
}

/// Complete run descriptor, as read from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOptions {
    pub debug: bool,
    pub verbose: bool,

    /// Compare rows on the rayon thread pool
    pub parallel: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_a: Option<ImageOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_b: Option<ImageOptions>,

    pub comparisons: Vec<ComparisonOptions>,
    pub threshold: ThresholdOptions,

    pub diff_color: ColorOptions,
    pub background_color: ColorOptions,
    pub ignore_color: ColorOptions,

    pub output: OutputOptions,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            debug: false,
            verbose: false,
            parallel: false,
            image_a: None,
            image_b: None,
            comparisons: vec![ComparisonOptions::Pixel(PixelOptions::default())],
            threshold: ThresholdOptions::default(),
            diff_color: Color::from_defaults(defaults::DIFF_COLOR).into(),
            background_color: Color::from_defaults(defaults::BACKGROUND_COLOR).into(),
            ignore_color: Color::from_defaults(defaults::IGNORE_COLOR).into(),
            output: OutputOptions::default(),
        }
    }
}

impl ConfigOptions {
    /// Default descriptor for a pair of image files
    pub fn for_images(image_a: impl Into<PathBuf>, image_b: impl Into<PathBuf>) -> Self {
        Self {
            image_a: Some(ImageOptions {
                image: image_a.into(),
                crop: None,
            }),
            image_b: Some(ImageOptions {
                image: image_b.into(),
                crop: None,
            }),
            ..Self::default()
        }
    }

    /// Save descriptor to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CompareError::config("Cannot serialize configuration", e))?;
        std::fs::write(path, json).map_err(|source| CompareError::ConfigWriteError {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

/// One of the two images of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    path: PathBuf,
    crop: Option<Area>,
}

impl ImageSource {
    pub fn new(path: impl Into<PathBuf>, crop: Option<Area>) -> Self {
        Self {
            path: path.into(),
            crop,
        }
    }

    fn from_options(options: Option<&ImageOptions>, which: &'static str) -> Result<Self> {
        match options {
            Some(o) if !o.image.as_os_str().is_empty() => Ok(Self::new(o.image.clone(), o.crop)),
            _ => Err(CompareError::MissingImage { which }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn crop(&self) -> Option<&Area> {
        self.crop.as_ref()
    }
}

/// Everything about a run except where the images come from
#[derive(Debug, Clone, PartialEq)]
pub struct DiffSettings {
    pub comparisons: Vec<Comparison>,
    pub threshold: Threshold,
    pub diff_color: Color,
    pub background_color: Color,
    pub ignore_color: Color,
    pub output: Output,
    pub parallel: bool,
    pub debug: bool,
    pub verbose: bool,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            comparisons: vec![Comparison::Pixel(PixelPass::default())],
            threshold: Threshold::default(),
            diff_color: Color::from_defaults(defaults::DIFF_COLOR),
            background_color: Color::from_defaults(defaults::BACKGROUND_COLOR),
            ignore_color: Color::from_defaults(defaults::IGNORE_COLOR),
            output: Output::default(),
            parallel: false,
            debug: false,
            verbose: false,
        }
    }
}

impl DiffSettings {
    /// Validate the non-image part of a descriptor
    pub fn from_options(options: &ConfigOptions) -> Result<Self> {
        let comparisons = options
            .comparisons
            .iter()
            .map(Comparison::from_options)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            comparisons,
            threshold: Threshold::from_options(&options.threshold)?,
            diff_color: Color::from_options(&options.diff_color, "diffColor")?,
            background_color: Color::from_options(&options.background_color, "backgroundColor")?,
            ignore_color: Color::from_options(&options.ignore_color, "ignoreColor")?,
            output: Output::from_options(&options.output),
            parallel: options.parallel,
            debug: options.debug,
            verbose: options.verbose,
        })
    }

    /// Settings with a single pixel pass
    pub fn with_pass(pass: PixelPass) -> Self {
        Self {
            comparisons: vec![Comparison::Pixel(pass)],
            ..Self::default()
        }
    }

    pub fn pixel_passes(&self) -> impl Iterator<Item = &PixelPass> {
        self.comparisons.iter().filter_map(|c| match c {
            Comparison::Pixel(pass) => Some(pass),
            Comparison::Structure(_) => None,
        })
    }

    pub fn to_options(&self) -> ConfigOptions {
        ConfigOptions {
            debug: self.debug,
            verbose: self.verbose,
            parallel: self.parallel,
            image_a: None,
            image_b: None,
            comparisons: self.comparisons.iter().map(Comparison::to_options).collect(),
            threshold: self.threshold.to_options(),
            diff_color: self.diff_color.into(),
            background_color: self.background_color.into(),
            ignore_color: self.ignore_color.into(),
            output: self.output.to_options(),
        }
    }
}

/// Validated run configuration: two image sources plus settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub image_a: ImageSource,
    pub image_b: ImageSource,
    pub settings: DiffSettings,
}

impl Config {
    pub fn new(image_a: ImageSource, image_b: ImageSource, settings: DiffSettings) -> Self {
        Self {
            image_a,
            image_b,
            settings,
        }
    }

    /// # Errors
    ///
    /// `MissingImage` if either image reference is absent or empty, and
    /// whatever the nested factories report for malformed values.
    pub fn from_options(options: &ConfigOptions) -> Result<Self> {
        let image_a = ImageSource::from_options(options.image_a.as_ref(), "imageA")?;
        let image_b = ImageSource::from_options(options.image_b.as_ref(), "imageB")?;
        Ok(Self::new(image_a, image_b, DiffSettings::from_options(options)?))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: ConfigOptions = serde_json::from_str(json)
            .map_err(|e| CompareError::config("Cannot parse configuration", e))?;
        Self::from_options(&options)
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompareError::config(format!("Cannot read {}", path.display()), e)
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_options(&self) -> ConfigOptions {
        let image = |source: &ImageSource| ImageOptions {
            image: source.path.clone(),
            crop: source.crop,
        };
        ConfigOptions {
            image_a: Some(image(&self.image_a)),
            image_b: Some(image(&self.image_b)),
            ..self.settings.to_options()
        }
    }
}
