//! Comparison runner
//!
//! Drives a whole run: load and crop both sources, clip them to a common
//! frame, run every pixel pass into one flag field, classify the counts
//! and build the output image.
//!
//! # Example
//!
//! ```rust,no_run
//! use visual_diff::{Config, Runner};
//! use std::path::Path;
//!
//! let config = Config::from_json_file(Path::new("compare.json"))?;
//! let result = Runner::new(config).run()?;
//! println!("{}: {} differences", result.code, result.differences);
//! # Ok::<(), visual_diff::CompareError>(())
//! ```

use crate::compare::{classify, FlagField, PixelComparator, ResultCode};
use crate::compose::{compose, paint_highlight, HighlightColors, PassOverlay};
use crate::config::{Comparison, Config, CopySource, DiffSettings, ImageSource, PixelPass};
use crate::filters::apply_filters;
use crate::image_loader::{ensure_not_empty, load_image, save_image};
use crate::region::{clip, common_size, fill_rect, Area, Rect};
use crate::Result;
use image::RgbaImage;
use log::{debug, info};
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;

/// Outcome of one comparison run
#[derive(Debug, Clone, PartialEq)]
pub struct CompareResult {
    pub code: ResultCode,
    /// Pixels flagged as real differences
    pub differences: u64,
    /// Pixels tolerated as shifts
    pub shifts: u64,
    /// Pixel count of the common frame
    pub dimension: u64,
    pub width: u32,
    pub height: u32,
    /// Composed output image
    pub output_image: Option<RgbaImage>,
    pub highlight_image: Option<RgbaImage>,
    /// Whether the output image was written to disk
    pub exported: bool,
}

/// Serializable part of a [`CompareResult`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub code: ResultCode,
    pub passed: bool,
    pub differences: u64,
    pub shifts: u64,
    pub dimension: u64,
    pub width: u32,
    pub height: u32,
    pub exported: bool,
}

impl CompareResult {
    pub fn has_passed(&self) -> bool {
        self.code.has_passed()
    }

    /// Share of the frame that differs, 0.0 for an empty frame
    pub fn difference_ratio(&self) -> f64 {
        if self.dimension == 0 {
            0.0
        } else {
            self.differences as f64 / self.dimension as f64
        }
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            code: self.code,
            passed: self.has_passed(),
            differences: self.differences,
            shifts: self.shifts,
            dimension: self.dimension,
            width: self.width,
            height: self.height,
            exported: self.exported,
        }
    }
}

/// File-based comparison runner
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Ok(Self::new(Config::from_json_file(path)?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load both images, apply their crops and compare them.
    ///
    /// # Errors
    ///
    /// Any load or decode failure aborts the run; no partial result is
    /// returned.
    pub fn run(&self) -> Result<CompareResult> {
        let image_a = load_source(&self.config.image_a)?;
        let image_b = load_source(&self.config.image_b)?;
        compare_images(&image_a, &image_b, &self.config.settings)
    }
}

fn load_source(source: &ImageSource) -> Result<RgbaImage> {
    let image = load_image(source.path())?;
    debug!(
        "Loaded {} ({}x{})",
        source.path().display(),
        image.width(),
        image.height()
    );

    match source.crop() {
        Some(area) => {
            let rect = area.normalize(image.width(), image.height());
            debug!("Cropping {} to {:?}", source.path().display(), rect);
            Ok(clip(&image, rect))
        }
        None => Ok(image),
    }
}

/// Clip `image` to `width` x `height` at the origin, borrowing when it
/// already has that size
fn clip_to(image: &RgbaImage, width: u32, height: u32) -> Cow<'_, RgbaImage> {
    if image.dimensions() == (width, height) {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(clip(image, Rect::full(width, height)))
    }
}

/// Compare two decoded, already cropped images.
///
/// Both images are clipped to their common size anchored at the origin.
/// Passes run in configuration order and OR their flags into one field;
/// structure passes are not evaluated here.
///
/// # Errors
///
/// `MalformedPixelData` if either image has no pixels, and `ImageWriteError`
/// if the output image cannot be written.
pub fn compare_images(
    image_a: &RgbaImage,
    image_b: &RgbaImage,
    settings: &DiffSettings,
) -> Result<CompareResult> {
    ensure_not_empty(image_a, "image A")?;
    ensure_not_empty(image_b, "image B")?;

    let (width, height) = common_size(image_a, image_b);
    if image_a.dimensions() != image_b.dimensions() {
        info!(
            "Image sizes differ ({}x{} vs {}x{}), comparing the common {}x{} frame",
            image_a.width(),
            image_a.height(),
            image_b.width(),
            image_b.height(),
            width,
            height
        );
    }
    let frame_a = clip_to(image_a, width, height);
    let frame_b = clip_to(image_b, width, height);

    let mut field = FlagField::new(width, height);
    let mut overlays = Vec::new();

    for (index, comparison) in settings.comparisons.iter().enumerate() {
        match comparison {
            Comparison::Pixel(pass) => {
                let overlay = run_pixel_pass(index, pass, &frame_a, &frame_b, &mut field, settings)?;
                overlays.push(overlay);
            }
            Comparison::Structure(pass) => {
                info!(
                    "Pass {}: structure comparison on '{}' is left to the structural mode",
                    index,
                    pass.selector()
                );
            }
        }
    }

    let differences = field.differences();
    let shifts = field.shifts();
    let dimension = u64::from(width) * u64::from(height);
    let code = classify(differences, dimension, &settings.threshold);
    info!(
        "Result {}: {} differences, {} shifts in {} pixels",
        code, differences, shifts, dimension
    );

    let mut highlight = match settings.output.copy_source() {
        CopySource::ImageA => image_a.clone(),
        CopySource::ImageB => image_b.clone(),
        CopySource::None => RgbaImage::new(width, height),
    };
    let colors = HighlightColors {
        diff: settings.diff_color,
        background: settings.background_color,
        ignore: settings.ignore_color,
    };
    paint_highlight(&mut highlight, &field, &colors, &overlays);

    let output = compose(image_a, &highlight, image_b, settings.output.composition());

    let mut exported = false;
    if let Some(path) = settings.output.image_path() {
        if settings.output.should_export(code) {
            save_image(&output, path)?;
            info!("Wrote output image to {}", path.display());
            exported = true;
        } else {
            debug!(
                "Result {} is outside the {:?} output limit, not writing {}",
                code,
                settings.output.limit(),
                path.display()
            );
        }
    }

    Ok(CompareResult {
        code,
        differences,
        shifts,
        dimension,
        width,
        height,
        output_image: Some(output),
        highlight_image: Some(highlight),
        exported,
    })
}

/// Run one pixel pass over the common frame and OR its flags into `field`
fn run_pixel_pass(
    index: usize,
    pass: &PixelPass,
    frame_a: &RgbaImage,
    frame_b: &RgbaImage,
    field: &mut FlagField,
    settings: &DiffSettings,
) -> Result<PassOverlay> {
    let (width, height) = frame_a.dimensions();
    let full = Area::full();
    let area_a = pass.area_a().unwrap_or(&full).normalize(width, height);
    let area_b = pass.area_b().unwrap_or(&full).normalize(width, height);

    let region_w = area_a.width.min(area_b.width);
    let region_h = area_a.height.min(area_b.height);
    let region_a = Rect::new(area_a.left, area_a.top, region_w, region_h);
    let region_b = Rect::new(area_b.left, area_b.top, region_w, region_h);

    let crop_a = clip(frame_a, region_a);
    let crop_b = clip(frame_b, region_b);
    let crop_a = apply_filters(&crop_a, pass.filters()).unwrap_or(crop_a);
    let crop_b = apply_filters(&crop_b, pass.filters()).unwrap_or(crop_b);

    let model = pass.model();
    let mut working_a = model.working_copy(&crop_a);
    let mut working_b = model.working_copy(&crop_b);

    let mut visible = Vec::new();
    for block_out in pass.block_outs() {
        let rect = block_out.area().normalize(region_w, region_h);
        let color = block_out.color();
        let channels = model.transform(color.channels());
        fill_rect(&mut working_a, rect, &channels, color.opacity());
        fill_rect(&mut working_b, rect, &channels, color.opacity());

        if block_out.is_visible() {
            visible.push((rect.offset(region_a.left, region_a.top), *color));
        }
    }

    let counts = PixelComparator::new(
        &working_a,
        &working_b,
        pass.color_delta_squared(),
        pass.shift(),
    )
    .compare_into(field, (region_a.left, region_a.top), settings.parallel)?;

    if settings.verbose || settings.debug {
        info!(
            "Pass {}: {:?} vs {:?}, {} differences, {} shifts",
            index, region_a, region_b, counts.differences, counts.shifts
        );
    } else {
        debug!(
            "Pass {}: {} differences, {} shifts",
            index, counts.differences, counts.shifts
        );
    }

    Ok(PassOverlay {
        region: region_a,
        diff: pass.diff_color().copied(),
        background: pass.background_color().copied(),
        block_outs: visible,
    })
}
