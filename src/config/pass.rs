//! Comparison passes
//!
//! A run is a list of passes over the same image pair. Pixel passes carry
//! everything the pixel comparator needs; structure passes are parsed and
//! kept so configurations round-trip, but are evaluated elsewhere.

use super::structure::{StructureOptions, StructurePass};
use crate::color::value::ColorOptions;
use crate::color::{Color, ColorModel, Gamma};
use crate::constants::defaults;
use crate::filters::{self, Filter};
use crate::region::Area;
use crate::{CompareError, Result};
use serde::{Deserialize, Serialize};

/// Shift descriptor. Missing values fall back to an active 2x2 search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftOptions {
    pub active: bool,
    pub horizontal: i64,
    pub vertical: i64,
}

impl Default for ShiftOptions {
    fn default() -> Self {
        Self {
            active: true,
            horizontal: i64::from(defaults::SHIFT_HORIZONTAL),
            vertical: i64::from(defaults::SHIFT_VERTICAL),
        }
    }
}

/// How far a pixel may have moved and still count as unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    active: bool,
    horizontal: u32,
    vertical: u32,
}

impl Default for Shift {
    fn default() -> Self {
        Self::new(defaults::SHIFT_HORIZONTAL, defaults::SHIFT_VERTICAL)
    }
}

impl Shift {
    /// Active shift search with the given radii
    pub const fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            active: true,
            horizontal,
            vertical,
        }
    }

    pub const fn disabled() -> Self {
        Self {
            active: false,
            horizontal: 0,
            vertical: 0,
        }
    }

    pub fn from_options(options: &ShiftOptions) -> Result<Self> {
        let radius = |name: &str, value: i64| {
            u32::try_from(value).map_err(|_| CompareError::parameter(format!("shift.{name}"), value))
        };
        Ok(Self {
            active: options.active,
            horizontal: radius("horizontal", options.horizontal)?,
            vertical: radius("vertical", options.vertical)?,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn horizontal(&self) -> u32 {
        self.horizontal
    }

    pub fn vertical(&self) -> u32 {
        self.vertical
    }

    /// Active with a non-zero radius in at least one direction
    pub fn is_searching(&self) -> bool {
        self.active && (self.horizontal > 0 || self.vertical > 0)
    }

    pub fn to_options(&self) -> ShiftOptions {
        ShiftOptions {
            active: self.active,
            horizontal: i64::from(self.horizontal),
            vertical: i64::from(self.vertical),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockOutOptions {
    pub visible: bool,
    pub area: Area,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorOptions>,
}

/// Region painted flat in both images before they are compared
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockOut {
    area: Area,
    color: Color,
    visible: bool,
}

impl BlockOut {
    pub fn new(area: Area, color: Color, visible: bool) -> Self {
        Self {
            area,
            color,
            visible,
        }
    }

    pub fn from_options(options: &BlockOutOptions) -> Result<Self> {
        let color = match &options.color {
            Some(color) => Color::from_options(color, "blockOut.color")?,
            None => Color::from_defaults(defaults::BLOCK_OUT_COLOR),
        };
        Ok(Self::new(options.area, color, options.visible))
    }

    pub fn area(&self) -> &Area {
        &self.area
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    /// Also paint this block-out on the highlight image
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn to_options(&self) -> BlockOutOptions {
        BlockOutOptions {
            visible: self.visible,
            area: self.area,
            color: Some(self.color.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<f64>,
}

/// Pixel pass descriptor (`"type": "pixel"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PixelOptions {
    pub color_delta: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<GammaOptions>,
    pub perceptual: bool,
    pub filters: Vec<String>,
    pub shift: ShiftOptions,
    pub block_outs: Vec<BlockOutOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_image_a: Option<Area>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_image_b: Option<Area>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_color: Option<ColorOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorOptions>,
}

impl Default for PixelOptions {
    fn default() -> Self {
        Self {
            color_delta: defaults::COLOR_DELTA,
            gamma: None,
            perceptual: false,
            filters: Vec::new(),
            shift: ShiftOptions::default(),
            block_outs: Vec::new(),
            area_image_a: None,
            area_image_b: None,
            diff_color: None,
            background_color: None,
        }
    }
}

/// One set of pixel rules applied over one region pair
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPass {
    color_delta: f64,
    color_delta_squared: f64,
    model: ColorModel,
    filters: Vec<Filter>,
    shift: Shift,
    block_outs: Vec<BlockOut>,
    area_a: Option<Area>,
    area_b: Option<Area>,
    diff_color: Option<Color>,
    background_color: Option<Color>,
}

impl Default for PixelPass {
    fn default() -> Self {
        Self::new(defaults::COLOR_DELTA, Shift::default())
    }
}

impl PixelPass {
    /// Raw RGBA pass over the whole frame
    pub fn new(color_delta: f64, shift: Shift) -> Self {
        Self {
            color_delta,
            color_delta_squared: color_delta * color_delta,
            model: ColorModel::raw(),
            filters: Vec::new(),
            shift,
            block_outs: Vec::new(),
            area_a: None,
            area_b: None,
            diff_color: None,
            background_color: None,
        }
    }

    pub fn from_options(options: &PixelOptions) -> Result<Self> {
        if !options.color_delta.is_finite() || options.color_delta < 0.0 {
            return Err(CompareError::parameter("colorDelta", options.color_delta));
        }

        let gamma = options
            .gamma
            .map(|g| Gamma::new(g.red, g.green, g.blue))
            .transpose()?;

        let block_outs = options
            .block_outs
            .iter()
            .map(BlockOut::from_options)
            .collect::<Result<Vec<_>>>()?;

        let color = |value: &Option<ColorOptions>, name: &str| {
            value
                .as_ref()
                .map(|c| Color::from_options(c, name))
                .transpose()
        };

        Ok(Self {
            color_delta: options.color_delta,
            color_delta_squared: options.color_delta * options.color_delta,
            model: ColorModel::new(gamma, options.perceptual),
            filters: filters::parse_filters(&options.filters)?,
            shift: Shift::from_options(&options.shift)?,
            block_outs,
            area_a: options.area_image_a,
            area_b: options.area_image_b,
            diff_color: color(&options.diff_color, "diffColor")?,
            background_color: color(&options.background_color, "backgroundColor")?,
        })
    }

    pub fn with_model(mut self, model: ColorModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_block_out(mut self, block_out: BlockOut) -> Self {
        self.block_outs.push(block_out);
        self
    }

    pub fn with_areas(mut self, area_a: Option<Area>, area_b: Option<Area>) -> Self {
        self.area_a = area_a;
        self.area_b = area_b;
        self
    }

    pub fn with_colors(mut self, diff: Option<Color>, background: Option<Color>) -> Self {
        self.diff_color = diff;
        self.background_color = background;
        self
    }

    pub fn color_delta(&self) -> f64 {
        self.color_delta
    }

    /// Squared delta, compared against squared distances
    pub fn color_delta_squared(&self) -> f64 {
        self.color_delta_squared
    }

    pub fn model(&self) -> &ColorModel {
        &self.model
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn shift(&self) -> &Shift {
        &self.shift
    }

    pub fn block_outs(&self) -> &[BlockOut] {
        &self.block_outs
    }

    pub fn area_a(&self) -> Option<&Area> {
        self.area_a.as_ref()
    }

    pub fn area_b(&self) -> Option<&Area> {
        self.area_b.as_ref()
    }

    pub fn diff_color(&self) -> Option<&Color> {
        self.diff_color.as_ref()
    }

    pub fn background_color(&self) -> Option<&Color> {
        self.background_color.as_ref()
    }

    pub fn to_options(&self) -> PixelOptions {
        PixelOptions {
            color_delta: self.color_delta,
            gamma: self.model.gamma().map(|g| GammaOptions {
                red: g.red(),
                green: g.green(),
                blue: g.blue(),
            }),
            perceptual: self.model.is_perceptual(),
            filters: self.filters.iter().map(ToString::to_string).collect(),
            shift: self.shift.to_options(),
            block_outs: self.block_outs.iter().map(BlockOut::to_options).collect(),
            area_image_a: self.area_a,
            area_image_b: self.area_b,
            diff_color: self.diff_color.map(Into::into),
            background_color: self.background_color.map(Into::into),
        }
    }
}

/// Comparison pass descriptor, tagged by `"type"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComparisonOptions {
    Pixel(PixelOptions),
    Structure(StructureOptions),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Pixel(PixelPass),
    Structure(StructurePass),
}

impl Comparison {
    pub fn from_options(options: &ComparisonOptions) -> Result<Self> {
        Ok(match options {
            ComparisonOptions::Pixel(pixel) => Comparison::Pixel(PixelPass::from_options(pixel)?),
            ComparisonOptions::Structure(structure) => {
                Comparison::Structure(StructurePass::from_options(structure)?)
            }
        })
    }

    pub fn to_options(&self) -> ComparisonOptions {
        match self {
            Comparison::Pixel(pass) => ComparisonOptions::Pixel(pass.to_options()),
            Comparison::Structure(pass) => ComparisonOptions::Structure(pass.to_options()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(json: &str) -> Result<PixelPass> {
        let options: ComparisonOptions = serde_json::from_str(json).unwrap();
        match Comparison::from_options(&options)? {
            Comparison::Pixel(pass) => Ok(pass),
            other => panic!("expected a pixel pass, got {:?}", other),
        }
    }

    #[test]
    fn test_pixel_defaults() {
        let pass = pixel(r#"{"type": "pixel"}"#).unwrap();
        assert_eq!(pass.color_delta(), 20.0);
        assert_eq!(pass.color_delta_squared(), 400.0);
        assert!(pass.shift().is_searching());
        assert_eq!(pass.shift().horizontal(), 2);
        assert!(!pass.model().is_transforming());
        assert!(pass.block_outs().is_empty());
        assert!(pass.area_a().is_none());
    }

    #[test]
    fn test_pixel_full_descriptor() {
        let pass = pixel(
            r##"{
                "type": "pixel",
                "colorDelta": 5,
                "gamma": {"red": 2.2, "green": 2.2, "blue": 2.2},
                "perceptual": true,
                "filters": ["blur", "grayScale"],
                "shift": {"active": false, "horizontal": 1, "vertical": 0},
                "blockOuts": [{"visible": true, "area": {"x": 1, "y": 2, "width": 3, "height": 4}}],
                "areaImageA": {"left": 10},
                "diffColor": "#00ff00"
            }"##,
        )
        .unwrap();

        assert_eq!(pass.color_delta_squared(), 25.0);
        assert!(pass.model().is_perceptual());
        assert_eq!(pass.model().gamma().and_then(|g| g.red()), Some(2.2));
        assert_eq!(pass.filters(), &[Filter::Blur, Filter::Grayscale]);
        assert!(!pass.shift().is_searching());

        let block_out = &pass.block_outs()[0];
        assert!(block_out.is_visible());
        assert_eq!(*block_out.area(), Area::new(1, 2, 3, 4));
        assert_eq!(block_out.color().channels(), [0, 0, 0, 255]);

        assert_eq!(pass.area_a().and_then(|a| a.left), Some(10));
        assert_eq!(pass.diff_color().map(|c| c.channels()), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_pixel_rejects_bad_values() {
        assert!(matches!(
            pixel(r#"{"type": "pixel", "colorDelta": -1}"#),
            Err(CompareError::InvalidParameter { .. })
        ));
        assert!(matches!(
            pixel(r#"{"type": "pixel", "filters": ["emboss"]}"#),
            Err(CompareError::UnknownFilter { .. })
        ));
        assert!(matches!(
            pixel(r#"{"type": "pixel", "shift": {"horizontal": -2}}"#),
            Err(CompareError::InvalidParameter { .. })
        ));
        assert!(matches!(
            pixel(r#"{"type": "pixel", "gamma": {"red": 0}}"#),
            Err(CompareError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_unknown_type_tag() {
        assert!(serde_json::from_str::<ComparisonOptions>(r#"{"type": "histogram"}"#).is_err());
    }

    #[test]
    fn test_shift_search_activity() {
        assert!(Shift::new(1, 0).is_searching());
        assert!(Shift::new(0, 1).is_searching());
        assert!(!Shift::new(0, 0).is_searching());
        assert!(!Shift::disabled().is_searching());

        let options = ShiftOptions {
            active: false,
            horizontal: 3,
            vertical: 3,
        };
        assert!(!Shift::from_options(&options).unwrap().is_searching());
    }

    #[test]
    fn test_options_survive_conversion() {
        let pass = pixel(r#"{"type": "pixel", "colorDelta": 7, "filters": ["sepia"]}"#).unwrap();
        let again = PixelPass::from_options(&pass.to_options()).unwrap();
        assert_eq!(again, pass);
    }
}
