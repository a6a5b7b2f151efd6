//! Flat single-level options of the first-generation interface
//!
//! Older harnesses pass a flat object (`imageAPath`, `delta`, `hShift`,
//! `outputMaskRed`, ...). [`LegacyOptions::into_config_options`] maps it
//! onto the nested descriptor with one pixel pass.

use super::output::{Composition, CopySource, OutputLimit, OutputOptions};
use super::pass::{BlockOutOptions, ComparisonOptions, GammaOptions, PixelOptions, ShiftOptions};
use super::threshold::{ThresholdKind, ThresholdOptions};
use super::{ConfigOptions, ImageOptions};
use crate::color::value::{ChannelOptions, ColorOptions};
use crate::constants::defaults;
use crate::region::Area;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single value or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyOptions {
    pub image_a_path: Option<PathBuf>,
    pub image_b_path: Option<PathBuf>,
    pub image_output_path: Option<PathBuf>,
    pub image_output_limit: Option<OutputLimit>,

    pub threshold_type: Option<ThresholdKind>,
    pub threshold: Option<f64>,
    pub delta: Option<f64>,

    pub output_mask_red: Option<f64>,
    pub output_mask_green: Option<f64>,
    pub output_mask_blue: Option<f64>,
    pub output_mask_alpha: Option<f64>,
    pub output_mask_opacity: Option<f64>,

    pub output_shift_red: Option<f64>,
    pub output_shift_green: Option<f64>,
    pub output_shift_blue: Option<f64>,
    pub output_shift_alpha: Option<f64>,
    pub output_shift_opacity: Option<f64>,

    pub output_background_red: Option<f64>,
    pub output_background_green: Option<f64>,
    pub output_background_blue: Option<f64>,
    pub output_background_alpha: Option<f64>,
    pub output_background_opacity: Option<f64>,

    pub block_out: OneOrMany<Area>,
    pub block_out_red: Option<f64>,
    pub block_out_green: Option<f64>,
    pub block_out_blue: Option<f64>,
    pub block_out_alpha: Option<f64>,
    pub block_out_opacity: Option<f64>,

    pub h_shift: Option<i64>,
    pub v_shift: Option<i64>,
    pub hide_shift: bool,

    pub gamma: Option<f64>,
    #[serde(rename = "gammaR")]
    pub gamma_r: Option<f64>,
    #[serde(rename = "gammaG")]
    pub gamma_g: Option<f64>,
    #[serde(rename = "gammaB")]
    pub gamma_b: Option<f64>,
    pub perceptual: bool,
    pub filter: Vec<String>,

    pub crop_image_a: Option<Area>,
    pub crop_image_b: Option<Area>,

    pub composition: Option<bool>,
    pub compose_left_to_right: bool,
    pub compose_top_to_bottom: bool,
    pub copy_image_b_to_output: bool,

    pub debug: bool,
    pub verbose: bool,
}

fn channels(
    red: Option<f64>,
    green: Option<f64>,
    blue: Option<f64>,
    alpha: Option<f64>,
    opacity: Option<f64>,
    fallback: (u8, u8, u8, u8, f64),
) -> ColorOptions {
    ColorOptions::Channels(ChannelOptions {
        red: Some(red.unwrap_or(f64::from(fallback.0))),
        green: Some(green.unwrap_or(f64::from(fallback.1))),
        blue: Some(blue.unwrap_or(f64::from(fallback.2))),
        alpha: Some(alpha.unwrap_or(f64::from(fallback.3))),
        opacity: Some(opacity.unwrap_or(fallback.4)),
    })
}

impl LegacyOptions {
    /// Nested descriptor equivalent to these flat options.
    ///
    /// Missing images stay missing so that `Config::from_options` reports
    /// them.
    pub fn into_config_options(self) -> ConfigOptions {
        let block_out_color = channels(
            self.block_out_red,
            self.block_out_green,
            self.block_out_blue,
            self.block_out_alpha,
            self.block_out_opacity,
            defaults::BLOCK_OUT_COLOR,
        );
        let block_outs = self
            .block_out
            .into_vec()
            .into_iter()
            .map(|area| BlockOutOptions {
                visible: true,
                area,
                color: Some(block_out_color.clone()),
            })
            .collect();

        let gamma = GammaOptions {
            red: self.gamma.or(self.gamma_r),
            green: self.gamma.or(self.gamma_g),
            blue: self.gamma.or(self.gamma_b),
        };
        let has_gamma = gamma.red.is_some() || gamma.green.is_some() || gamma.blue.is_some();

        let comparison = PixelOptions {
            color_delta: self.delta.unwrap_or(defaults::COLOR_DELTA),
            gamma: has_gamma.then_some(gamma),
            perceptual: self.perceptual,
            filters: self.filter,
            shift: ShiftOptions {
                active: !self.hide_shift,
                horizontal: self
                    .h_shift
                    .unwrap_or(i64::from(defaults::SHIFT_HORIZONTAL)),
                vertical: self.v_shift.unwrap_or(i64::from(defaults::SHIFT_VERTICAL)),
            },
            block_outs,
            ..PixelOptions::default()
        };

        let composition = if self.composition == Some(false) {
            Composition::Off
        } else if self.compose_left_to_right {
            Composition::LeftToRight
        } else if self.compose_top_to_bottom {
            Composition::TopToBottom
        } else {
            Composition::Auto
        };

        let image = |path: Option<PathBuf>, crop: Option<Area>| {
            path.map(|image| ImageOptions { image, crop })
        };

        ConfigOptions {
            debug: self.debug,
            verbose: self.verbose || self.debug,
            parallel: false,
            image_a: image(self.image_a_path, self.crop_image_a),
            image_b: image(self.image_b_path, self.crop_image_b),
            comparisons: vec![ComparisonOptions::Pixel(comparison)],
            threshold: ThresholdOptions {
                kind: self.threshold_type.unwrap_or_default(),
                value: self.threshold.unwrap_or(defaults::THRESHOLD_PIXELS),
            },
            diff_color: channels(
                self.output_mask_red,
                self.output_mask_green,
                self.output_mask_blue,
                self.output_mask_alpha,
                self.output_mask_opacity,
                defaults::DIFF_COLOR,
            ),
            background_color: channels(
                self.output_background_red,
                self.output_background_green,
                self.output_background_blue,
                self.output_background_alpha,
                self.output_background_opacity,
                defaults::BACKGROUND_COLOR,
            ),
            ignore_color: channels(
                self.output_shift_red,
                self.output_shift_green,
                self.output_shift_blue,
                self.output_shift_alpha,
                self.output_shift_opacity,
                defaults::IGNORE_COLOR,
            ),
            output: OutputOptions {
                image_path: self.image_output_path,
                limit: self.image_output_limit.unwrap_or_default(),
                composition,
                copy_image: if self.copy_image_b_to_output {
                    CopySource::ImageB
                } else {
                    CopySource::ImageA
                },
            },
        }
    }
}

impl From<LegacyOptions> for ConfigOptions {
    fn from(options: LegacyOptions) -> Self {
        options.into_config_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Comparison, Config};
    use crate::CompareError;

    fn legacy(json: &str) -> ConfigOptions {
        serde_json::from_str::<LegacyOptions>(json)
            .unwrap()
            .into_config_options()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_options(&legacy(
            r#"{"imageAPath": "a.png", "imageBPath": "b.png"}"#,
        ))
        .unwrap();
        let settings = &config.settings;

        let pass = match &settings.comparisons[0] {
            Comparison::Pixel(pass) => pass,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(pass.color_delta(), 20.0);
        assert!(pass.shift().is_searching());
        assert_eq!(pass.shift().vertical(), 2);
        assert!(pass.model().gamma().is_none());

        assert_eq!(settings.threshold.value(), 500.0);
        assert_eq!(settings.diff_color.channels(), [255, 0, 0, 255]);
        assert_eq!(settings.diff_color.opacity(), 0.7);
        assert_eq!(settings.background_color.opacity(), 0.6);
        assert_eq!(settings.ignore_color.channels(), [200, 100, 0, 255]);
        assert_eq!(settings.output.limit(), OutputLimit::All);
        assert_eq!(settings.output.composition(), Composition::Auto);
        assert_eq!(settings.output.copy_source(), CopySource::ImageA);
    }

    #[test]
    fn test_flat_values_map() {
        let options = legacy(
            r#"{
                "imageAPath": "a.png",
                "imageBPath": "b.png",
                "delta": 35,
                "thresholdType": "percent",
                "threshold": 0.05,
                "hideShift": true,
                "gamma": 2.2,
                "perceptual": true,
                "filter": ["blur"],
                "blockOut": {"x": 1, "y": 2, "width": 3, "height": 4},
                "blockOutRed": 9,
                "cropImageB": {"x": 10, "y": 20},
                "composeTopToBottom": true,
                "copyImageBToOutput": true,
                "imageOutputPath": "out.png",
                "imageOutputLimit": "different"
            }"#,
        );

        let pixel = match &options.comparisons[0] {
            ComparisonOptions::Pixel(p) => p,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(pixel.color_delta, 35.0);
        assert!(!pixel.shift.active);
        assert_eq!(pixel.gamma.and_then(|g| g.blue), Some(2.2));
        assert_eq!(pixel.block_outs.len(), 1);
        assert!(pixel.block_outs[0].visible);
        assert_eq!(pixel.block_outs[0].area, Area::new(1, 2, 3, 4));

        assert_eq!(options.threshold.kind, ThresholdKind::Percent);
        assert_eq!(options.image_b.as_ref().and_then(|i| i.crop).and_then(|c| c.top), Some(20));
        assert_eq!(options.output.composition, Composition::TopToBottom);
        assert_eq!(options.output.copy_image, CopySource::ImageB);
        assert_eq!(options.output.limit, OutputLimit::Different);

        let config = Config::from_options(&options).unwrap();
        assert!(config.settings.output.image_path().is_some());
    }

    #[test]
    fn test_block_out_list() {
        let options = legacy(r#"{"blockOut": [{"x": 1}, {"y": 2}]}"#);
        match &options.comparisons[0] {
            ComparisonOptions::Pixel(p) => assert_eq!(p.block_outs.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_image_reported() {
        let err = Config::from_options(&legacy(r#"{"imageBPath": "b.png"}"#)).unwrap_err();
        assert!(matches!(err, CompareError::MissingImage { which: "imageA" }));
    }

    #[test]
    fn test_composition_off() {
        let options = legacy(r#"{"composition": false, "composeLeftToRight": true}"#);
        assert_eq!(options.output.composition, Composition::Off);
    }
}
