//! Working color space for pixel comparison
//!
//! Each pixel pass compares colors in one of three spaces:
//! - raw RGBA, channels in [0, 255]
//! - normalized RGB with optional per-channel gamma in [0, 1], alpha raw
//! - CIELab (L, a, b) with the alpha channel passed through unchanged
//!
//! The distance between two colors is always the plain sum of squared
//! channel differences in whichever space the pass selected.

use crate::constants::perceptual::{
    CHANNEL_MAX, LAB_EPSILON, LAB_LINEAR_OFFSET, LAB_LINEAR_SLOPE, REFERENCE_WHITE_RGBA,
    RGB_TO_XYZ,
};
use crate::region::WorkingImage;
use crate::{CompareError, Result};
use image::{Rgba, RgbaImage};

/// Four channels of a color in the working space
pub type Channels = [f64; 4];

/// Squared Euclidean distance over all four channels
#[inline]
pub fn distance_squared(c1: &Channels, c2: &Channels) -> f64 {
    c1.iter()
        .zip(c2.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum()
}

/// Per-channel gamma. A channel without a value is only normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gamma {
    red: Option<f64>,
    green: Option<f64>,
    blue: Option<f64>,
}

impl Gamma {
    /// # Errors
    ///
    /// Returns `InvalidParameter` when a supplied value is not a positive,
    /// finite number.
    pub fn new(red: Option<f64>, green: Option<f64>, blue: Option<f64>) -> Result<Self> {
        for (name, value) in [("gamma.red", red), ("gamma.green", green), ("gamma.blue", blue)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(CompareError::parameter(name, v));
                }
            }
        }
        Ok(Self { red, green, blue })
    }

    /// Same gamma on all three color channels
    pub fn uniform(value: f64) -> Result<Self> {
        Self::new(Some(value), Some(value), Some(value))
    }

    pub fn red(&self) -> Option<f64> {
        self.red
    }

    pub fn green(&self) -> Option<f64> {
        self.green
    }

    pub fn blue(&self) -> Option<f64> {
        self.blue
    }

    fn correct(value: f64, gamma: Option<f64>) -> f64 {
        match gamma {
            Some(g) => value.powf(1.0 / g),
            None => value,
        }
    }
}

/// Scale 8-bit channels (including alpha) into [0, 1]
#[inline]
pub fn normalize(color: &Channels) -> Channels {
    color.map(|c| c / CHANNEL_MAX)
}

/// Normalize the color channels of a raw color and raise each to
/// `1 / gamma`. Alpha is passed through in [0, 255].
pub fn apply_gamma(color: &Channels, gamma: &Gamma) -> Channels {
    let [r, g, b, a] = *color;
    [
        Gamma::correct(r / CHANNEL_MAX, gamma.red),
        Gamma::correct(g / CHANNEL_MAX, gamma.green),
        Gamma::correct(b / CHANNEL_MAX, gamma.blue),
        a,
    ]
}

/// Linear RGB (normalized) to CIE XYZ; the fourth channel is carried over
pub fn rgb_to_xyz(color: &Channels) -> Channels {
    let [r, g, b, a] = *color;
    let m = &RGB_TO_XYZ;
    [
        m[0][0] * r + m[0][1] * g + m[0][2] * b,
        m[1][0] * r + m[1][1] * g + m[1][2] * b,
        m[2][0] * r + m[2][1] * g + m[2][2] * b,
        a,
    ]
}

#[inline]
fn lab_companding(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_LINEAR_SLOPE * t + LAB_LINEAR_OFFSET
    }
}

/// CIE XYZ to CIELab relative to `white`, the fourth channel is carried over
pub fn xyz_to_cie_lab(color: &Channels, white: &Channels) -> Channels {
    let fx = lab_companding(color[0] / white[0]);
    let fy = lab_companding(color[1] / white[1]);
    let fz = lab_companding(color[2] / white[2]);
    [
        116.0 * fy - 16.0,
        500.0 * (fx - fy),
        200.0 * (fy - fz),
        color[3],
    ]
}

/// Pixel transform selected by a comparison pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorModel {
    gamma: Option<Gamma>,
    perceptual: bool,
    reference_white: Channels,
}

impl Default for ColorModel {
    fn default() -> Self {
        Self::raw()
    }
}

impl ColorModel {
    /// Create a model; the reference white is computed once here
    pub fn new(gamma: Option<Gamma>, perceptual: bool) -> Self {
        Self {
            gamma,
            perceptual,
            reference_white: rgb_to_xyz(&REFERENCE_WHITE_RGBA),
        }
    }

    /// Raw RGBA comparison, no transform
    pub fn raw() -> Self {
        Self::new(None, false)
    }

    pub fn gamma(&self) -> Option<&Gamma> {
        self.gamma.as_ref()
    }

    pub fn is_perceptual(&self) -> bool {
        self.perceptual
    }

    /// XYZ of the reference white
    pub fn reference_white(&self) -> &Channels {
        &self.reference_white
    }

    /// Whether pixels leave the raw [0, 255] space
    pub fn is_transforming(&self) -> bool {
        self.gamma.is_some() || self.perceptual
    }

    /// Map one 8-bit RGBA pixel into the working space.
    ///
    /// The alpha channel stays in [0, 255] whenever the pixel is transformed.
    pub fn transform(&self, rgba: [u8; 4]) -> Channels {
        let raw = rgba.map(f64::from);
        if !self.is_transforming() {
            return raw;
        }

        let normalized = match &self.gamma {
            Some(gamma) => apply_gamma(&raw, gamma),
            None => normalize(&raw),
        };

        if self.perceptual {
            let lab = xyz_to_cie_lab(&rgb_to_xyz(&normalized), &self.reference_white);
            [lab[0], lab[1], lab[2], raw[3]]
        } else {
            normalized
        }
    }

    /// Working copy of a whole image
    pub fn working_copy(&self, image: &RgbaImage) -> WorkingImage {
        WorkingImage::from_fn(image.width(), image.height(), |x, y| {
            Rgba(self.transform(image.get_pixel(x, y).0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-4;

    fn assert_close(actual: &Channels, expected: &Channels) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < EPS, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_distance_squared() {
        let a = [10.0, 20.0, 30.0, 40.0];
        let b = [13.0, 24.0, 30.0, 40.0];
        assert_eq!(distance_squared(&a, &b), 25.0);
        assert_eq!(distance_squared(&a, &a), 0.0);
        assert_eq!(distance_squared(&a, &b), distance_squared(&b, &a));
    }

    #[test]
    fn test_rgb_to_xyz_fixture() {
        let rgb = [92.0 / 255.0, 1.0, 162.0 / 255.0, 1.0];
        let xyz = rgb_to_xyz(&rgb);
        assert_close(
            &xyz,
            &[0.6144431682352941, 0.8834245847058824, 0.6390158682352941, 1.0],
        );
    }

    #[test]
    fn test_xyz_to_lab_fixture() {
        let model = ColorModel::new(None, true);
        let xyz = [0.6144431682352941, 0.8834245847058824, 0.6390158682352941, 1.0];
        let lab = xyz_to_cie_lab(&xyz, model.reference_white());
        assert_close(
            &lab,
            &[95.30495102757038, -54.68933740774734, 19.63870174748623, 1.0],
        );
    }

    #[test]
    fn test_perceptual_transform_passes_alpha() {
        let model = ColorModel::new(None, true);
        let lab = model.transform([92, 255, 162, 77]);
        assert_close(
            &lab,
            &[95.30495102757038, -54.68933740774734, 19.63870174748623, 77.0],
        );
    }

    #[test]
    fn test_reference_white_is_lightness_100() {
        let model = ColorModel::new(None, true);
        let lab = model.transform([255, 255, 255, 255]);
        assert!((lab[0] - 100.0).abs() < EPS);
        assert!(lab[1].abs() < EPS);
        assert!(lab[2].abs() < EPS);
    }

    #[test]
    fn test_linear_segment_for_black() {
        let model = ColorModel::new(None, true);
        let lab = model.transform([0, 0, 0, 255]);
        // f(0) = 4/29, so L = 116 * 4/29 - 16 = 0
        assert!(lab[0].abs() < EPS);
    }

    #[test]
    fn test_raw_model_is_identity() {
        let model = ColorModel::raw();
        assert!(!model.is_transforming());
        assert_eq!(model.transform([1, 2, 3, 4]), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_apply_gamma() {
        let gamma = Gamma::new(Some(2.0), None, Some(1.0)).unwrap();
        let out = apply_gamma(&[255.0 * 0.25, 51.0, 255.0, 255.0], &gamma);
        assert_close(&out, &[0.5, 0.2, 1.0, 255.0]);
    }

    #[test]
    fn test_gamma_model_normalizes() {
        let model = ColorModel::new(Some(Gamma::uniform(1.0).unwrap()), false);
        assert_close(&model.transform([255, 0, 51, 128]), &[1.0, 0.0, 0.2, 128.0]);
    }

    #[test]
    fn test_gamma_model_keeps_alpha_scale() {
        let model = ColorModel::new(Some(Gamma::uniform(2.2).unwrap()), false);
        let clear = model.transform([100, 100, 100, 0]);
        let opaque = model.transform([100, 100, 100, 255]);
        assert_eq!(distance_squared(&clear, &opaque), 255.0 * 255.0);
    }

    #[test]
    fn test_gamma_rejects_non_positive() {
        assert!(Gamma::new(Some(0.0), None, None).is_err());
        assert!(Gamma::new(None, Some(-2.2), None).is_err());
        assert!(Gamma::new(None, None, Some(f64::NAN)).is_err());
        assert!(Gamma::uniform(2.2).is_ok());
    }

    #[test]
    fn test_working_copy() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([1, 2, 3, 4]));
        let copy = ColorModel::raw().working_copy(&image);
        assert_eq!(copy.dimensions(), (2, 1));
        assert_eq!(copy.get_pixel(1, 0).0, [1.0, 2.0, 3.0, 4.0]);
    }
}
