//! Pre-comparison image filters
//!
//! Filters run on the 8-bit copy of each pass region, before any color
//! transform. Names are matched case-insensitively, so both `grayScale`
//! and `grayscale` select [`Filter::Grayscale`].

use crate::{CompareError, Result};
use image::{imageops, Rgba, RgbaImage};
use std::fmt;
use std::str::FromStr;

/// Sigma of the gaussian blur filter
const GAUSSIAN_SIGMA: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// 3x3 box blur, softens sub-pixel rendering noise
    Blur,
    GaussianBlur,
    /// Mean of R, G and B
    Grayscale,
    /// (max + min) / 2 of R, G and B
    Lightness,
    /// Rec. 709 luma
    Luma,
    /// Classic luminosity weights (0.21, 0.72, 0.07)
    Luminosity,
    Sepia,
}

impl FromStr for Filter {
    type Err = CompareError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "blur" => Ok(Filter::Blur),
            "gaussianblur" => Ok(Filter::GaussianBlur),
            "grayscale" => Ok(Filter::Grayscale),
            "lightness" => Ok(Filter::Lightness),
            "luma" => Ok(Filter::Luma),
            "luminosity" => Ok(Filter::Luminosity),
            "sepia" => Ok(Filter::Sepia),
            _ => Err(CompareError::UnknownFilter {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Filter::Blur => "blur",
            Filter::GaussianBlur => "gaussianBlur",
            Filter::Grayscale => "grayScale",
            Filter::Lightness => "lightness",
            Filter::Luma => "luma",
            Filter::Luminosity => "luminosity",
            Filter::Sepia => "sepia",
        };
        f.write_str(name)
    }
}

#[inline]
fn to_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn map_pixels(image: &RgbaImage, f: impl Fn([f64; 3]) -> [f64; 3]) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let [r, g, b] = f([f64::from(r), f64::from(g), f64::from(b)]);
        *pixel = Rgba([to_u8(r), to_u8(g), to_u8(b), a]);
    }
    out
}

/// 3x3 mean over all four channels; the border repeats edge pixels
fn box_blur(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let mut sum = [0u32; 4];
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nx = (i64::from(x) + dx).clamp(0, i64::from(width) - 1) as u32;
                let ny = (i64::from(y) + dy).clamp(0, i64::from(height) - 1) as u32;
                for (acc, channel) in sum.iter_mut().zip(image.get_pixel(nx, ny).0) {
                    *acc += u32::from(channel);
                }
            }
        }
        Rgba(sum.map(|total| to_u8(f64::from(total) / 9.0)))
    })
}

fn gray(value: f64) -> [f64; 3] {
    [value, value, value]
}

impl Filter {
    /// Filtered copy of `image`; alpha is left untouched except by the blurs
    pub fn apply(&self, image: &RgbaImage) -> RgbaImage {
        match self {
            Filter::Blur => box_blur(image),
            Filter::GaussianBlur => imageops::blur(image, GAUSSIAN_SIGMA),
            Filter::Grayscale => map_pixels(image, |[r, g, b]| gray((r + g + b) / 3.0)),
            Filter::Lightness => map_pixels(image, |[r, g, b]| {
                gray((r.max(g).max(b) + r.min(g).min(b)) / 2.0)
            }),
            Filter::Luma => {
                map_pixels(image, |[r, g, b]| gray(0.2126 * r + 0.7152 * g + 0.0722 * b))
            }
            Filter::Luminosity => {
                map_pixels(image, |[r, g, b]| gray(0.21 * r + 0.72 * g + 0.07 * b))
            }
            Filter::Sepia => map_pixels(image, |[r, g, b]| {
                [
                    0.393 * r + 0.769 * g + 0.189 * b,
                    0.349 * r + 0.686 * g + 0.168 * b,
                    0.272 * r + 0.534 * g + 0.131 * b,
                ]
            }),
        }
    }
}

/// Parse a list of filter names
pub fn parse_filters<S: AsRef<str>>(names: &[S]) -> Result<Vec<Filter>> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

/// Apply `filters` in order. Returns `None` when there is nothing to do.
pub fn apply_filters(image: &RgbaImage, filters: &[Filter]) -> Option<RgbaImage> {
    let (first, rest) = filters.split_first()?;
    let mut out = first.apply(image);
    for filter in rest {
        out = filter.apply(&out);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("blur".parse::<Filter>().unwrap(), Filter::Blur);
        assert_eq!("grayScale".parse::<Filter>().unwrap(), Filter::Grayscale);
        assert_eq!("GRAYSCALE".parse::<Filter>().unwrap(), Filter::Grayscale);
        assert_eq!("gaussianBlur".parse::<Filter>().unwrap(), Filter::GaussianBlur);

        let err = "emboss".parse::<Filter>().unwrap_err();
        assert!(matches!(err, CompareError::UnknownFilter { ref name } if name == "emboss"));
    }

    #[test]
    fn test_parse_list_fails_on_first_unknown() {
        assert_eq!(
            parse_filters(&["luma", "sepia"]).unwrap(),
            vec![Filter::Luma, Filter::Sepia]
        );
        assert!(parse_filters(&["luma", "nope"]).is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for filter in [Filter::Blur, Filter::Grayscale, Filter::Sepia, Filter::GaussianBlur] {
            assert_eq!(filter.to_string().parse::<Filter>().unwrap(), filter);
        }
    }

    #[test]
    fn test_grayscale_filters() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([30, 60, 90, 200]));

        let out = Filter::Grayscale.apply(&image);
        assert_eq!(out.get_pixel(0, 0), &Rgba([60, 60, 60, 200]));

        let out = Filter::Lightness.apply(&image);
        assert_eq!(out.get_pixel(0, 0), &Rgba([60, 60, 60, 200]));

        let out = Filter::Luma.apply(&image);
        let p = out.get_pixel(0, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[3], 200);
    }

    #[test]
    fn test_sepia_saturates() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let out = Filter::Sepia.apply(&image);
        assert_eq!(out.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_blur_keeps_flat_image() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([80, 80, 80, 255]));
        let out = Filter::Blur.apply(&image);
        assert_eq!(out, image);
    }

    #[test]
    fn test_blur_spreads_a_single_pixel() {
        let mut image = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 1, Rgba([90, 0, 0, 255]));
        let out = Filter::Blur.apply(&image);
        assert_eq!(out.get_pixel(1, 1)[0], 10);
        assert_eq!(out.get_pixel(0, 0)[0], 10);
        assert_eq!(out.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_apply_filters_empty() {
        let image = RgbaImage::new(1, 1);
        assert!(apply_filters(&image, &[]).is_none());
        assert!(apply_filters(&image, &[Filter::Grayscale]).is_some());
    }
}
