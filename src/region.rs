//! Rectangle normalization, clipping and flat fills
//!
//! A configured [`Area`] may leave any side out or point outside the image;
//! [`Area::normalize`] turns it into a [`Rect`] that is guaranteed to lie
//! inside the bounding image and to cover at least one pixel. The same
//! routine serves crops, block-outs and per-pass comparison areas.

use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Working copy of an image: four `f64` channels per pixel, either raw
/// RGBA values or perceptual values, depending on the pass.
pub type WorkingImage = ImageBuffer<Rgba<f64>, Vec<f64>>;

/// A rectangle as configured, possibly partial or out of bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Area {
    #[serde(default, alias = "x")]
    pub left: Option<i64>,
    #[serde(default, alias = "y")]
    pub top: Option<i64>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

/// A rectangle that lies inside its bounding image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Area {
    /// Area that spans whatever image it is normalized against
    pub const fn full() -> Self {
        Self {
            left: None,
            top: None,
            width: None,
            height: None,
        }
    }

    pub const fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
        }
    }

    /// Fit this area into a `width` x `height` image.
    ///
    /// Missing left/top become 0, missing (or zero) width/height become the
    /// full image size. Negative values clamp to 0. Coordinates are clamped
    /// before sizes, so an out-of-range origin keeps a one-pixel rectangle
    /// at the image border instead of pushing the size to zero.
    pub fn normalize(&self, width: u32, height: u32) -> Rect {
        let bound_w = i64::from(width);
        let bound_h = i64::from(height);

        let left = self.left.unwrap_or(0);
        let top = self.top.unwrap_or(0);
        let w = self.width.filter(|w| *w != 0).unwrap_or(bound_w);
        let h = self.height.filter(|h| *h != 0).unwrap_or(bound_h);

        let left = left.max(0).min((bound_w - 1).max(0));
        let top = top.max(0).min((bound_h - 1).max(0));
        let w = w.max(0).min(bound_w - left).max(1);
        let h = h.max(0).min(bound_h - top).max(1);

        Rect {
            left: left as u32,
            top: top as u32,
            width: w as u32,
            height: h as u32,
        }
    }
}

impl From<Rect> for Area {
    fn from(rect: Rect) -> Self {
        Area::new(
            i64::from(rect.left),
            i64::from(rect.top),
            i64::from(rect.width),
            i64::from(rect.height),
        )
    }
}

impl Rect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` image
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Same rectangle, normalized again against new bounds
    pub fn normalize(&self, width: u32, height: u32) -> Rect {
        Area::from(*self).normalize(width, height)
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Same size, moved by `(dx, dy)`
    pub fn offset(&self, dx: u32, dy: u32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

/// Copy of the `rect` sub-image. The rect is normalized first, so any
/// rectangle is accepted.
pub fn clip(image: &RgbaImage, rect: Rect) -> RgbaImage {
    let rect = rect.normalize(image.width(), image.height());
    imageops::crop_imm(image, rect.left, rect.top, rect.width, rect.height).to_image()
}

/// Smallest common size of two images, anchored at the origin
pub fn common_size(a: &RgbaImage, b: &RgbaImage) -> (u32, u32) {
    (a.width().min(b.width()), a.height().min(b.height()))
}

/// Blend one working-space pixel with `color` at `opacity`.
///
/// Color channels mix as `existing * (1 - opacity) + color * opacity`;
/// the fourth channel is written through.
#[inline]
pub fn blend_channels(pixel: &mut Rgba<f64>, color: &[f64; 4], opacity: f64) {
    for c in 0..3 {
        pixel.0[c] = pixel.0[c] * (1.0 - opacity) + color[c] * opacity;
    }
    pixel.0[3] = color[3];
}

/// Paint `color` over `rect` of a working image, blended by `opacity`
pub fn fill_rect(image: &mut WorkingImage, rect: Rect, color: &[f64; 4], opacity: f64) {
    let rect = rect.normalize(image.width(), image.height());
    for y in rect.top..rect.bottom() {
        for x in rect.left..rect.right() {
            blend_channels(image.get_pixel_mut(x, y), color, opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(left: Option<i64>, top: Option<i64>, width: Option<i64>, height: Option<i64>) -> Area {
        Area {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn test_missing_values_fill_remaining_space() {
        let r = partial(None, Some(23), Some(42), Some(57)).normalize(300, 200);
        assert_eq!(r, Rect::new(0, 23, 42, 57));

        let r = partial(Some(10), None, Some(42), Some(57)).normalize(300, 200);
        assert_eq!(r, Rect::new(10, 0, 42, 57));

        let r = partial(Some(10), Some(23), None, Some(57)).normalize(300, 200);
        assert_eq!(r, Rect::new(10, 23, 290, 57));

        let r = partial(Some(10), Some(23), Some(42), None).normalize(300, 200);
        assert_eq!(r, Rect::new(10, 23, 42, 177));

        assert_eq!(Area::full().normalize(300, 200), Rect::full(300, 200));
    }

    #[test]
    fn test_negative_values_clamp() {
        assert_eq!(Area::new(-10, 23, 42, 57).normalize(300, 200), Rect::new(0, 23, 42, 57));
        assert_eq!(Area::new(10, -23, 42, 57).normalize(300, 200), Rect::new(10, 0, 42, 57));
        // Negative sizes collapse to the one-pixel minimum
        assert_eq!(Area::new(10, 23, -42, 57).normalize(300, 200), Rect::new(10, 23, 1, 57));
        assert_eq!(Area::new(10, 23, 42, -57).normalize(300, 200), Rect::new(10, 23, 42, 1));
    }

    #[test]
    fn test_coordinates_win_over_size() {
        assert_eq!(Area::new(1000, 23, 42, 57).normalize(300, 200), Rect::new(299, 23, 1, 57));
        assert_eq!(Area::new(10, 2300, 42, 57).normalize(300, 200), Rect::new(10, 199, 42, 1));
        assert_eq!(Area::new(11, 23, 4200, 57).normalize(300, 200), Rect::new(11, 23, 289, 57));
        assert_eq!(Area::new(11, 23, 42, 5700).normalize(300, 200), Rect::new(11, 23, 42, 177));
        assert_eq!(Area::new(11, 23, 420, 570).normalize(300, 200), Rect::new(11, 23, 289, 177));
    }

    #[test]
    fn test_border_values() {
        assert_eq!(Area::new(300, 23, 42, 57).normalize(300, 200), Rect::new(299, 23, 1, 57));
        assert_eq!(Area::new(10, 200, 42, 57).normalize(300, 200), Rect::new(10, 199, 42, 1));
        assert_eq!(Area::new(11, 23, 289, 57).normalize(300, 200), Rect::new(11, 23, 289, 57));
        assert_eq!(Area::new(11, 23, 42, 177).normalize(300, 200), Rect::new(11, 23, 42, 177));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let areas = [
            Area::full(),
            Area::new(-5, -5, -5, -5),
            Area::new(1000, 2000, 3000, 4000),
            Area::new(11, 23, 42, 57),
            partial(Some(299), None, Some(0), None),
        ];
        for area in areas {
            let once = area.normalize(300, 200);
            assert_eq!(once.normalize(300, 200), once, "{:?}", area);
        }
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(1, 1, 2, 2);
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 2));
        assert!(!r.contains(3, 2));
        assert!(!r.contains(0, 1));
        assert_eq!(r.pixel_count(), 4);
    }

    #[test]
    fn test_clip() {
        let image = RgbaImage::from_fn(3, 3, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let clipped = clip(&image, Rect::new(1, 2, 2, 1));
        assert_eq!(clipped.dimensions(), (2, 1));
        assert_eq!(clipped.get_pixel(0, 0), image.get_pixel(1, 2));
        assert_eq!(clipped.get_pixel(1, 0), image.get_pixel(2, 2));
    }

    #[test]
    fn test_common_size() {
        let a = RgbaImage::new(1, 3);
        let b = RgbaImage::new(3, 3);
        assert_eq!(common_size(&a, &b), (1, 3));
        assert_eq!(common_size(&b, &RgbaImage::new(3, 1)), (3, 1));
    }

    #[test]
    fn test_fill_rect_blends_by_opacity() {
        let mut image = WorkingImage::from_pixel(2, 2, Rgba([100.0, 100.0, 100.0, 255.0]));
        fill_rect(&mut image, Rect::new(0, 0, 1, 2), &[200.0, 0.0, 50.0, 10.0], 0.5);

        assert_eq!(image.get_pixel(0, 0).0, [150.0, 50.0, 75.0, 10.0]);
        assert_eq!(image.get_pixel(0, 1).0, [150.0, 50.0, 75.0, 10.0]);
        assert_eq!(image.get_pixel(1, 0).0, [100.0, 100.0, 100.0, 255.0]);
    }

    #[test]
    fn test_fill_rect_opaque_overwrites() {
        let mut image = WorkingImage::from_pixel(2, 2, Rgba([1.0, 2.0, 3.0, 4.0]));
        fill_rect(&mut image, Rect::full(2, 2), &[9.0, 9.0, 9.0, 9.0], 1.0);
        assert!(image.pixels().all(|p| p.0 == [9.0, 9.0, 9.0, 9.0]));
    }
}
