//! Shift search
//!
//! A pixel whose color moved by a pixel or two (anti-aliasing, sub-pixel
//! layout) should not count as a real difference. For a pixel at `(x, y)`
//! the search looks at every neighbour within the shift window and asks
//! whether that neighbour explains the change: the color is far from the
//! neighbour in its own image, yet equally far from the neighbour in the
//! other image. The search has to succeed in both directions.

use crate::color::{distance_squared, Channels};
use crate::config::Shift;
use crate::region::WorkingImage;

/// Inclusive offset range around `pos` that stays inside `[0, len)`
#[inline]
fn offsets(pos: u32, len: u32, radius: u32) -> std::ops::RangeInclusive<i64> {
    let back = i64::from(radius.min(pos));
    let ahead = i64::from(radius.min(len.saturating_sub(1).saturating_sub(pos)));
    -back..=ahead
}

/// Search over one direction: `source` is the image `color` came from,
/// `destination` is the other image.
pub struct ShiftSearch<'a> {
    source: &'a WorkingImage,
    destination: &'a WorkingImage,
    shift: &'a Shift,
    threshold: f64,
}

impl<'a> ShiftSearch<'a> {
    /// `threshold` is the squared color delta
    pub fn new(
        source: &'a WorkingImage,
        destination: &'a WorkingImage,
        shift: &'a Shift,
        threshold: f64,
    ) -> Self {
        Self {
            source,
            destination,
            shift,
            threshold,
        }
    }

    /// Whether some neighbour of `(x, y)` explains `color`.
    ///
    /// The pixel itself (offset 0, 0) is never consulted.
    pub fn matches(&self, x: u32, y: u32, color: &Channels) -> bool {
        let (width, height) = self.source.dimensions();

        for dx in offsets(x, width, self.shift.horizontal()) {
            for dy in offsets(y, height, self.shift.vertical()) {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let nx = (i64::from(x) + dx) as u32;
                let ny = (i64::from(y) + dy) as u32;

                let local = distance_squared(color, &self.source.get_pixel(nx, ny).0);
                let across = distance_squared(color, &self.destination.get_pixel(nx, ny).0);

                if (across - local).abs() < self.threshold && local > self.threshold {
                    return true;
                }
            }
        }

        false
    }
}

/// Both directions agree that the change at `(x, y)` is a shift
pub fn is_shifted(
    image_a: &WorkingImage,
    image_b: &WorkingImage,
    x: u32,
    y: u32,
    shift: &Shift,
    threshold: f64,
) -> bool {
    let color_a = image_a.get_pixel(x, y).0;
    let color_b = image_b.get_pixel(x, y).0;

    ShiftSearch::new(image_a, image_b, shift, threshold).matches(x, y, &color_a)
        && ShiftSearch::new(image_b, image_a, shift, threshold).matches(x, y, &color_b)
}
