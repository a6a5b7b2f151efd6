//! Output image: highlight painting and side-by-side composition
//!
//! The highlight image is a copy of one source with every pixel of the
//! common frame repainted according to its flags. Precedence is
//! difference, then shift, then background. The composition places
//! image A, the highlight and image B next to each other.

use crate::color::Color;
use crate::compare::FlagField;
use crate::config::Composition;
use crate::constants::flags;
use crate::region::Rect;
use image::{imageops, RgbaImage};

/// Resolved stacking direction of a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    LeftToRight,
    TopToBottom,
}

impl Composition {
    /// Stacking direction for images of at most `width` x `height`;
    /// `None` when composition is off.
    ///
    /// `Auto` stacks wide images vertically and everything else
    /// horizontally.
    pub fn orientation(&self, width: u32, height: u32) -> Option<Orientation> {
        match self {
            Composition::Off => None,
            Composition::LeftToRight => Some(Orientation::LeftToRight),
            Composition::TopToBottom => Some(Orientation::TopToBottom),
            Composition::Auto if width > height => Some(Orientation::TopToBottom),
            Composition::Auto => Some(Orientation::LeftToRight),
        }
    }
}

/// Run-level highlight colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightColors {
    pub diff: Color,
    pub background: Color,
    pub ignore: Color,
}

/// What one pixel pass contributes to the highlight image
#[derive(Debug, Clone, PartialEq)]
pub struct PassOverlay {
    /// Pass region in flag-field coordinates
    pub region: Rect,
    pub diff: Option<Color>,
    pub background: Option<Color>,
    /// Visible block-outs, in flag-field coordinates
    pub block_outs: Vec<(Rect, Color)>,
}

/// Paint `color` over `rect` of `image`, blended by the color's opacity
pub fn paint_rect(image: &mut RgbaImage, rect: Rect, color: &Color) {
    let rect = rect.normalize(image.width(), image.height());
    for y in rect.top..rect.bottom() {
        for x in rect.left..rect.right() {
            color.paint(image.get_pixel_mut(x, y));
        }
    }
}

/// Repaint the flag-field area of `canvas`.
///
/// A pixel takes its diff and background colors from the last overlay
/// whose region contains it, falling back to the run-level colors. The
/// shift color is always run-level.
pub fn paint_highlight(
    canvas: &mut RgbaImage,
    field: &FlagField,
    colors: &HighlightColors,
    overlays: &[PassOverlay],
) {
    let width = field.width().min(canvas.width());
    let height = field.height().min(canvas.height());

    for y in 0..height {
        for x in 0..width {
            let overlay = overlays.iter().rev().find(|o| o.region.contains(x, y));
            let bits = field.get(x, y);

            let color = if bits & flags::DIFFERENCE != 0 {
                overlay.and_then(|o| o.diff).unwrap_or(colors.diff)
            } else if bits & flags::SHIFT != 0 {
                colors.ignore
            } else {
                overlay
                    .and_then(|o| o.background)
                    .unwrap_or(colors.background)
            };
            color.paint(canvas.get_pixel_mut(x, y));
        }
    }

    for overlay in overlays {
        for (rect, color) in &overlay.block_outs {
            paint_rect(canvas, *rect, color);
        }
    }
}

/// Place `image_a`, `highlight` and `image_b` on one canvas.
///
/// Each image gets a cell of the largest width and height among the
/// three; with [`Composition::Off`] the highlight is returned alone.
pub fn compose(
    image_a: &RgbaImage,
    highlight: &RgbaImage,
    image_b: &RgbaImage,
    composition: Composition,
) -> RgbaImage {
    let images = [image_a, highlight, image_b];
    let width = images.iter().map(|i| i.width()).max().unwrap_or(0);
    let height = images.iter().map(|i| i.height()).max().unwrap_or(0);

    let Some(orientation) = composition.orientation(width, height) else {
        return highlight.clone();
    };

    let (mut canvas, step) = match orientation {
        Orientation::LeftToRight => (RgbaImage::new(width * 3, height), (i64::from(width), 0)),
        Orientation::TopToBottom => (RgbaImage::new(width, height * 3), (0, i64::from(height))),
    };

    for (i, image) in images.iter().enumerate() {
        let i = i as i64;
        imageops::replace(&mut canvas, *image, step.0 * i, step.1 * i);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn colors() -> HighlightColors {
        HighlightColors {
            diff: Color::rgba(255, 0, 0, 255),
            background: Color::rgba(0, 0, 0, 255),
            ignore: Color::rgba(0, 0, 255, 255),
        }
    }

    #[test]
    fn test_orientation() {
        assert_eq!(Composition::Auto.orientation(300, 200), Some(Orientation::TopToBottom));
        assert_eq!(Composition::Auto.orientation(200, 300), Some(Orientation::LeftToRight));
        assert_eq!(Composition::Auto.orientation(200, 200), Some(Orientation::LeftToRight));
        assert_eq!(
            Composition::LeftToRight.orientation(300, 200),
            Some(Orientation::LeftToRight)
        );
        assert_eq!(Composition::Off.orientation(300, 200), None);
    }

    #[test]
    fn test_precedence() {
        let field = FlagField::from_raw(4, 1, vec![0, 1, 2, 3]).unwrap();
        let mut canvas = RgbaImage::from_pixel(4, 1, Rgba([9, 9, 9, 9]));
        paint_highlight(&mut canvas, &field, &colors(), &[]);

        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(2, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(3, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_canvas_outside_field_untouched() {
        let field = FlagField::new(1, 1);
        let mut canvas = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 9]));
        paint_highlight(&mut canvas, &field, &colors(), &[]);
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(1, 1), &Rgba([9, 9, 9, 9]));
    }

    #[test]
    fn test_last_overlay_wins() {
        let field = FlagField::from_raw(3, 1, vec![1, 1, 0]).unwrap();
        let green = Color::rgba(0, 255, 0, 255);
        let white = Color::rgba(255, 255, 255, 255);
        let overlays = [
            PassOverlay {
                region: Rect::new(0, 0, 3, 1),
                diff: Some(white),
                background: Some(white),
                block_outs: Vec::new(),
            },
            PassOverlay {
                region: Rect::new(1, 0, 2, 1),
                diff: Some(green),
                background: None,
                block_outs: Vec::new(),
            },
        ];

        let mut canvas = RgbaImage::new(3, 1);
        paint_highlight(&mut canvas, &field, &colors(), &overlays);
        assert_eq!(canvas.get_pixel(0, 0), &white.to_rgba());
        assert_eq!(canvas.get_pixel(1, 0), &green.to_rgba());
        // Second overlay has no background color, run-level applies
        assert_eq!(canvas.get_pixel(2, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_visible_block_out_painted() {
        let field = FlagField::new(2, 2);
        let gray = Color::rgba(128, 128, 128, 255);
        let overlays = [PassOverlay {
            region: Rect::full(2, 2),
            diff: None,
            background: None,
            block_outs: vec![(Rect::new(1, 1, 1, 1), gray)],
        }];
        let mut canvas = RgbaImage::new(2, 2);
        paint_highlight(&mut canvas, &field, &colors(), &overlays);
        assert_eq!(canvas.get_pixel(1, 1), &gray.to_rgba());
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_compose_layouts() {
        let a = RgbaImage::from_pixel(3, 2, Rgba([1, 1, 1, 255]));
        let h = RgbaImage::from_pixel(3, 2, Rgba([2, 2, 2, 255]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([3, 3, 3, 255]));

        let out = compose(&a, &h, &b, Composition::Auto);
        assert_eq!(out.dimensions(), (3, 6));
        assert_eq!(out.get_pixel(0, 0)[0], 1);
        assert_eq!(out.get_pixel(0, 2)[0], 2);
        assert_eq!(out.get_pixel(0, 4)[0], 3);
        // B is narrower; the rest of its cell stays transparent
        assert_eq!(out.get_pixel(2, 4), &Rgba([0, 0, 0, 0]));

        let out = compose(&a, &h, &b, Composition::LeftToRight);
        assert_eq!(out.dimensions(), (9, 2));
        assert_eq!(out.get_pixel(3, 0)[0], 2);
        assert_eq!(out.get_pixel(6, 0)[0], 3);

        let out = compose(&a, &h, &b, Composition::Off);
        assert_eq!(out, h);
    }
}
