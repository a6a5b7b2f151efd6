//! Numeric constants and reference defaults for screenshot comparison
//!
//! The perceptual constants must stay bit-identical: golden-image suites pin
//! exact difference counts, and those counts depend on these values.

/// RGB to XYZ transform and CIELab companding constants
pub mod perceptual {
    /// Row-major 3x3 matrix applied to normalized R, G, B
    pub const RGB_TO_XYZ: [[f64; 3]; 3] = [
        [0.4887180, 0.3106803, 0.2006017],
        [0.1762044, 0.8129847, 0.0108109],
        [0.0000000, 0.0102048, 0.9897952],
    ];

    /// Below this ratio the cube root is replaced by a linear segment
    pub const LAB_EPSILON: f64 = 0.00885645167904;

    /// Slope of the linear segment
    pub const LAB_LINEAR_SLOPE: f64 = 70.08333333333263;

    /// Offset of the linear segment (4/29)
    pub const LAB_LINEAR_OFFSET: f64 = 0.13793103448276;

    /// Color that defines the reference white (normalized RGBA)
    pub const REFERENCE_WHITE_RGBA: [f64; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Channel maximum used to normalize 8-bit values
    pub const CHANNEL_MAX: f64 = 255.0;
}

/// Bits of the per-pixel flag field
pub mod flags {
    /// Real difference
    pub const DIFFERENCE: u8 = 0b01;

    /// Difference explained by a tolerated shift
    pub const SHIFT: u8 = 0b10;
}

/// Numeric ranks used for output gating
pub mod ranks {
    pub const DIFFERENT: u8 = 10;
    pub const SIMILAR: u8 = 20;
    pub const IDENTICAL: u8 = 30;

    /// Output limit that exports every completed run
    pub const ALL: u8 = 100;
}

/// Defaults applied when a descriptor leaves a value out
pub mod defaults {
    /// Max. color distance (not squared) before a pixel counts as changed
    pub const COLOR_DELTA: f64 = 20.0;

    /// Shift search radius in pixels
    pub const SHIFT_HORIZONTAL: u32 = 2;
    pub const SHIFT_VERTICAL: u32 = 2;

    /// Pixel-count threshold for the "different" verdict
    pub const THRESHOLD_PIXELS: f64 = 500.0;

    /// Channel defaults of a color descriptor
    pub const ALPHA: u8 = 255;
    pub const OPACITY: f64 = 1.0;

    /// (red, green, blue, alpha, opacity)
    pub const DIFF_COLOR: (u8, u8, u8, u8, f64) = (255, 0, 0, 255, 0.7);
    pub const BACKGROUND_COLOR: (u8, u8, u8, u8, f64) = (0, 0, 0, 255, 0.6);
    pub const IGNORE_COLOR: (u8, u8, u8, u8, f64) = (200, 100, 0, 255, 0.7);
    pub const BLOCK_OUT_COLOR: (u8, u8, u8, u8, f64) = (0, 0, 0, 255, 1.0);
}

/// Below this pixel count the parallel path is not worth scheduling
pub const PARALLEL_MIN_PIXELS: usize = 64 * 64;
