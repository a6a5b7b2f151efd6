//! Paint colors: 8-bit RGBA plus a blending opacity

use crate::constants::defaults;
use crate::{CompareError, Result};
use image::Rgba;
use palette::Srgb;
use serde::{Deserialize, Serialize};

/// Color descriptor as it appears in a configuration file.
///
/// Either a hex string (`"#rrggbb"` or `"#rrggbbaa"`) or an object with
/// optional `red`, `green`, `blue`, `alpha` and `opacity` members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorOptions {
    Hex(String),
    Channels(ChannelOptions),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl From<Color> for ColorOptions {
    fn from(color: Color) -> Self {
        ColorOptions::Channels(ChannelOptions {
            red: Some(f64::from(color.red)),
            green: Some(f64::from(color.green)),
            blue: Some(f64::from(color.blue)),
            alpha: Some(f64::from(color.alpha)),
            opacity: Some(color.opacity),
        })
    }
}

/// Validated RGBA color with an opacity used when painting it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
    opacity: f64,
}

impl Color {
    /// Opaque color, painted at full opacity
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
            opacity: defaults::OPACITY,
        }
    }

    pub(crate) const fn from_defaults(value: (u8, u8, u8, u8, f64)) -> Self {
        Self {
            red: value.0,
            green: value.1,
            blue: value.2,
            alpha: value.3,
            opacity: value.4,
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidParameter` if `opacity` lies outside [0, 1]
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8, opacity: f64) -> Result<Self> {
        Self::rgba(red, green, blue, alpha).with_opacity(opacity)
    }

    pub fn with_opacity(mut self, opacity: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(CompareError::parameter("opacity", opacity));
        }
        self.opacity = opacity;
        Ok(self)
    }

    /// Build a color from its descriptor.
    ///
    /// `parameter` names the descriptor in error messages.
    pub fn from_options(options: &ColorOptions, parameter: &str) -> Result<Self> {
        match options {
            ColorOptions::Hex(hex) => Self::from_hex(hex, parameter),
            ColorOptions::Channels(channels) => {
                let channel = |name: &str, value: Option<f64>, default: u8| -> Result<u8> {
                    match value {
                        None => Ok(default),
                        Some(v) if (0.0..=255.0).contains(&v) && v.fract() == 0.0 => Ok(v as u8),
                        Some(v) => Err(CompareError::parameter(format!("{parameter}.{name}"), v)),
                    }
                };

                let color = Self::rgba(
                    channel("red", channels.red, 0)?,
                    channel("green", channels.green, 0)?,
                    channel("blue", channels.blue, 0)?,
                    channel("alpha", channels.alpha, defaults::ALPHA)?,
                );
                let opacity = channels.opacity.unwrap_or(defaults::OPACITY);
                color
                    .with_opacity(opacity)
                    .map_err(|_| CompareError::parameter(format!("{parameter}.opacity"), opacity))
            }
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional)
    pub fn from_hex(hex: &str, parameter: &str) -> Result<Self> {
        let invalid = || CompareError::parameter(parameter, hex);

        let digits = hex.trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let (rgb, alpha) = match digits.len() {
            6 => (digits, defaults::ALPHA),
            8 => (
                &digits[..6],
                u8::from_str_radix(&digits[6..], 16).map_err(|_| invalid())?,
            ),
            _ => return Err(invalid()),
        };

        let srgb: Srgb<u8> = rgb.parse().map_err(|_| invalid())?;
        Ok(Self::rgba(srgb.red, srgb.green, srgb.blue, alpha))
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn channels(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    pub fn to_rgba(&self) -> Rgba<u8> {
        Rgba(self.channels())
    }

    /// Blend this color over `pixel` at the color's opacity; alpha is
    /// written through.
    pub fn paint(&self, pixel: &mut Rgba<u8>) {
        let opacity = self.opacity;
        for (existing, new) in pixel.0.iter_mut().zip(self.channels()).take(3) {
            let mixed = f64::from(*existing) * (1.0 - opacity) + f64::from(new) * opacity;
            *existing = mixed.round().clamp(0.0, 255.0) as u8;
        }
        pixel.0[3] = self.alpha;
    }
}
