//! Color values and color-space conversion
//!
//! `model` holds the per-pass transform into the working space; `value`
//! holds the validated 8-bit colors used for painting and block-outs.

pub mod model;
pub mod value;

pub use model::{distance_squared, Channels, ColorModel, Gamma};
pub use value::Color;
