//! Pixel comparison engine
//!
//! [`PixelComparator`] fills a [`FlagField`] for one pass; [`classify`]
//! turns the accumulated counts into a [`ResultCode`].

pub mod pixel;
pub mod shift;
pub mod verdict;

pub use pixel::{FlagField, PassCounts, PixelComparator};
pub use shift::{is_shifted, ShiftSearch};
pub use verdict::{classify, ResultCode};
