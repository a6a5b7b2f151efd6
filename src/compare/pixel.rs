//! Pixel comparator and the per-pixel flag field

use super::shift;
use crate::color::distance_squared;
use crate::config::Shift;
use crate::constants::{flags, PARALLEL_MIN_PIXELS};
use crate::region::{Rect, WorkingImage};
use crate::{CompareError, Result};
use rayon::prelude::*;

/// One byte per pixel of the common frame.
///
/// Bit 0 marks a real difference, bit 1 a tolerated shift. Passes only
/// ever OR bits in, so a pixel flagged by one pass stays flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagField {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FlagField {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Wrap existing flag bytes
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(CompareError::malformed(format!(
                "flag field of {} bytes for {}x{} pixels",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[self.index(x, y)]
    }

    pub fn mark(&mut self, x: u32, y: u32, bits: u8) {
        let i = self.index(x, y);
        self.data[i] |= bits;
    }

    pub fn is_different(&self, x: u32, y: u32) -> bool {
        self.get(x, y) & flags::DIFFERENCE != 0
    }

    pub fn is_shifted(&self, x: u32, y: u32) -> bool {
        self.get(x, y) & flags::SHIFT != 0
    }

    /// Pixels with bit 0 set
    pub fn differences(&self) -> u64 {
        self.data
            .iter()
            .filter(|&&f| f & flags::DIFFERENCE != 0)
            .count() as u64
    }

    /// Pixels with bit 1 set and bit 0 clear
    pub fn shifts(&self) -> u64 {
        self.data
            .iter()
            .filter(|&&f| f & flags::SHIFT != 0 && f & flags::DIFFERENCE == 0)
            .count() as u64
    }

    fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, u8> {
        self.data.chunks_mut(self.width.max(1) as usize)
    }
}

/// Counts produced by one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub differences: u64,
    pub shifts: u64,
}

/// Flags the pixels of one region pair.
///
/// Both working images must have the same size; their pixel `(x, y)` maps
/// to flag `(region.left + x, region.top + y)`.
pub struct PixelComparator<'a> {
    image_a: &'a WorkingImage,
    image_b: &'a WorkingImage,
    threshold: f64,
    shift: &'a Shift,
}

impl<'a> PixelComparator<'a> {
    /// `threshold` is the squared color delta
    pub fn new(
        image_a: &'a WorkingImage,
        image_b: &'a WorkingImage,
        threshold: f64,
        shift: &'a Shift,
    ) -> Self {
        Self {
            image_a,
            image_b,
            threshold,
            shift,
        }
    }

    /// Flag bits for pixel `(x, y)` of the working images
    #[inline]
    pub fn flag_at(&self, x: u32, y: u32) -> u8 {
        let color_a = self.image_a.get_pixel(x, y).0;
        let color_b = self.image_b.get_pixel(x, y).0;

        if distance_squared(&color_a, &color_b) <= self.threshold {
            return 0;
        }

        if self.shift.is_searching()
            && shift::is_shifted(self.image_a, self.image_b, x, y, self.shift, self.threshold)
        {
            flags::SHIFT
        } else {
            flags::DIFFERENCE
        }
    }

    fn compare_row(&self, y: u32, row: &mut [u8]) -> PassCounts {
        let mut counts = PassCounts::default();
        for (x, flag) in row.iter_mut().enumerate() {
            let bits = self.flag_at(x as u32, y);
            match bits {
                flags::DIFFERENCE => counts.differences += 1,
                flags::SHIFT => counts.shifts += 1,
                _ => {}
            }
            *flag |= bits;
        }
        counts
    }

    /// OR this pass's flags into `field` at `origin`.
    ///
    /// With `parallel` set, rows are compared on the rayon pool; the result
    /// is identical to the sequential path.
    pub fn compare_into(
        &self,
        field: &mut FlagField,
        origin: (u32, u32),
        parallel: bool,
    ) -> Result<PassCounts> {
        let (width, height) = self.image_a.dimensions();
        if self.image_b.dimensions() != (width, height) {
            return Err(CompareError::malformed(format!(
                "working images differ in size: {:?} vs {:?}",
                (width, height),
                self.image_b.dimensions()
            )));
        }

        let region = Rect::new(origin.0, origin.1, width, height);
        if region.right() > field.width() || region.bottom() > field.height() {
            return Err(CompareError::malformed(format!(
                "pass region {:?} exceeds the {}x{} flag field",
                region,
                field.width(),
                field.height()
            )));
        }

        let (left, top) = (region.left as usize, region.top as usize);
        let span = left..left + width as usize;
        let rows = top..top + height as usize;

        let sum = |a: PassCounts, b: PassCounts| PassCounts {
            differences: a.differences + b.differences,
            shifts: a.shifts + b.shifts,
        };

        let use_pool = parallel && region.pixel_count() as usize >= PARALLEL_MIN_PIXELS;
        let counts = if use_pool {
            field
                .data
                .par_chunks_mut(field.width.max(1) as usize)
                .enumerate()
                .filter(|(row, _)| rows.contains(row))
                .map(|(row, bytes)| self.compare_row((row - top) as u32, &mut bytes[span.clone()]))
                .reduce(PassCounts::default, sum)
        } else {
            field
                .rows_mut()
                .enumerate()
                .filter(|(row, _)| rows.contains(row))
                .map(|(row, bytes)| self.compare_row((row - top) as u32, &mut bytes[span.clone()]))
                .fold(PassCounts::default(), sum)
        };

        Ok(counts)
    }
}
