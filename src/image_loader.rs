//! Screenshot loading and saving
//!
//! Decoding and encoding go through the `image` crate. Every image is
//! converted to 8-bit RGBA on load, so the comparison never has to care
//! about the source pixel layout.
//!
//! ## Supported Formats
//!
//! - PNG (the usual screenshot format)
//! - JPEG
//! - BMP

use crate::{CompareError, Result};
use image::{ImageReader, RgbaImage};
use log::warn;
use std::path::Path;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Whether the format keeps pixel values exactly
    pub fn is_lossless(&self) -> bool {
        !matches!(self, ImageFormat::Jpeg)
    }

    fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Load an image from disk as 8-bit RGBA
///
/// The format is sniffed from the file content, so a misnamed file still
/// decodes.
///
/// # Errors
///
/// - `ImageLoadError` if the file cannot be opened or decoded
/// - `MalformedPixelData` if the decoded image has no pixels
///
/// # Example
///
/// ```rust,no_run
/// use visual_diff::image_loader::load_image;
/// use std::path::Path;
///
/// let image = load_image(Path::new("screenshot.png"))?;
/// println!("Loaded image: {}x{}", image.width(), image.height());
/// # Ok::<(), visual_diff::CompareError>(())
/// ```
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| {
            CompareError::image_load(format!("Failed to open image file: {}", path.display()), e)
        })?
        .with_guessed_format()
        .map_err(|e| {
            CompareError::image_load(format!("Failed to read image file: {}", path.display()), e)
        })?;

    let image = reader
        .decode()
        .map_err(|e| {
            CompareError::image_load(format!("Failed to decode image: {}", path.display()), e)
        })?
        .to_rgba8();

    ensure_not_empty(&image, &path.display().to_string())?;
    Ok(image)
}

/// Write `image`; the format follows the file extension (PNG if unknown)
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_extension(path).unwrap_or(ImageFormat::Png);
    if !format.is_lossless() {
        warn!("{} uses a lossy format, highlight colors will shift", path.display());
    }
    let result = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(path, format.to_image_format()),
        _ => image.save_with_format(path, format.to_image_format()),
    };
    result.map_err(|e| {
        CompareError::image_write(format!("Failed to write image: {}", path.display()), e)
    })
}

/// Build an image from a raw RGBA buffer (4 bytes per pixel, row-major)
///
/// # Errors
///
/// `MalformedPixelData` if the buffer length does not match the
/// dimensions or the image would be empty.
pub fn from_raw_rgba(width: u32, height: u32, bytes: Vec<u8>) -> Result<RgbaImage> {
    let expected = width as usize * height as usize * 4;
    if bytes.len() != expected {
        return Err(CompareError::malformed(format!(
            "buffer of {} bytes for a {}x{} RGBA image (expected {})",
            bytes.len(),
            width,
            height,
            expected
        )));
    }

    let image = RgbaImage::from_raw(width, height, bytes)
        .ok_or_else(|| CompareError::malformed("buffer does not fit the image dimensions"))?;
    ensure_not_empty(&image, "raw buffer")?;
    Ok(image)
}

pub(crate) fn ensure_not_empty(image: &RgbaImage, name: &str) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CompareError::malformed(format!(
            "{} has no pixels ({}x{})",
            name,
            image.width(),
            image.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_extension(Path::new("shot.png")),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("shot.JPEG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_extension(Path::new("shot.bmp")),
            Some(ImageFormat::Bmp)
        );
        assert_eq!(ImageFormat::from_extension(Path::new("shot.heic")), None);
        assert_eq!(ImageFormat::from_extension(Path::new("shot")), None);
    }

    #[test]
    fn test_lossless_formats() {
        assert!(ImageFormat::Png.is_lossless());
        assert!(!ImageFormat::Jpeg.is_lossless());
    }

    #[test]
    fn test_from_raw_rgba() {
        let image = from_raw_rgba(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(image.get_pixel(1, 0), &Rgba([5, 6, 7, 8]));
    }

    #[test]
    fn test_from_raw_rgba_length_mismatch() {
        let err = from_raw_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, CompareError::MalformedPixelData { .. }));
    }

    #[test]
    fn test_from_raw_rgba_empty() {
        let err = from_raw_rgba(0, 3, Vec::new()).unwrap_err();
        assert!(matches!(err, CompareError::MalformedPixelData { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_image(Path::new("/nonexistent/visual_diff/shot.png")).unwrap_err();
        assert!(matches!(err, CompareError::ImageLoadError { .. }));
    }

    #[test]
    fn test_save_and_load_png() {
        let image = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 80, y as u8 * 100, 7, 200]));
        let path = std::env::temp_dir().join("visual_diff_loader_test.png");

        save_image(&image, &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded, image);

        let _ = std::fs::remove_file(&path);
    }
}
