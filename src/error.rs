//! Error types for the visual_diff library

use thiserror::Error;

/// Result type alias for visual_diff operations
pub type Result<T> = std::result::Result<T, CompareError>;

/// Coarse classification of a [`CompareError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected while building the configuration, before any pixel is touched
    Config,
    /// Image decode or encode failure
    Io,
    /// Corrupt or inconsistent pixel data discovered during a run
    Runtime,
}

/// Errors raised while configuring or running a comparison
#[derive(Error, Debug)]
pub enum CompareError {
    /// A required image reference is absent or empty
    #[error("Missing image reference for {which}")]
    MissingImage { which: &'static str },

    /// Configuration descriptor could not be parsed
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A nested value (rect, color, threshold, shift, ...) is malformed
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Filter name not recognized
    #[error("Unknown filter: {name}")]
    UnknownFilter { name: String },

    /// Image file could not be opened or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Output image could not be encoded or written
    #[error("Failed to write image: {message}")]
    ImageWriteError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Descriptor file could not be written
    #[error("Failed to write configuration {path}")]
    ConfigWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Pixel data does not match its declared geometry
    #[error("Malformed pixel data: {message}")]
    MalformedPixelData { message: String },
}

impl CompareError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an image write error with context
    pub fn image_write<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageWriteError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error wrapping a parser failure
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::InvalidConfig {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-parameter error
    pub fn parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPixelData {
            message: message.into(),
        }
    }

    /// Which stage of a run produced this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompareError::MissingImage { .. }
            | CompareError::InvalidConfig { .. }
            | CompareError::InvalidParameter { .. }
            | CompareError::UnknownFilter { .. } => ErrorKind::Config,
            CompareError::ImageLoadError { .. }
            | CompareError::ImageWriteError { .. }
            | CompareError::ConfigWriteError { .. } => ErrorKind::Io,
            CompareError::MalformedPixelData { .. } => ErrorKind::Runtime,
        }
    }

    /// Get user-friendly error description for harness reports
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Config => {
                format!("The comparison is misconfigured: {}", self)
            }
            ErrorKind::Io => {
                "Could not read or write a file. Please check the paths and image formats."
                    .to_string()
            }
            ErrorKind::Runtime => {
                "Screenshot data is corrupt; no verdict was produced.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CompareError::MissingImage { which: "imageA" }.kind(),
            ErrorKind::Config
        );
        assert_eq!(
            CompareError::parameter("threshold.value", -1).kind(),
            ErrorKind::Config
        );
        assert_eq!(
            CompareError::UnknownFilter { name: "emboss".into() }.kind(),
            ErrorKind::Config
        );
        assert_eq!(CompareError::malformed("short buffer").kind(), ErrorKind::Runtime);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(CompareError::image_load("a.png", io).kind(), ErrorKind::Io);

        let err = CompareError::ConfigWriteError {
            path: "compare.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_display_includes_context() {
        let err = CompareError::parameter("color.red", 300);
        assert_eq!(err.to_string(), "Invalid parameter: color.red = 300");

        let err = CompareError::MissingImage { which: "imageB" };
        assert!(err.to_string().contains("imageB"));
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CompareError::image_write("out.png", io);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_user_message() {
        let err = CompareError::malformed("bad");
        assert!(err.user_message().contains("corrupt"));
        let err = CompareError::UnknownFilter { name: "x".into() };
        assert!(err.user_message().contains("misconfigured"));
    }
}
