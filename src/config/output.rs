//! Output image settings: where to write, when, and in which layout

use crate::compare::ResultCode;
use crate::constants::ranks;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Verdicts for which an output image is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLimit {
    /// Only when the images are different
    Different,
    /// When the images are similar or different
    Similar,
    /// Every completed comparison
    #[default]
    All,
}

impl OutputLimit {
    pub fn rank(&self) -> u8 {
        match self {
            OutputLimit::Different => ranks::DIFFERENT,
            OutputLimit::Similar => ranks::SIMILAR,
            OutputLimit::All => ranks::ALL,
        }
    }

    /// Whether a run ending in `code` falls within this limit
    pub fn admits(&self, code: ResultCode) -> bool {
        code.rank().is_some_and(|rank| rank <= self.rank())
    }
}

/// Layout of the output image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Composition {
    /// Highlight image only
    Off,
    /// Stack along the shorter dimension
    #[default]
    Auto,
    LeftToRight,
    TopToBottom,
}

/// Image used as the base of the highlight image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CopySource {
    /// Transparent canvas
    None,
    #[default]
    ImageA,
    ImageB,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    pub limit: OutputLimit,
    pub composition: Composition,
    pub copy_image: CopySource,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Output {
    image_path: Option<PathBuf>,
    limit: OutputLimit,
    composition: Composition,
    copy_source: CopySource,
}

impl Output {
    pub fn new(
        image_path: Option<PathBuf>,
        limit: OutputLimit,
        composition: Composition,
        copy_source: CopySource,
    ) -> Self {
        Self {
            image_path,
            limit,
            composition,
            copy_source,
        }
    }

    /// An empty path means "no output file"
    pub fn from_options(options: &OutputOptions) -> Self {
        let image_path = options
            .image_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty());
        Self::new(image_path, options.limit, options.composition, options.copy_image)
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn limit(&self) -> OutputLimit {
        self.limit
    }

    pub fn composition(&self) -> Composition {
        self.composition
    }

    pub fn copy_source(&self) -> CopySource {
        self.copy_source
    }

    /// A path is set and `code` is within the limit
    pub fn should_export(&self, code: ResultCode) -> bool {
        self.image_path.is_some() && self.limit.admits(code)
    }

    pub fn to_options(&self) -> OutputOptions {
        OutputOptions {
            image_path: self.image_path.clone(),
            limit: self.limit,
            composition: self.composition,
            copy_image: self.copy_source,
        }
    }
}
