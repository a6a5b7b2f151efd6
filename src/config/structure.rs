//! Structure pass descriptors (`"type": "structure"`)
//!
//! These describe DOM-level checks: a selector, anchors that pin element
//! edges or sizes, and limits on element geometry. The pixel engine only
//! validates and carries them.

use super::threshold::{Threshold, ThresholdKind, ThresholdOptions};
use crate::color::value::ColorOptions;
use crate::color::Color;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorType {
    Left,
    Right,
    Top,
    Bottom,
    #[default]
    Width,
    Height,
    /// Width, left and right together
    Horizontal,
    /// Height, top and bottom together
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPosition {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorOptions {
    #[serde(rename = "type")]
    pub kind: AnchorType,
    pub position: AnchorPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ThresholdOptions>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub kind: AnchorType,
    pub position: AnchorPosition,
    pub threshold: Threshold,
}

impl Anchor {
    pub fn from_options(options: &AnchorOptions) -> Result<Self> {
        let threshold = match &options.threshold {
            Some(t) => Threshold::from_options(t)?,
            None => Threshold::new(ThresholdKind::Pixel, 0.0)?,
        };
        Ok(Self {
            kind: options.kind,
            position: options.position,
            threshold,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    #[default]
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitContext {
    Left,
    Right,
    Top,
    Bottom,
    #[default]
    Width,
    Height,
}

/// Geometry bound, e.g. "width at least 50"
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Limit {
    #[serde(rename = "type")]
    pub kind: LimitType,
    pub context: LimitContext,
    pub value: f64,
}

impl Limit {
    pub fn is_min(&self) -> bool {
        self.kind == LimitType::Min
    }

    pub fn is_max(&self) -> bool {
        self.kind == LimitType::Max
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureOptions {
    pub selector: String,
    pub anchors: Vec<AnchorOptions>,
    pub limits: Vec<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorOptions>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructurePass {
    selector: String,
    anchors: Vec<Anchor>,
    limits: Vec<Limit>,
    color: Option<Color>,
}

impl StructurePass {
    pub fn from_options(options: &StructureOptions) -> Result<Self> {
        let anchors = options
            .anchors
            .iter()
            .map(Anchor::from_options)
            .collect::<Result<Vec<_>>>()?;
        let color = options
            .color
            .as_ref()
            .map(|c| Color::from_options(c, "structure.color"))
            .transpose()?;

        Ok(Self {
            selector: options.selector.clone(),
            anchors,
            limits: options.limits.clone(),
            color,
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn limits(&self) -> &[Limit] {
        &self.limits
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn to_options(&self) -> StructureOptions {
        StructureOptions {
            selector: self.selector.clone(),
            anchors: self
                .anchors
                .iter()
                .map(|a| AnchorOptions {
                    kind: a.kind,
                    position: a.position,
                    threshold: Some(a.threshold.to_options()),
                })
                .collect(),
            limits: self.limits.clone(),
            color: self.color.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_descriptor() {
        let options: StructureOptions = serde_json::from_str(
            r#"{
                "selector": "body div.test",
                "anchors": [{"type": "width", "position": "absolute", "threshold": {"type": "pixel", "value": 5}}],
                "limits": [{"type": "min", "context": "width", "value": 50}]
            }"#,
        )
        .unwrap();
        let pass = StructurePass::from_options(&options).unwrap();

        assert_eq!(pass.selector(), "body div.test");
        assert_eq!(pass.anchors()[0].kind, AnchorType::Width);
        assert_eq!(pass.anchors()[0].position, AnchorPosition::Absolute);
        assert_eq!(pass.anchors()[0].threshold.value(), 5.0);
        assert!(pass.limits()[0].is_min());
        assert_eq!(pass.limits()[0].value, 50.0);
    }

    #[test]
    fn test_anchor_defaults() {
        let anchor = Anchor::from_options(&AnchorOptions::default()).unwrap();
        assert_eq!(anchor.kind, AnchorType::Width);
        assert_eq!(anchor.position, AnchorPosition::Relative);
        assert_eq!(anchor.threshold.value(), 0.0);
    }

    #[test]
    fn test_unknown_anchor_type() {
        assert!(serde_json::from_str::<AnchorOptions>(r#"{"type": "diagonal"}"#).is_err());
    }
}
