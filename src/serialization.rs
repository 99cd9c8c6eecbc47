//! Serialized pattern documents.
//!
//! A pattern is a map of panel records plus a list of stitches. Panel records
//! hold their vertices once and refer to them from edges by index, so shared
//! vertices survive a round trip. Curvature parameters are stored in the
//! chord-relative frame of their edge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Curvature of a serialized edge, `{"type": ..., "params": ...}` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum CurvatureRecord {
    /// Straight edge. Usually omitted altogether.
    Line,
    /// One relative control point `[fx, fy]`.
    Quadratic(Vec<[f64; 2]>),
    /// Two relative control points.
    Cubic(Vec<[f64; 2]>),
    /// `[radius, large_arc_flag, right_flag]`, flags encoded as 0 or 1.
    Circle([f64; 3]),
}

/// Optional properties attached to a serialized edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature: Option<CurvatureRecord>,
}

/// An edge of a panel record: two indices into the panel's vertex list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub endpoints: [usize; 2],
    #[serde(flatten)]
    pub properties: EdgeProperties,
}

/// A panel placed in 3D space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRecord {
    /// World translation `[x, y, z]`.
    pub translation: [f64; 3],
    /// XYZ Euler angles in degrees.
    pub rotation: [f64; 3],
    pub vertices: Vec<[f64; 2]>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One side of a stitch: an edge of a named panel, by geometric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchEnd {
    pub panel: String,
    pub edge: usize,
}

impl StitchEnd {
    #[must_use]
    pub fn new(panel: impl Into<String>, edge: usize) -> Self {
        Self {
            panel: panel.into(),
            edge,
        }
    }
}

const RIGHT_WRONG: &str = "right_wrong";

/// A pair of stitched edges.
///
/// Serialized as `[{panel, edge}, {panel, edge}]` with a trailing
/// `"right_wrong"` marker when the fabric sides are connected right to wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<StitchItem>", try_from = "Vec<StitchItem>")]
pub struct StitchRecord {
    pub ends: [StitchEnd; 2],
    pub right_wrong: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StitchItem {
    End(StitchEnd),
    Marker(String),
}

impl From<StitchRecord> for Vec<StitchItem> {
    fn from(record: StitchRecord) -> Self {
        let [a, b] = record.ends;
        let mut items = vec![StitchItem::End(a), StitchItem::End(b)];
        if record.right_wrong {
            items.push(StitchItem::Marker(RIGHT_WRONG.to_owned()));
        }
        items
    }
}

impl TryFrom<Vec<StitchItem>> for StitchRecord {
    type Error = String;

    fn try_from(items: Vec<StitchItem>) -> std::result::Result<Self, Self::Error> {
        let mut ends = Vec::with_capacity(2);
        let mut right_wrong = false;
        for item in items {
            match item {
                StitchItem::End(end) => ends.push(end),
                StitchItem::Marker(m) if m == RIGHT_WRONG => right_wrong = true,
                StitchItem::Marker(m) => return Err(format!("unknown stitch marker '{m}'")),
            }
        }
        let ends: [StitchEnd; 2] = ends
            .try_into()
            .map_err(|v: Vec<StitchEnd>| format!("stitch needs 2 ends, got {}", v.len()))?;
        Ok(Self { ends, right_wrong })
    }
}

/// A complete serialized pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub panels: BTreeMap<String, PanelRecord>,
    #[serde(default)]
    pub stitches: Vec<StitchRecord>,
}

impl PatternRecord {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a pattern from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid pattern document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
