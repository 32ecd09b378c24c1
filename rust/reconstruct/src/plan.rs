// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall plans: the reconstructor's input
//!
//! Two JSON shapes are accepted:
//!
//! ```json
//! {"walls": [{"id": "ext_top", "type": "exterior", "start": [0, 20], "end": [24, 20]}],
//!  "metadata": {"units": "feet", "width": 24, "height": 20}}
//! ```
//!
//! and the extraction output (`wall_id`, `start_point`, `end_point`).
//!
//! Endpoints are read more strictly than during model validation. An
//! endpoint that is absent, `null` or empty becomes `None` and the
//! reconstructor skips that wall. One that is present but unusable (a
//! short array, a non-numeric coordinate) makes the whole plan invalid.

use crate::error::ReconstructError;
use floorplan_lite_core::{
    coerce_f64, wall_id, FallbackIds, FloorplanModel, Point2D, WallSegment, WallStyle,
};
use serde_json::{Map, Value};
use std::path::Path;

/// One wall to reconstruct
#[derive(Debug, Clone, PartialEq)]
pub struct WallSpec {
    pub id: String,
    pub start: Option<Point2D>,
    pub end: Option<Point2D>,
    pub style: Option<WallStyle>,
}

impl From<&WallSegment> for WallSpec {
    fn from(wall: &WallSegment) -> Self {
        Self {
            id: wall.id.clone(),
            start: Some(wall.start),
            end: Some(wall.end),
            style: wall.style_tag,
        }
    }
}

/// Optional plan description carried next to the walls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanMetadata {
    pub units: Option<String>,
    pub width: Option<f64>,
    /// Used as the target wall height when present
    pub height: Option<f64>,
    pub description: Option<String>,
}

/// Ordered walls plus metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallPlan {
    pub walls: Vec<WallSpec>,
    pub metadata: PlanMetadata,
}

impl WallPlan {
    pub fn from_model(model: &FloorplanModel) -> Self {
        Self {
            walls: model.walls.iter().map(WallSpec::from).collect(),
            metadata: PlanMetadata::default(),
        }
    }
}

/// Parse a wall plan from JSON text
pub fn parse_wall_plan(json: &str) -> Result<WallPlan, ReconstructError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| ReconstructError::InvalidPlan(e.to_string()))?;
    let root = value
        .as_object()
        .ok_or_else(|| ReconstructError::InvalidPlan("top-level value must be an object".into()))?;

    let walls = match root.get("walls") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => plan_walls(entries)?,
        Some(_) => return Err(ReconstructError::InvalidPlan("\"walls\" must be an array".into())),
    };

    let metadata = root
        .get("metadata")
        .and_then(Value::as_object)
        .map(plan_metadata)
        .unwrap_or_default();

    Ok(WallPlan { walls, metadata })
}

/// Read and parse a wall plan file
pub fn load_wall_plan(path: impl AsRef<Path>) -> Result<WallPlan, ReconstructError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ReconstructError::MissingPlan(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path).map_err(|source| ReconstructError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_wall_plan(&json)
}

fn plan_walls(entries: &[Value]) -> Result<Vec<WallSpec>, ReconstructError> {
    let mut fallback_ids = FallbackIds::new(
        entries
            .iter()
            .filter_map(Value::as_object)
            .filter_map(wall_id),
    );

    let mut walls = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            tracing::warn!(index, "Skipping wall entry that is not an object");
            continue;
        };
        let id = wall_id(obj).unwrap_or_else(|| fallback_ids.assign(index));
        walls.push(wall_entry(obj, id)?);
    }
    Ok(walls)
}

fn wall_entry(obj: &Map<String, Value>, id: String) -> Result<WallSpec, ReconstructError> {
    let start = plan_point(obj.get("start").or_else(|| obj.get("start_point")))
        .map_err(|reason| invalid_endpoint(&id, "start", reason))?;
    let end = plan_point(obj.get("end").or_else(|| obj.get("end_point")))
        .map_err(|reason| invalid_endpoint(&id, "end", reason))?;

    Ok(WallSpec {
        id,
        start,
        end,
        style: obj
            .get("type")
            .or_else(|| obj.get("style"))
            .and_then(Value::as_str)
            .map(WallStyle::from_tag),
    })
}

fn invalid_endpoint(id: &str, which: &str, reason: &str) -> ReconstructError {
    ReconstructError::InvalidPlan(format!("wall '{}': {} point {}", id, which, reason))
}

/// `Ok(None)` for a missing endpoint, `Err` for one that cannot be used
fn plan_point(value: Option<&Value>) -> Result<Option<Point2D>, &'static str> {
    let (x, y) = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) if items.is_empty() => return Ok(None),
        Some(Value::Object(p)) if p.is_empty() => return Ok(None),
        Some(Value::Array(items)) => match (items.first(), items.get(1)) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err("needs two coordinates"),
        },
        Some(Value::Object(p)) => match (p.get("x"), p.get("y")) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err("needs both x and y"),
        },
        Some(_) => return Err("must be an array or an object"),
    };

    match (coerce_f64(x), coerce_f64(y)) {
        (Some(x), Some(y)) => Ok(Some(Point2D::new(x, y))),
        _ => Err("has a non-numeric coordinate"),
    }
}

fn plan_metadata(obj: &Map<String, Value>) -> PlanMetadata {
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    let number = |key: &str| obj.get(key).and_then(coerce_f64);

    PlanMetadata {
        units: text("units"),
        width: number("width"),
        height: number("height"),
        description: text("description"),
    }
}
