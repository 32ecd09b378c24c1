// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema validation and repair
//!
//! Turns any parsed JSON value into a [`FloorplanModel`]. The output always
//! has both sequences; individual records are repaired rather than dropped:
//!
//! - missing wall ids become `wall_<n>` (1-based position in the input
//!   array, moved past any id already taken)
//! - coordinates are coerced to `f64`, anything unusable becomes `0.0`
//! - room names are upper-cased, missing ones become `UNKNOWN`
//! - entries that are not JSON objects are skipped

use crate::types::{FloorplanModel, Point2D, RoomLabel, WallSegment, WallStyle};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

/// Name given to rooms that arrive without one
pub const UNKNOWN_ROOM: &str = "UNKNOWN";

/// What the repair pass had to do to produce the model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Wall entries skipped because they were not objects
    pub walls_skipped: usize,
    /// Room entries skipped because they were not objects
    pub rooms_skipped: usize,
    /// Walls that received a generated `wall_<n>` id
    pub ids_assigned: usize,
    /// Rooms that received the `UNKNOWN` name
    pub names_defaulted: usize,
    /// Individual coordinates that were missing or not numeric
    pub coordinates_defaulted: usize,
    /// Wall ids that occur more than once
    pub duplicate_ids: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Validate and repair a parsed value into a model
pub fn validate_model(value: &Value) -> FloorplanModel {
    validate_model_with_report(value).0
}

/// Same as [`validate_model`], also returning what was repaired
pub fn validate_model_with_report(value: &Value) -> (FloorplanModel, ValidationReport) {
    let mut report = ValidationReport::default();

    let Some(root) = value.as_object() else {
        tracing::debug!("Top-level value is not an object, returning empty model");
        return (FloorplanModel::default(), report);
    };

    let walls = validate_walls(root.get("walls"), &mut report);
    let rooms = validate_rooms(root.get("rooms"), &mut report);

    let mut model = FloorplanModel::new(walls, rooms);
    model.error = root.get("error").and_then(Value::as_str).map(str::to_string);
    model.raw_response = root
        .get("raw_response")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !report.duplicate_ids.is_empty() {
        tracing::warn!(duplicates = ?report.duplicate_ids, "Duplicate wall ids in model");
    }
    tracing::debug!(
        walls = model.walls.len(),
        rooms = model.rooms.len(),
        walls_skipped = report.walls_skipped,
        rooms_skipped = report.rooms_skipped,
        ids_assigned = report.ids_assigned,
        coordinates_defaulted = report.coordinates_defaulted,
        "Validated floor plan model"
    );

    (model, report)
}

fn validate_walls(value: Option<&Value>, report: &mut ValidationReport) -> Vec<WallSegment> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut walls = Vec::with_capacity(entries.len());
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut fallback_ids = FallbackIds::new(
        entries
            .iter()
            .filter_map(Value::as_object)
            .filter_map(wall_id),
    );

    for (index, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            report.walls_skipped += 1;
            continue;
        };

        let id = match wall_id(obj) {
            Some(id) => {
                if !seen.insert(id.clone()) && !report.duplicate_ids.contains(&id) {
                    report.duplicate_ids.push(id.clone());
                }
                id
            }
            None => {
                report.ids_assigned += 1;
                fallback_ids.assign(index)
            }
        };

        let start = point_field(obj, "start_point", "start", report);
        let end = point_field(obj, "end_point", "end", report);
        let style_tag = obj
            .get("type")
            .or_else(|| obj.get("style"))
            .and_then(Value::as_str)
            .map(WallStyle::from_tag);

        walls.push(WallSegment {
            id,
            start,
            end,
            style_tag,
        });
    }

    walls
}

fn validate_rooms(value: Option<&Value>, report: &mut ValidationReport) -> Vec<RoomLabel> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut rooms = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(obj) = entry.as_object() else {
            report.rooms_skipped += 1;
            continue;
        };

        let name = obj
            .get("room_name")
            .or_else(|| obj.get("name"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| {
                report.names_defaulted += 1;
                UNKNOWN_ROOM.to_string()
            });

        let center = point_field(obj, "center_point", "center", report);
        rooms.push(RoomLabel { name, center });
    }

    rooms
}

/// Generator for `wall_<n>` ids that never collide with explicit ones.
///
/// `n` starts at the 1-based array position and moves past any number
/// already taken, either by an explicit id or by an earlier assignment.
#[derive(Debug, Clone, Default)]
pub struct FallbackIds {
    taken: FxHashSet<String>,
}

impl FallbackIds {
    pub fn new<I>(explicit: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            taken: explicit.into_iter().collect(),
        }
    }

    /// Id for the entry at `index` (0-based) in its array
    pub fn assign(&mut self, index: usize) -> String {
        let mut n = index + 1;
        loop {
            let id = format!("wall_{}", n);
            if self.taken.insert(id.clone()) {
                return id;
            }
            n += 1;
        }
    }
}

/// Explicit wall id under `wall_id` or `id`, if usable
pub fn wall_id(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("wall_id").or_else(|| obj.get("id"))? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a point stored as `{"x": .., "y": ..}` or `[x, y]` under either key
fn point_field(
    obj: &Map<String, Value>,
    key: &str,
    alias: &str,
    report: &mut ValidationReport,
) -> Point2D {
    let (x, y) = match obj.get(key).or_else(|| obj.get(alias)) {
        Some(Value::Object(p)) => (p.get("x"), p.get("y")),
        Some(Value::Array(items)) => (items.first(), items.get(1)),
        _ => (None, None),
    };

    Point2D::new(coordinate(x, report), coordinate(y, report))
}

fn coordinate(value: Option<&Value>, report: &mut ValidationReport) -> f64 {
    match value.and_then(coerce_f64) {
        Some(v) => v,
        None => {
            report.coordinates_defaulted += 1;
            0.0
        }
    }
}

/// Coerce a numeric-like JSON value to a finite float
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}
