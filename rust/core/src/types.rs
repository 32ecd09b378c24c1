// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for the extracted floor plan model

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (other.to_nalgebra() - self.to_nalgebra()).norm()
    }
}

/// Informational wall category carried through from script input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WallStyle {
    Exterior,
    Interior,
    Unknown,
}

impl WallStyle {
    /// Parse a free-form tag; anything unrecognised maps to `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "exterior" | "ext" | "outer" => WallStyle::Exterior,
            "interior" | "int" | "inner" | "partition" => WallStyle::Interior,
            _ => WallStyle::Unknown,
        }
    }
}

/// One architectural wall as a straight 2D segment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallSegment {
    #[serde(rename = "wall_id")]
    pub id: String,
    #[serde(rename = "start_point")]
    pub start: Point2D,
    #[serde(rename = "end_point")]
    pub end: Point2D,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub style_tag: Option<WallStyle>,
}

impl WallSegment {
    pub fn new(id: impl Into<String>, start: Point2D, end: Point2D) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            style_tag: None,
        }
    }

    pub fn with_style(mut self, style: WallStyle) -> Self {
        self.style_tag = Some(style);
        self
    }

    /// Direction vector `end - start` (zero for degenerate walls)
    pub fn direction(&self) -> Vector2<f64> {
        self.end.to_nalgebra() - self.start.to_nalgebra()
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}

/// Named point marking a room's approximate centre. No boundary is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomLabel {
    #[serde(rename = "room_name")]
    pub name: String,
    #[serde(rename = "center_point")]
    pub center: Point2D,
}

impl RoomLabel {
    pub fn new(name: impl Into<String>, center: Point2D) -> Self {
        Self {
            name: name.into(),
            center,
        }
    }
}

/// Validated floor plan: ordered walls and rooms.
///
/// `error` and `raw_response` are only populated for a degraded model, in
/// which case both sequences are empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FloorplanModel {
    #[serde(default)]
    pub walls: Vec<WallSegment>,
    #[serde(default)]
    pub rooms: Vec<RoomLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl FloorplanModel {
    pub fn new(walls: Vec<WallSegment>, rooms: Vec<RoomLabel>) -> Self {
        Self {
            walls,
            rooms,
            error: None,
            raw_response: None,
        }
    }

    /// Schema-valid but empty model carrying the failure description and
    /// the unparsed text verbatim.
    pub fn degraded(error: impl Into<String>, raw_response: Option<String>) -> Self {
        Self {
            walls: Vec::new(),
            rooms: Vec::new(),
            error: Some(error.into()),
            raw_response,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Axis-aligned bounds of all wall endpoints and room centres
    pub fn bounds(&self) -> Option<ModelBounds> {
        let points = self
            .walls
            .iter()
            .flat_map(|w| [w.start, w.end])
            .chain(self.rooms.iter().map(|r| r.center));

        let mut bounds: Option<ModelBounds> = None;
        for p in points {
            let b = bounds.get_or_insert(ModelBounds {
                min_x: p.x,
                min_y: p.y,
                max_x: p.x,
                max_y: p.y,
            });
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        bounds
    }
}

/// Bounds of the model footprint in input coordinate units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A pair of near-parallel, nearby walls that are likely one physical wall
/// detected twice. Advisory only; never written into the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnomalyPair {
    pub wall_a: String,
    pub wall_b: String,
    /// Distance between the two walls' midpoints
    pub distance: f64,
}

impl fmt::Display for AnomalyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {} ({:.3})", self.wall_a, self.wall_b, self.distance)
    }
}
