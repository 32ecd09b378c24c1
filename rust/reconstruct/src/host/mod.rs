// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host geometry environment
//!
//! The reconstructor only needs a handful of capabilities from a CAD/BIM
//! host: levels, wall types, wall creation, an optional height parameter,
//! and an all-or-nothing transaction. [`GeometryHost`] captures exactly
//! that, so the reconstruction algorithm stays host-agnostic.

mod memory;
mod obj;

pub use memory::{HostWall, MemoryHost};
pub use obj::ObjHost;

use floorplan_lite_core::Point2D;
use nalgebra::Point3;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Curves shorter than this are rejected by hosts as degenerate
pub const SHORT_CURVE_TOLERANCE: f64 = 1e-6;

macro_rules! element_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

element_id!(LevelId);
element_id!(WallTypeId);
element_id!(WallHandle);

/// A horizontal reference plane walls are hosted on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    pub elevation: f64,
}

/// A wall style known to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallType {
    pub id: WallTypeId,
    pub name: String,
    /// Wall thickness in model units
    pub width: f64,
}

/// Straight, bounded 3D line used as a wall location curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundLine {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl BoundLine {
    /// Lift a plan segment to the given elevation
    pub fn from_plan(start: Point2D, end: Point2D, elevation: f64) -> Self {
        Self {
            start: Point3::new(start.x, start.y, elevation),
            end: Point3::new(end.x, end.y, elevation),
        }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < SHORT_CURVE_TOLERANCE
    }
}

/// Errors raised by a host environment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Curve is too short to create a wall (length {length})")]
    DegenerateCurve { length: f64 },

    #[error("Unknown level: {0}")]
    UnknownLevel(LevelId),

    #[error("Unknown wall type: {0}")]
    UnknownWallType(WallTypeId),

    #[error("Unknown wall: {0}")]
    UnknownWall(WallHandle),

    #[error("Parameter not available: {0}")]
    ParameterUnavailable(String),

    #[error("Modification outside of a transaction")]
    NoActiveTransaction,

    #[error("Transaction '{0}' is already open")]
    TransactionActive(String),

    #[error("Host rejected operation: {0}")]
    Rejected(String),
}

/// Capabilities the reconstructor drives
pub trait GeometryHost {
    /// All levels in the document
    fn levels(&self) -> Vec<Level>;

    /// First level whose elevation is within `tolerance` of `elevation`
    fn find_level(&self, elevation: f64, tolerance: f64) -> Option<Level> {
        self.levels()
            .into_iter()
            .find(|level| (level.elevation - elevation).abs() < tolerance)
    }

    fn create_level(&mut self, elevation: f64, name: &str) -> Result<Level, HostError>;

    fn list_wall_types(&self) -> Vec<WallType>;

    fn create_wall(
        &mut self,
        curve: &BoundLine,
        wall_type: WallTypeId,
        level: LevelId,
        default_height: f64,
    ) -> Result<WallHandle, HostError>;

    /// Set the user-adjustable (unconnected) height of a wall
    fn set_wall_height(&mut self, wall: WallHandle, height: f64) -> Result<(), HostError>;

    fn begin_transaction(&mut self, name: &str) -> Result<(), HostError>;

    fn commit(&mut self) -> Result<(), HostError>;

    fn rollback(&mut self) -> Result<(), HostError>;
}
