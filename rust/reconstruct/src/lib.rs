// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorplan-Lite Reconstruct
//!
//! Replays an extracted floor plan into a host CAD/BIM document.
//!
//! Walls are created on a level at a base elevation (found or created),
//! with a resolved wall type, inside a single transaction: either every
//! wall lands or none does. Hosts implement [`GeometryHost`]; two are
//! provided:
//!
//! - [`MemoryHost`]: in-memory document with fault injection
//! - [`ObjHost`]: the same document, exportable as a Wavefront OBJ mesh
//!
//! ```rust,ignore
//! use floorplan_lite_reconstruct::{load_wall_plan, reconstruct, MemoryHost, ObjHost, ReconstructOptions};
//!
//! let plan = load_wall_plan("plan.json")?;
//! let mut host = ObjHost::new(MemoryHost::new().with_wall_type("Generic - 8\"", 0.667));
//! let result = reconstruct(&plan.walls, &ReconstructOptions::for_plan(&plan), &mut host)?;
//! host.write_obj("plan.obj")?;
//! ```

pub mod error;
pub mod host;
pub mod plan;
pub mod reconstruct;

pub use error::ReconstructError;
pub use host::{
    BoundLine, GeometryHost, HostError, HostWall, Level, LevelId, MemoryHost, ObjHost, WallHandle,
    WallType, WallTypeId, SHORT_CURVE_TOLERANCE,
};
pub use plan::{load_wall_plan, parse_wall_plan, PlanMetadata, WallPlan, WallSpec};
pub use reconstruct::{
    auto_level_name, reconstruct, reconstruct_model, HeightOutcome, ReconstructOptions,
    ReconstructedWall, Reconstruction, DEFAULT_INSTANCE_HEIGHT, LEVEL_TOLERANCE, TRANSACTION_NAME,
};
