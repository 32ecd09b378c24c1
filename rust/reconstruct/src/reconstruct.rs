// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Replay a wall plan into a host document
//!
//! Everything happens inside one transaction:
//!
//! 1. Find the level at the base elevation, or create `Auto_Level_<elev>`
//! 2. Pick the hinted wall type, or fall back to the first one
//! 3. Create one wall per plan entry (entries without both endpoints are
//!    skipped with a warning)
//! 4. Apply the target height where the host exposes the parameter
//!
//! Any host error in 1-3 rolls the whole batch back. A failed height
//! update is logged and recorded per wall, never fatal.

use crate::error::ReconstructError;
use crate::host::{BoundLine, GeometryHost, Level, WallHandle, WallType};
use crate::plan::{WallPlan, WallSpec};
use floorplan_lite_core::FloorplanModel;
use serde::Serialize;

/// Height every wall is created with before the target height is applied
pub const DEFAULT_INSTANCE_HEIGHT: f64 = 10.0;

/// Elevation match tolerance when looking up an existing level
pub const LEVEL_TOLERANCE: f64 = 1e-6;

/// Transaction name shown in the host's undo history
pub const TRANSACTION_NAME: &str = "Create walls from JSON";

/// Reconstruction parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructOptions {
    /// Elevation of the base level and of every wall curve
    pub elevation: f64,
    /// Unconnected height to apply after creation
    pub target_height: Option<f64>,
    /// Preferred wall type name
    pub wall_type_hint: Option<String>,
    pub default_height: f64,
    pub level_tolerance: f64,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            elevation: 0.0,
            target_height: None,
            wall_type_hint: None,
            default_height: DEFAULT_INSTANCE_HEIGHT,
            level_tolerance: LEVEL_TOLERANCE,
        }
    }
}

impl ReconstructOptions {
    /// Defaults with the plan's metadata height as target height
    pub fn for_plan(plan: &WallPlan) -> Self {
        Self {
            target_height: plan.metadata.height,
            ..Self::default()
        }
    }
}

/// What happened to the requested target height of one wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightOutcome {
    NotRequested,
    Applied,
    /// The host has no usable height parameter; the default height stays
    Unavailable,
}

/// Mapping from a plan wall id to the host element created for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructedWall {
    pub source_id: String,
    pub host_id: WallHandle,
    pub height: HeightOutcome,
}

/// Result of one committed reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// Created walls in creation order
    pub walls: Vec<ReconstructedWall>,
    pub level: Level,
    pub level_created: bool,
    pub wall_type: WallType,
    /// Ids of plan entries skipped for missing endpoints
    pub skipped: Vec<String>,
}

/// Deterministic name for an automatically created level. Elevations are
/// in model units, so the name carries no unit suffix.
pub fn auto_level_name(elevation: f64) -> String {
    format!("Auto_Level_{:.2}", elevation)
}

/// Reconstruct a validated model's walls
pub fn reconstruct_model<H: GeometryHost + ?Sized>(
    model: &FloorplanModel,
    options: &ReconstructOptions,
    host: &mut H,
) -> Result<Reconstruction, ReconstructError> {
    let walls: Vec<WallSpec> = model.walls.iter().map(WallSpec::from).collect();
    reconstruct(&walls, options, host)
}

/// Create host walls for `walls` in a single all-or-nothing transaction
pub fn reconstruct<H: GeometryHost + ?Sized>(
    walls: &[WallSpec],
    options: &ReconstructOptions,
    host: &mut H,
) -> Result<Reconstruction, ReconstructError> {
    host.begin_transaction(TRANSACTION_NAME)?;

    let result: Result<Reconstruction, ReconstructError> = match create_walls(walls, options, host) {
        Ok(reconstruction) => host.commit().map(|_| reconstruction).map_err(Into::into),
        Err(e) => Err(e),
    };

    match result {
        Ok(reconstruction) => {
            tracing::info!(
                created = reconstruction.walls.len(),
                skipped = reconstruction.skipped.len(),
                level = %reconstruction.level.name,
                wall_type = %reconstruction.wall_type.name,
                "Created {} walls",
                reconstruction.walls.len()
            );
            Ok(reconstruction)
        }
        Err(e) => {
            if let Err(rollback_err) = host.rollback() {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            tracing::warn!(error = %e, "Reconstruction rolled back");
            Err(e)
        }
    }
}

fn create_walls<H: GeometryHost + ?Sized>(
    walls: &[WallSpec],
    options: &ReconstructOptions,
    host: &mut H,
) -> Result<Reconstruction, ReconstructError> {
    let (level, level_created) = base_level(host, options)?;
    let wall_type = pick_wall_type(host, options.wall_type_hint.as_deref())?;

    let mut created = Vec::with_capacity(walls.len());
    let mut skipped = Vec::new();

    for entry in walls {
        let (Some(start), Some(end)) = (entry.start, entry.end) else {
            tracing::warn!(wall = %entry.id, "Skipping wall: missing start/end");
            skipped.push(entry.id.clone());
            continue;
        };

        let curve = BoundLine::from_plan(start, end, options.elevation);
        let handle = host.create_wall(&curve, wall_type.id, level.id, options.default_height)?;

        let height = match options.target_height {
            None => HeightOutcome::NotRequested,
            Some(h) => match host.set_wall_height(handle, h) {
                Ok(()) => HeightOutcome::Applied,
                Err(e) => {
                    tracing::warn!(wall = %entry.id, error = %e, "Could not set wall height");
                    HeightOutcome::Unavailable
                }
            },
        };

        tracing::debug!(wall = %entry.id, host_id = %handle, "Created wall");
        created.push(ReconstructedWall {
            source_id: entry.id.clone(),
            host_id: handle,
            height,
        });
    }

    Ok(Reconstruction {
        walls: created,
        level,
        level_created,
        wall_type,
        skipped,
    })
}

fn base_level<H: GeometryHost + ?Sized>(
    host: &mut H,
    options: &ReconstructOptions,
) -> Result<(Level, bool), ReconstructError> {
    if let Some(level) = host.find_level(options.elevation, options.level_tolerance) {
        return Ok((level, false));
    }
    let level = host.create_level(options.elevation, &auto_level_name(options.elevation))?;
    tracing::debug!(level = %level.name, elevation = level.elevation, "Created base level");
    Ok((level, true))
}

fn pick_wall_type<H: GeometryHost + ?Sized>(
    host: &H,
    preferred: Option<&str>,
) -> Result<WallType, ReconstructError> {
    let mut types = host.list_wall_types();
    if types.is_empty() {
        return Err(ReconstructError::NoWallTypes);
    }

    if let Some(name) = preferred {
        if let Some(pos) = types.iter().position(|t| t.name == name) {
            return Ok(types.swap_remove(pos));
        }
        tracing::warn!(preferred = name, fallback = %types[0].name, "Wall type not found, using first available");
    }
    Ok(types.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use floorplan_lite_core::Point2D;

    fn plan_wall(id: &str, start: Option<(f64, f64)>, end: Option<(f64, f64)>) -> WallSpec {
        WallSpec {
            id: id.to_string(),
            start: start.map(|(x, y)| Point2D::new(x, y)),
            end: end.map(|(x, y)| Point2D::new(x, y)),
            style: None,
        }
    }

    #[test]
    fn test_auto_level_name() {
        assert_eq!(auto_level_name(0.0), "Auto_Level_0.00");
        assert_eq!(auto_level_name(3.456), "Auto_Level_3.46");
        assert!(!auto_level_name(10.0).ends_with("ft"));
    }

    #[test]
    fn test_existing_level_reused() {
        let mut host = MemoryHost::new()
            .with_wall_type("Generic", 0.2)
            .with_level("Ground", 0.0);
        let walls = [plan_wall("w1", Some((0.0, 0.0)), Some((5.0, 0.0)))];

        let result = reconstruct(&walls, &ReconstructOptions::default(), &mut host).unwrap();
        assert!(!result.level_created);
        assert_eq!(result.level.name, "Ground");
        assert_eq!(host.levels().len(), 1);
    }

    #[test]
    fn test_wall_type_hint() {
        let mut host = MemoryHost::new()
            .with_wall_type("Generic - 8\"", 0.667)
            .with_wall_type("Exterior - Brick", 1.0);
        let walls = [plan_wall("w1", Some((0.0, 0.0)), Some((5.0, 0.0)))];

        let options = ReconstructOptions {
            wall_type_hint: Some("Exterior - Brick".into()),
            ..ReconstructOptions::default()
        };
        let result = reconstruct(&walls, &options, &mut host).unwrap();
        assert_eq!(result.wall_type.name, "Exterior - Brick");

        let options = ReconstructOptions {
            wall_type_hint: Some("Missing".into()),
            ..ReconstructOptions::default()
        };
        let result = reconstruct(&walls, &options, &mut host).unwrap();
        assert_eq!(result.wall_type.name, "Generic - 8\"");
    }

    #[test]
    fn test_no_wall_types_is_fatal() {
        let mut host = MemoryHost::new();
        let walls = [plan_wall("w1", Some((0.0, 0.0)), Some((5.0, 0.0)))];

        let err = reconstruct(&walls, &ReconstructOptions::default(), &mut host).unwrap_err();
        assert!(matches!(err, ReconstructError::NoWallTypes));
        // level creation was rolled back as well
        assert!(host.levels().is_empty());
        assert!(!host.in_transaction());
    }

    #[test]
    fn test_missing_endpoints_skipped() {
        let mut host = MemoryHost::new().with_wall_type("Generic", 0.2);
        let walls = [
            plan_wall("a", Some((0.0, 0.0)), Some((5.0, 0.0))),
            plan_wall("b", Some((0.0, 0.0)), None),
            plan_wall("c", None, None),
            plan_wall("d", Some((5.0, 0.0)), Some((5.0, 5.0))),
        ];

        let result = reconstruct(&walls, &ReconstructOptions::default(), &mut host).unwrap();
        let ids: Vec<_> = result.walls.iter().map(|w| w.source_id.as_str()).collect();
        assert_eq!(ids, ["a", "d"]);
        assert_eq!(result.skipped, ["b".to_string(), "c".to_string()]);
        assert_eq!(host.walls().len(), 2);
    }

    #[test]
    fn test_heights() {
        let mut host = MemoryHost::new().with_wall_type("Generic", 0.2);
        let walls = [plan_wall("a", Some((0.0, 0.0)), Some((5.0, 0.0)))];

        let result = reconstruct(&walls, &ReconstructOptions::default(), &mut host).unwrap();
        assert_eq!(result.walls[0].height, HeightOutcome::NotRequested);
        assert_eq!(host.walls()[0].height, DEFAULT_INSTANCE_HEIGHT);

        let options = ReconstructOptions {
            target_height: Some(20.0),
            ..ReconstructOptions::default()
        };
        let result = reconstruct(&walls, &options, &mut host).unwrap();
        assert_eq!(result.walls[0].height, HeightOutcome::Applied);
        assert_eq!(host.wall(result.walls[0].host_id).unwrap().height, 20.0);
    }

    #[test]
    fn test_height_failure_is_swallowed() {
        let mut host = MemoryHost::new()
            .with_wall_type("Generic", 0.2)
            .without_height_parameter();
        let walls = [
            plan_wall("a", Some((0.0, 0.0)), Some((5.0, 0.0))),
            plan_wall("b", Some((5.0, 0.0)), Some((5.0, 5.0))),
        ];
        let options = ReconstructOptions {
            target_height: Some(20.0),
            ..ReconstructOptions::default()
        };

        let result = reconstruct(&walls, &options, &mut host).unwrap();
        assert_eq!(result.walls.len(), 2);
        assert!(result
            .walls
            .iter()
            .all(|w| w.height == HeightOutcome::Unavailable));
        assert!(host.walls().iter().all(|w| w.height == DEFAULT_INSTANCE_HEIGHT));
    }

    #[test]
    fn test_zero_length_wall_rolls_back() {
        let mut host = MemoryHost::new().with_wall_type("Generic", 0.2);
        let walls = [
            plan_wall("a", Some((0.0, 0.0)), Some((5.0, 0.0))),
            plan_wall("dot", Some((1.0, 1.0)), Some((1.0, 1.0))),
        ];

        let err = reconstruct(&walls, &ReconstructOptions::default(), &mut host).unwrap_err();
        assert!(matches!(err, ReconstructError::Host(_)));
        assert!(host.walls().is_empty());
    }
}
