// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh host: walls become extruded boxes written as Wavefront OBJ

use super::{
    BoundLine, GeometryHost, HostError, HostWall, Level, LevelId, MemoryHost, WallHandle,
    WallType, WallTypeId,
};
use crate::error::ReconstructError;
use nalgebra::{Point3, Vector3};
use std::fmt::Write as _;
use std::path::Path;

/// Host that stores elements like [`MemoryHost`] and can export them as a
/// mesh. Each wall is its location curve swept sideways by the wall type
/// width and extruded upward by the wall height.
#[derive(Debug, Clone, Default)]
pub struct ObjHost {
    document: MemoryHost,
}

impl ObjHost {
    pub fn new(document: MemoryHost) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &MemoryHost {
        &self.document
    }

    /// Render committed walls as OBJ text (Y-up, one object per level)
    pub fn to_obj(&self) -> String {
        let mut out = String::new();
        let mut levels = self.document.levels();
        levels.sort_by(|a, b| a.elevation.total_cmp(&b.elevation));

        let _ = writeln!(out, "# Generated by floorplan-lite");
        let _ = writeln!(
            out,
            "# {} walls on {} levels",
            self.document.walls().len(),
            levels.len()
        );
        let _ = writeln!(out, "# Coordinate system: Y-up (OBJ convention)");

        let mut vertex_offset = 0usize;
        for level in &levels {
            let walls: Vec<&HostWall> = self
                .document
                .walls()
                .iter()
                .filter(|w| w.level == level.id)
                .collect();
            if walls.is_empty() {
                continue;
            }

            let _ = writeln!(out);
            let _ = writeln!(out, "o {}", level.name);
            for wall in walls {
                let width = self
                    .document
                    .wall_type(wall.wall_type)
                    .map(|t| t.width)
                    .unwrap_or(0.0);
                let corners = wall_box(wall, width);

                let _ = writeln!(out, "g wall_{}", wall.handle);
                // Z-up to Y-up: (x, y, z) -> (x, z, -y)
                for p in &corners {
                    let _ = writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.z, -p.y);
                }
                for face in BOX_FACES {
                    let _ = writeln!(
                        out,
                        "f {} {} {} {}",
                        face[0] + vertex_offset + 1,
                        face[1] + vertex_offset + 1,
                        face[2] + vertex_offset + 1,
                        face[3] + vertex_offset + 1
                    );
                }
                vertex_offset += corners.len();
            }
        }

        out
    }

    pub fn write_obj(&self, path: impl AsRef<Path>) -> Result<(), ReconstructError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_obj()).map_err(|source| ReconstructError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), walls = self.document.walls().len(), "Wrote OBJ");
        Ok(())
    }
}

/// Quads over the 8 box corners: bottom ring 0..4, top ring 4..8, both
/// counter-clockwise seen from above
const BOX_FACES: [[usize; 4]; 6] = [
    [4, 5, 6, 7], // top
    [3, 2, 1, 0], // bottom
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

fn wall_box(wall: &HostWall, width: f64) -> [Point3<f64>; 8] {
    let start = wall.curve.start;
    let end = wall.curve.end;
    let dir = end - start;
    let len = dir.norm();

    let half = if len > f64::EPSILON {
        Vector3::new(-dir.y / len, dir.x / len, 0.0) * (width / 2.0)
    } else {
        Vector3::zeros()
    };
    let up = Vector3::new(0.0, 0.0, wall.height);

    let base = [start - half, end - half, end + half, start + half];
    [
        base[0],
        base[1],
        base[2],
        base[3],
        base[0] + up,
        base[1] + up,
        base[2] + up,
        base[3] + up,
    ]
}

impl GeometryHost for ObjHost {
    fn levels(&self) -> Vec<Level> {
        self.document.levels()
    }

    fn create_level(&mut self, elevation: f64, name: &str) -> Result<Level, HostError> {
        self.document.create_level(elevation, name)
    }

    fn list_wall_types(&self) -> Vec<WallType> {
        self.document.list_wall_types()
    }

    fn create_wall(
        &mut self,
        curve: &BoundLine,
        wall_type: WallTypeId,
        level: LevelId,
        default_height: f64,
    ) -> Result<WallHandle, HostError> {
        self.document
            .create_wall(curve, wall_type, level, default_height)
    }

    fn set_wall_height(&mut self, wall: WallHandle, height: f64) -> Result<(), HostError> {
        self.document.set_wall_height(wall, height)
    }

    fn begin_transaction(&mut self, name: &str) -> Result<(), HostError> {
        self.document.begin_transaction(name)
    }

    fn commit(&mut self) -> Result<(), HostError> {
        self.document.commit()
    }

    fn rollback(&mut self) -> Result<(), HostError> {
        self.document.rollback()
    }
}
