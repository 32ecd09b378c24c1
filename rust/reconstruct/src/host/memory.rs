// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory element store with snapshot transactions

use super::{
    BoundLine, GeometryHost, HostError, Level, LevelId, WallHandle, WallType, WallTypeId,
};

/// A wall element as stored by the host
#[derive(Debug, Clone, PartialEq)]
pub struct HostWall {
    pub handle: WallHandle,
    pub curve: BoundLine,
    pub wall_type: WallTypeId,
    pub level: LevelId,
    /// Unconnected height
    pub height: f64,
}

#[derive(Debug, Clone, Default)]
struct DocumentState {
    levels: Vec<Level>,
    wall_types: Vec<WallType>,
    walls: Vec<HostWall>,
    next_id: u64,
}

impl DocumentState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Host environment held entirely in memory.
///
/// Element ids are allocated from one counter, like a CAD document's
/// element ids. Modifications require an open transaction; rollback
/// restores the state captured when it began. Faults can be injected to
/// exercise the reconstructor's error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    state: DocumentState,
    snapshot: Option<DocumentState>,
    transaction: Option<String>,
    committed: Vec<String>,
    wall_calls: usize,
    fail_wall_at: Option<usize>,
    height_parameter_missing: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wall type during document setup
    pub fn with_wall_type(mut self, name: &str, width: f64) -> Self {
        let id = WallTypeId(self.state.allocate_id());
        self.state.wall_types.push(WallType {
            id,
            name: name.to_string(),
            width,
        });
        self
    }

    /// Add a level during document setup
    pub fn with_level(mut self, name: &str, elevation: f64) -> Self {
        let id = LevelId(self.state.allocate_id());
        self.state.levels.push(Level {
            id,
            name: name.to_string(),
            elevation,
        });
        self
    }

    /// Make the `n`-th call to `create_wall` (1-based) fail
    pub fn fail_on_wall(mut self, n: usize) -> Self {
        self.fail_wall_at = Some(n);
        self
    }

    /// Behave like a host whose walls expose no user height parameter
    pub fn without_height_parameter(mut self) -> Self {
        self.height_parameter_missing = true;
        self
    }

    pub fn walls(&self) -> &[HostWall] {
        &self.state.walls
    }

    pub fn wall(&self, handle: WallHandle) -> Option<&HostWall> {
        self.state.walls.iter().find(|w| w.handle == handle)
    }

    pub fn wall_type(&self, id: WallTypeId) -> Option<&WallType> {
        self.state.wall_types.iter().find(|t| t.id == id)
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.state.levels.iter().find(|l| l.id == id)
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Names of committed transactions, oldest first
    pub fn committed_transactions(&self) -> &[String] {
        &self.committed
    }

    fn require_transaction(&self) -> Result<(), HostError> {
        if self.transaction.is_none() {
            return Err(HostError::NoActiveTransaction);
        }
        Ok(())
    }
}

impl GeometryHost for MemoryHost {
    fn levels(&self) -> Vec<Level> {
        self.state.levels.clone()
    }

    fn create_level(&mut self, elevation: f64, name: &str) -> Result<Level, HostError> {
        self.require_transaction()?;
        let level = Level {
            id: LevelId(self.state.allocate_id()),
            name: name.to_string(),
            elevation,
        };
        self.state.levels.push(level.clone());
        Ok(level)
    }

    fn list_wall_types(&self) -> Vec<WallType> {
        self.state.wall_types.clone()
    }

    fn create_wall(
        &mut self,
        curve: &BoundLine,
        wall_type: WallTypeId,
        level: LevelId,
        default_height: f64,
    ) -> Result<WallHandle, HostError> {
        self.require_transaction()?;
        self.wall_calls += 1;

        if self.fail_wall_at == Some(self.wall_calls) {
            return Err(HostError::Rejected(format!(
                "injected failure on wall creation #{}",
                self.wall_calls
            )));
        }
        if curve.is_degenerate() {
            return Err(HostError::DegenerateCurve {
                length: curve.length(),
            });
        }
        if self.wall_type(wall_type).is_none() {
            return Err(HostError::UnknownWallType(wall_type));
        }
        if self.level(level).is_none() {
            return Err(HostError::UnknownLevel(level));
        }

        let handle = WallHandle(self.state.allocate_id());
        self.state.walls.push(HostWall {
            handle,
            curve: *curve,
            wall_type,
            level,
            height: default_height,
        });
        Ok(handle)
    }

    fn set_wall_height(&mut self, wall: WallHandle, height: f64) -> Result<(), HostError> {
        self.require_transaction()?;
        if self.height_parameter_missing {
            return Err(HostError::ParameterUnavailable("unconnected height".into()));
        }
        let entry = self
            .state
            .walls
            .iter_mut()
            .find(|w| w.handle == wall)
            .ok_or(HostError::UnknownWall(wall))?;
        entry.height = height;
        Ok(())
    }

    fn begin_transaction(&mut self, name: &str) -> Result<(), HostError> {
        if let Some(open) = &self.transaction {
            return Err(HostError::TransactionActive(open.clone()));
        }
        self.snapshot = Some(self.state.clone());
        self.transaction = Some(name.to_string());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), HostError> {
        let name = self.transaction.take().ok_or(HostError::NoActiveTransaction)?;
        self.snapshot = None;
        self.committed.push(name);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), HostError> {
        self.transaction.take().ok_or(HostError::NoActiveTransaction)?;
        if let Some(snapshot) = self.snapshot.take() {
            self.state = snapshot;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_lite_core::Point2D;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundLine {
        BoundLine::from_plan(Point2D::new(x1, y1), Point2D::new(x2, y2), 0.0)
    }

    #[test]
    fn test_requires_transaction() {
        let mut host = MemoryHost::new().with_wall_type("Generic", 0.2);
        assert_eq!(
            host.create_level(0.0, "L0"),
            Err(HostError::NoActiveTransaction)
        );
    }

    #[test]
    fn test_rollback_restores_state() {
        let mut host = MemoryHost::new().with_wall_type("Generic", 0.2);
        let ty = host.list_wall_types()[0].id;

        host.begin_transaction("t1").unwrap();
        let level = host.create_level(0.0, "L0").unwrap();
        host.create_wall(&line(0.0, 0.0, 5.0, 0.0), ty, level.id, 10.0)
            .unwrap();
        assert_eq!(host.walls().len(), 1);
        host.rollback().unwrap();

        assert!(host.walls().is_empty());
        assert!(host.levels().is_empty());
        assert!(!host.in_transaction());
    }

    #[test]
    fn test_commit_keeps_state() {
        let mut host = MemoryHost::new().with_wall_type("Generic", 0.2);
        let ty = host.list_wall_types()[0].id;

        host.begin_transaction("t1").unwrap();
        let level = host.create_level(0.0, "L0").unwrap();
        let wall = host
            .create_wall(&line(0.0, 0.0, 5.0, 0.0), ty, level.id, 10.0)
            .unwrap();
        host.set_wall_height(wall, 3.0).unwrap();
        host.commit().unwrap();

        assert_eq!(host.wall(wall).unwrap().height, 3.0);
        assert_eq!(host.committed_transactions(), ["t1".to_string()]);
    }

    #[test]
    fn test_nested_transaction_rejected() {
        let mut host = MemoryHost::new();
        host.begin_transaction("outer").unwrap();
        assert_eq!(
            host.begin_transaction("inner"),
            Err(HostError::TransactionActive("outer".into()))
        );
    }

    #[test]
    fn test_degenerate_curve_rejected() {
        let mut host = MemoryHost::new().with_wall_type("Generic", 0.2).with_level("L0", 0.0);
        let ty = host.list_wall_types()[0].id;
        let level = host.levels()[0].id;

        host.begin_transaction("t").unwrap();
        let err = host
            .create_wall(&line(1.0, 1.0, 1.0, 1.0), ty, level, 10.0)
            .unwrap_err();
        assert!(matches!(err, HostError::DegenerateCurve { .. }));
    }

    #[test]
    fn test_find_level_tolerance() {
        let host = MemoryHost::new()
            .with_level("Ground", 0.0)
            .with_level("First", 3.0);

        assert_eq!(host.find_level(3.0 + 1e-9, 1e-6).unwrap().name, "First");
        assert!(host.find_level(1.5, 1e-6).is_none());
    }
}
