// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Near-duplicate wall detection
//!
//! The vision model sometimes reports both strokes of a double-drawn line
//! as two walls. This pass flags such pairs: walls that are (near-)parallel
//! and whose midpoints are close. It never merges anything; the pairs are
//! diagnostics for whoever consumes the model.
//!
//! Every unordered pair is compared, which is fine for the tens to low
//! hundreds of walls a floor plan produces.

use crate::types::{AnomalyPair, WallSegment};
use nalgebra::Vector2;

/// Default midpoint distance below which parallel walls are flagged
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 10.0;

/// Default bound on `|d1 x d2|` for two directions to count as parallel
pub const DEFAULT_CROSS_TOLERANCE: f64 = 1.0;

/// How two wall directions are judged parallel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParallelCriterion {
    /// `|d1.x * d2.y - d1.y * d2.x| < tolerance` on the raw direction
    /// vectors. Scale dependent: long walls must be much closer to parallel
    /// than short ones.
    AbsoluteCross(f64),
    /// Angle between the directions (either orientation) below the given
    /// number of radians. Zero-length walls count as parallel to anything.
    Angular(f64),
}

impl ParallelCriterion {
    pub fn is_parallel(&self, d1: &Vector2<f64>, d2: &Vector2<f64>) -> bool {
        match *self {
            ParallelCriterion::AbsoluteCross(tolerance) => d1.perp(d2).abs() < tolerance,
            ParallelCriterion::Angular(max_angle) => {
                let (n1, n2) = (d1.norm(), d2.norm());
                if n1 < f64::EPSILON || n2 < f64::EPSILON {
                    return true;
                }
                // |sin θ| of the unit directions, folded so opposite
                // orientations compare equal
                let sin = (d1.perp(d2) / (n1 * n2)).abs().min(1.0);
                sin.asin() < max_angle
            }
        }
    }
}

impl Default for ParallelCriterion {
    fn default() -> Self {
        ParallelCriterion::AbsoluteCross(DEFAULT_CROSS_TOLERANCE)
    }
}

/// Configuration for anomaly detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyConfig {
    /// Midpoint distance threshold, in model units
    pub distance_threshold: f64,
    pub parallel: ParallelCriterion,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            parallel: ParallelCriterion::default(),
        }
    }
}

/// Find close parallel wall pairs using the absolute cross-product test
pub fn find_close_parallel_pairs(walls: &[WallSegment], distance_threshold: f64) -> Vec<AnomalyPair> {
    find_close_parallel_pairs_with(
        walls,
        &AnomalyConfig {
            distance_threshold,
            ..AnomalyConfig::default()
        },
    )
}

/// Find close parallel wall pairs with an explicit configuration.
///
/// Pairs come out in enumeration order: `(i, j)` with `i < j`, outer loop
/// over `i`.
pub fn find_close_parallel_pairs_with(
    walls: &[WallSegment],
    config: &AnomalyConfig,
) -> Vec<AnomalyPair> {
    let mut pairs = Vec::new();

    for i in 0..walls.len() {
        let d1 = walls[i].direction();
        let m1 = walls[i].midpoint();

        for j in (i + 1)..walls.len() {
            let d2 = walls[j].direction();
            if !config.parallel.is_parallel(&d1, &d2) {
                continue;
            }

            let distance = m1.distance_to(&walls[j].midpoint());
            if distance < config.distance_threshold {
                pairs.push(AnomalyPair {
                    wall_a: walls[i].id.clone(),
                    wall_b: walls[j].id.clone(),
                    distance,
                });
            }
        }
    }

    if !pairs.is_empty() {
        tracing::debug!(count = pairs.len(), "Found close parallel wall pairs");
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point2D;
    use approx::assert_relative_eq;

    fn make_wall(id: &str, x1: f64, y1: f64, x2: f64, y2: f64) -> WallSegment {
        WallSegment::new(id, Point2D::new(x1, y1), Point2D::new(x2, y2))
    }

    #[test]
    fn test_identical_walls_distance_zero() {
        let walls = vec![
            make_wall("a", 0.0, 0.0, 100.0, 0.0),
            make_wall("b", 0.0, 0.0, 100.0, 0.0),
        ];
        let pairs = find_close_parallel_pairs(&walls, DEFAULT_DISTANCE_THRESHOLD);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].wall_a, "a");
        assert_eq!(pairs[0].wall_b, "b");
        assert_eq!(pairs[0].distance, 0.0);
    }

    #[test]
    fn test_double_drawn_line() {
        let walls = vec![
            make_wall("a", 0.0, 0.0, 100.0, 0.0),
            make_wall("b", 0.0, 5.0, 100.0, 5.0),
        ];
        let pairs = find_close_parallel_pairs(&walls, 10.0);
        assert_eq!(pairs.len(), 1);
        assert_relative_eq!(pairs[0].distance, 5.0);

        // Threshold is strict
        assert!(find_close_parallel_pairs(&walls, 5.0).is_empty());
    }

    #[test]
    fn test_opposite_orientation_is_parallel() {
        let walls = vec![
            make_wall("a", 0.0, 0.0, 100.0, 0.0),
            make_wall("b", 100.0, 2.0, 0.0, 2.0),
        ];
        assert_eq!(find_close_parallel_pairs(&walls, 10.0).len(), 1);
    }

    #[test]
    fn test_non_parallel_walls() {
        let walls = vec![
            make_wall("h", 0.0, 0.0, 10.0, 0.0),
            make_wall("v", 5.0, -5.0, 5.0, 5.0),
            make_wall("d", 0.0, 0.0, 10.0, 10.0),
        ];
        assert!(find_close_parallel_pairs(&walls, 100.0).is_empty());
    }

    #[test]
    fn test_absolute_cross_is_scale_dependent() {
        // 1 unit of drift over 100 units: cross = 100*1 - 0 = 100 -> not parallel
        let long = vec![
            make_wall("a", 0.0, 0.0, 100.0, 0.0),
            make_wall("b", 0.0, 1.0, 100.0, 2.0),
        ];
        assert!(find_close_parallel_pairs(&long, 10.0).is_empty());

        // Same angle on short walls: cross = 1*0.01 = 0.01 -> parallel
        let short = vec![
            make_wall("a", 0.0, 0.0, 1.0, 0.0),
            make_wall("b", 0.0, 1.0, 1.0, 1.01),
        ];
        assert_eq!(find_close_parallel_pairs(&short, 10.0).len(), 1);
    }

    #[test]
    fn test_angular_criterion() {
        let walls = vec![
            make_wall("a", 0.0, 0.0, 100.0, 0.0),
            make_wall("b", 0.0, 1.0, 100.0, 2.0),
        ];
        let config = AnomalyConfig {
            distance_threshold: 10.0,
            parallel: ParallelCriterion::Angular(0.02),
        };
        assert_eq!(find_close_parallel_pairs_with(&walls, &config).len(), 1);

        let strict = AnomalyConfig {
            parallel: ParallelCriterion::Angular(0.001),
            ..config
        };
        assert!(find_close_parallel_pairs_with(&walls, &strict).is_empty());
    }

    #[test]
    fn test_pair_order_follows_enumeration() {
        let walls = vec![
            make_wall("w1", 0.0, 0.0, 10.0, 0.0),
            make_wall("w2", 0.0, 1.0, 10.0, 1.0),
            make_wall("w3", 0.0, 2.0, 10.0, 2.0),
        ];
        let pairs = find_close_parallel_pairs(&walls, 10.0);
        let ids: Vec<_> = pairs
            .iter()
            .map(|p| (p.wall_a.as_str(), p.wall_b.as_str()))
            .collect();
        assert_eq!(ids, [("w1", "w2"), ("w1", "w3"), ("w2", "w3")]);
    }

    #[test]
    fn test_zero_length_wall_is_parallel_to_everything() {
        let walls = vec![
            make_wall("dot", 5.0, 0.0, 5.0, 0.0),
            make_wall("v", 5.0, -1.0, 5.0, 1.0),
        ];
        assert_eq!(find_close_parallel_pairs(&walls, 1.0).len(), 1);
    }
}
