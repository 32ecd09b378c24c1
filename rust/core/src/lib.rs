// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorplan-Lite Core
//!
//! Turns unreliable vision-model output into a consistent floor plan model.
//!
//! ## Overview
//!
//! - **Normalization**: cut the JSON payload out of fenced or chatty text
//! - **Validation/repair**: coerce whatever parsed into walls and rooms,
//!   assigning ids and defaulting bad coordinates instead of failing
//! - **Anomaly detection**: flag near-duplicate parallel walls
//! - **Extraction**: run the whole chain against a [`VisionModel`] and
//!   report a degraded model instead of an error when the model misbehaves
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use floorplan_lite_core::{extract_file, ExtractOptions};
//!
//! let extraction = extract_file(&client, "floorplan.png", &ExtractOptions::default())?;
//! println!("{}", extraction.summary());
//! for pair in &extraction.anomalies {
//!     println!("possible duplicate: {}", pair);
//! }
//! ```

pub mod anomaly;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod payload;
pub mod persist;
pub mod types;
pub mod validate;

pub use anomaly::{
    find_close_parallel_pairs, find_close_parallel_pairs_with, AnomalyConfig, ParallelCriterion,
    DEFAULT_CROSS_TOLERANCE, DEFAULT_DISTANCE_THRESHOLD,
};
pub use error::{Error, Result, VisionError};
pub use extract::{
    extract, extract_file, extract_from_response, DegradedCause, ExtractOptions, Extraction,
    ExtractionOutcome, ExtractionSummary, VisionModel, FLOORPLAN_INSTRUCTION,
};
pub use normalize::normalize_response;
pub use payload::{ImagePayload, MediaType};
pub use persist::{load_model, model_from_json, model_to_json, save_model};
pub use types::{
    AnomalyPair, FloorplanModel, ModelBounds, Point2D, RoomLabel, WallSegment, WallStyle,
};
pub use validate::{
    coerce_f64, validate_model, validate_model_with_report, wall_id, FallbackIds, ValidationReport,
};
