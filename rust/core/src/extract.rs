// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction pipeline
//!
//! vision model -> normalize -> parse -> validate/repair -> anomaly pass
//!
//! Collaborator failures and unparseable responses do not produce an `Err`:
//! they yield [`ExtractionOutcome::Degraded`], which still carries a
//! schema-valid (empty) model. Only missing inputs are fatal, and those are
//! checked before the model is called.

use crate::anomaly::{find_close_parallel_pairs_with, AnomalyConfig};
use crate::error::{Result, VisionError};
use crate::normalize::normalize_response;
use crate::payload::ImagePayload;
use crate::types::{AnomalyPair, FloorplanModel};
use crate::validate::{validate_model_with_report, ValidationReport};
use std::fmt;
use std::path::Path;

/// Fixed instruction sent alongside the image
pub const FLOORPLAN_INSTRUCTION: &str = r#"Analyze this floor plan image and extract the architectural data in the following JSON format:

{
  "walls": [
    {
      "wall_id": "wall_1",
      "start_point": {"x": <float>, "y": <float>},
      "end_point": {"x": <float>, "y": <float>}
    }
  ],
  "rooms": [
    {
      "room_name": "<ROOM_TYPE>",
      "center_point": {"x": <float>, "y": <float>}
    }
  ]
}

Instructions:
1. Identify all walls and their start/end coordinates
2. Identify all rooms and their center points
3. Use appropriate room names (BEDROOM, KITCHEN, BATHROOM, LIVING ROOM, etc.)
4. Provide coordinates with decimal precision (e.g., 32.66399064)
5. Return ONLY the JSON structure, no additional text
6. Ensure all walls are numbered sequentially (wall_1, wall_2, etc.)"#;

/// Image-to-text collaborator. Implementations make one synchronous
/// request and return whatever text the model produced.
pub trait VisionModel {
    fn describe(&self, image: &ImagePayload, instruction: &str) -> std::result::Result<String, VisionError>;
}

/// Options for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Run the near-duplicate wall pass on the validated model
    pub detect_anomalies: bool,
    pub anomaly: AnomalyConfig,
    /// Replaces [`FLOORPLAN_INSTRUCTION`] when set
    pub instruction: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            detect_anomalies: true,
            anomaly: AnomalyConfig::default(),
            instruction: None,
        }
    }
}

impl ExtractOptions {
    pub fn instruction(&self) -> &str {
        self.instruction.as_deref().unwrap_or(FLOORPLAN_INSTRUCTION)
    }
}

/// Why an extraction degraded
#[derive(Debug, Clone, PartialEq)]
pub enum DegradedCause {
    /// The vision model call failed
    Collaborator(VisionError),
    /// The response could not be parsed as JSON after normalization
    MalformedResponse(String),
}

impl fmt::Display for DegradedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradedCause::Collaborator(e) => write!(f, "Vision model request failed: {}", e),
            DegradedCause::MalformedResponse(e) => write!(f, "Failed to parse response: {}", e),
        }
    }
}

/// Result of an extraction: always a model, explicitly tagged when degraded
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success(FloorplanModel),
    Degraded {
        model: FloorplanModel,
        cause: DegradedCause,
    },
}

impl ExtractionOutcome {
    fn degraded(cause: DegradedCause, raw_response: Option<String>) -> Self {
        let model = FloorplanModel::degraded(cause.to_string(), raw_response);
        ExtractionOutcome::Degraded { model, cause }
    }

    pub fn model(&self) -> &FloorplanModel {
        match self {
            ExtractionOutcome::Success(model) => model,
            ExtractionOutcome::Degraded { model, .. } => model,
        }
    }

    pub fn into_model(self) -> FloorplanModel {
        match self {
            ExtractionOutcome::Success(model) => model,
            ExtractionOutcome::Degraded { model, .. } => model,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractionOutcome::Degraded { .. })
    }

    pub fn cause(&self) -> Option<&DegradedCause> {
        match self {
            ExtractionOutcome::Success(_) => None,
            ExtractionOutcome::Degraded { cause, .. } => Some(cause),
        }
    }
}

/// Everything one extraction produced
#[derive(Debug, Clone)]
pub struct Extraction {
    pub outcome: ExtractionOutcome,
    /// Close parallel pairs (empty when the pass is disabled)
    pub anomalies: Vec<AnomalyPair>,
    pub report: ValidationReport,
}

impl Extraction {
    pub fn model(&self) -> &FloorplanModel {
        self.outcome.model()
    }

    pub fn summary(&self) -> ExtractionSummary {
        let model = self.model();
        ExtractionSummary {
            walls: model.walls.len(),
            rooms: model.rooms.len(),
            anomalies: self.anomalies.len(),
            records_skipped: self.report.walls_skipped + self.report.rooms_skipped,
            ids_assigned: self.report.ids_assigned,
            degraded: self.outcome.is_degraded(),
        }
    }
}

/// Counts reported after every run, degraded or not
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub walls: usize,
    pub rooms: usize,
    pub anomalies: usize,
    pub records_skipped: usize,
    pub ids_assigned: usize,
    pub degraded: bool,
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} walls", self.walls)?;
        writeln!(f, "Found {} rooms", self.rooms)?;
        write!(f, "Found {} close parallel wall pairs", self.anomalies)?;
        if self.records_skipped > 0 || self.ids_assigned > 0 {
            write!(
                f,
                "\nRepaired: {} records skipped, {} ids assigned",
                self.records_skipped, self.ids_assigned
            )?;
        }
        if self.degraded {
            write!(f, "\nExtraction degraded")?;
        }
        Ok(())
    }
}

/// Run the full pipeline on an in-memory image
pub fn extract<V: VisionModel + ?Sized>(
    vision: &V,
    image: &ImagePayload,
    options: &ExtractOptions,
) -> Extraction {
    tracing::info!(
        image_bytes = image.bytes.len(),
        media_type = image.media_type.as_str(),
        "Requesting floor plan description"
    );

    match vision.describe(image, options.instruction()) {
        Ok(raw) => extract_from_response(&raw, options),
        Err(e) => {
            tracing::warn!(error = %e, "Vision model call failed, returning degraded model");
            Extraction {
                outcome: ExtractionOutcome::degraded(DegradedCause::Collaborator(e), None),
                anomalies: Vec::new(),
                report: ValidationReport::default(),
            }
        }
    }
}

/// Read an image file and run the pipeline. Fails only if the file is
/// missing or unreadable; the vision model is not called in that case.
pub fn extract_file<V: VisionModel + ?Sized>(
    vision: &V,
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let image = ImagePayload::from_path(path)?;
    Ok(extract(vision, &image, options))
}

/// Run everything after the model call on raw response text
pub fn extract_from_response(raw: &str, options: &ExtractOptions) -> Extraction {
    let normalized = normalize_response(raw);

    let value: serde_json::Value = match serde_json::from_str(&normalized) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, response_len = raw.len(), "Response is not valid JSON");
            return Extraction {
                outcome: ExtractionOutcome::degraded(
                    DegradedCause::MalformedResponse(e.to_string()),
                    Some(raw.to_string()),
                ),
                anomalies: Vec::new(),
                report: ValidationReport::default(),
            };
        }
    };

    let (model, report) = validate_model_with_report(&value);

    let anomalies = if options.detect_anomalies {
        find_close_parallel_pairs_with(&model.walls, &options.anomaly)
    } else {
        Vec::new()
    };

    tracing::info!(
        walls = model.walls.len(),
        rooms = model.rooms.len(),
        anomalies = anomalies.len(),
        "Extracted floor plan model"
    );

    Extraction {
        outcome: ExtractionOutcome::Success(model),
        anomalies,
        report,
    }
}
