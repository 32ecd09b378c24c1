// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model files on disk
//!
//! Written as indented JSON with `walls` and `rooms` first and the degraded
//! fields only when present. Reading goes through the validator, so a
//! hand-edited file is repaired the same way a model response is.

use crate::error::{Error, Result};
use crate::types::FloorplanModel;
use crate::validate::validate_model;
use std::path::Path;

/// Serialize a model as indented JSON
pub fn model_to_json(model: &FloorplanModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// Parse and validate a model from JSON text
pub fn model_from_json(json: &str) -> Result<FloorplanModel> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(validate_model(&value))
}

/// Write a model to `path`
pub fn save_model(model: &FloorplanModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut json = model_to_json(model)?;
    json.push('\n');
    std::fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), walls = model.walls.len(), rooms = model.rooms.len(), "Saved model");
    Ok(())
}

/// Read and validate a model from `path`
pub fn load_model(path: impl AsRef<Path>) -> Result<FloorplanModel> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    model_from_json(&json)
}
