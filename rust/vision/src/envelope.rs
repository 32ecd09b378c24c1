// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Base64 image envelope, produced without any model call

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use floorplan_lite_core::{Error, ImagePayload, MediaType, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image file plus metadata as a self-contained JSON record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageEnvelope {
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub media_type: MediaType,
    /// Always `"base64"`
    pub encoding: String,
    pub data: String,
}

impl ImageEnvelope {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let payload = ImagePayload::from_path(path)?;

        Ok(Self {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_string_lossy().into_owned(),
            size_bytes: payload.bytes.len() as u64,
            media_type: payload.media_type,
            encoding: "base64".into(),
            data: STANDARD.encode(&payload.bytes),
        })
    }

    /// Decode the payload back into raw bytes
    pub fn decode(&self) -> Option<ImagePayload> {
        let bytes = STANDARD.decode(&self.data).ok()?;
        Some(ImagePayload::new(bytes, self.media_type))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = self.size_bytes, "JSON saved");
        Ok(())
    }
}
