// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction and persistence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Recoverable extraction failures are reported through
/// [`crate::ExtractionOutcome::Degraded`] instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the vision-model collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisionError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Response contained no text")]
    EmptyResponse,
}
