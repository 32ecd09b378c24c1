// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::host::HostError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a reconstruction or plan load
#[derive(Error, Debug)]
pub enum ReconstructError {
    #[error("No wall types defined in the host document")]
    NoWallTypes,

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Invalid wall plan: {0}")]
    InvalidPlan(String),

    #[error("Wall plan not found: {}", .0.display())]
    MissingPlan(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
