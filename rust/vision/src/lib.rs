// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorplan-Lite Vision
//!
//! Everything that touches the outside world around extraction:
//!
//! - [`AnthropicClient`]: the [`VisionModel`](floorplan_lite_core::VisionModel)
//!   backed by the Anthropic Messages API
//! - [`VisionConfig`]: credentials and model settings from the environment
//! - [`ImageEnvelope`]: base64 JSON wrapper around an image file
//! - [`render_model`]: PNG preview of an extracted model

pub mod client;
pub mod config;
pub mod envelope;
pub mod render;

pub use client::{build_request_body, parse_response_text, AnthropicClient, API_VERSION};
pub use config::{ConfigError, VisionConfig, API_KEY_VAR, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
pub use envelope::ImageEnvelope;
pub use render::{
    load_label_font, render_model, render_model_with_labels, save_rendering, RenderOptions,
    MAX_CANVAS_EDGE,
};
