// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Anthropic Messages API client

use crate::config::VisionConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use floorplan_lite_core::{ImagePayload, VisionError, VisionModel};
use serde::Deserialize;
use serde_json::{json, Value};

pub const API_VERSION: &str = "2023-06-01";

/// Blocking vision client. One request per [`VisionModel::describe`] call,
/// no retries.
pub struct AnthropicClient {
    http: reqwest::blocking::Client,
    config: VisionConfig,
}

impl AnthropicClient {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| VisionError::Request(format!("failed to build http client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }
}

impl VisionModel for AnthropicClient {
    fn describe(&self, image: &ImagePayload, instruction: &str) -> Result<String, VisionError> {
        let body = build_request_body(&self.config, image, instruction);
        tracing::debug!(
            model = %self.config.model,
            image_bytes = image.bytes.len(),
            media_type = image.media_type.as_str(),
            "Sending vision request"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| VisionError::Request(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| VisionError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(VisionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply = parse_response_text(&text)?;
        tracing::debug!(chars = reply.len(), "Received vision response");
        Ok(reply)
    }
}

/// Messages API request with one image block followed by the instruction
pub fn build_request_body(config: &VisionConfig, image: &ImagePayload, instruction: &str) -> Value {
    json!({
        "model": config.model,
        "max_tokens": config.max_tokens,
        "messages": [{
            "role": "user",
            "content": [
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": image.media_type.as_str(),
                        "data": STANDARD.encode(&image.bytes),
                    }
                },
                {
                    "type": "text",
                    "text": instruction,
                }
            ]
        }]
    })
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Concatenate the text blocks of a Messages API response body
pub fn parse_response_text(body: &str) -> Result<String, VisionError> {
    let resp: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| VisionError::InvalidResponse(e.to_string()))?;

    let text: String = resp
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(VisionError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use floorplan_lite_core::MediaType;

    #[test]
    fn test_request_body() {
        let config = VisionConfig::new("sk-test");
        let image = ImagePayload::new(b"abc".to_vec(), MediaType::Jpeg);
        let body = build_request_body(&config, &image, "describe");

        assert_eq!(body["model"], config.model.as_str());
        assert_eq!(body["max_tokens"], 4096);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[0]["source"]["data"], "YWJj");
        assert_eq!(content[1]["text"], "describe");
        // credential never ends up in the body
        assert!(!body.to_string().contains("sk-test"));
    }

    #[test]
    fn test_parse_response_text() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"{\"walls\":"},{"type":"text","text":"[]}"}]}"#;
        assert_eq!(parse_response_text(body).unwrap(), r#"{"walls":[]}"#);
    }

    #[test]
    fn test_parse_response_errors() {
        assert_eq!(
            parse_response_text(r#"{"content":[]}"#),
            Err(VisionError::EmptyResponse)
        );
        assert_eq!(
            parse_response_text(r#"{"content":[{"type":"tool_use","id":"x"}]}"#),
            Err(VisionError::EmptyResponse)
        );
        assert!(matches!(
            parse_response_text("<html>"),
            Err(VisionError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_endpoint() {
        let mut config = VisionConfig::new("k");
        config.base_url = "http://localhost:9000".into();
        let client = AnthropicClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/messages");
    }
}
