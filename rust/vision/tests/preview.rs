// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Offline extraction, rendering and envelope round trips

use floorplan_lite_core::{extract_file, ExtractOptions, ImagePayload, VisionError, VisionModel};
use floorplan_lite_vision::{
    build_request_body, parse_response_text, render_model, ImageEnvelope, RenderOptions,
    VisionConfig,
};

/// Replays a canned Messages API body instead of calling the network
struct CannedApi {
    body: String,
}

impl VisionModel for CannedApi {
    fn describe(&self, _image: &ImagePayload, _instruction: &str) -> Result<String, VisionError> {
        parse_response_text(&self.body)
    }
}

fn canned(text: &str) -> CannedApi {
    let body = serde_json::json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
    });
    CannedApi {
        body: body.to_string(),
    }
}

fn write_png(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("plan.png");
    image::RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn fenced_api_reply_becomes_model_and_preview() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());
    let api = canned(
        "Here is the data:\n```json\n{\"walls\": [\
         {\"wall_id\": \"wall_1\", \"start_point\": {\"x\": 0, \"y\": 0}, \"end_point\": {\"x\": 40, \"y\": 0}},\
         {\"wall_id\": \"wall_2\", \"start_point\": {\"x\": 0, \"y\": 3}, \"end_point\": {\"x\": 40, \"y\": 3}}],\
         \"rooms\": [{\"room_name\": \"Hall\", \"center_point\": {\"x\": 20, \"y\": 20}}]}\n```",
    );

    let extraction = extract_file(&api, &image, &ExtractOptions::default()).unwrap();
    assert!(!extraction.outcome.is_degraded());
    assert_eq!(extraction.model().walls.len(), 2);
    assert_eq!(extraction.anomalies.len(), 1);

    let img = render_model(extraction.model(), &extraction.anomalies, &RenderOptions::default());
    assert_eq!(img.dimensions(), (141, 121));
    // both walls are flagged and drawn orange
    assert_eq!(*img.get_pixel(70, 50), image::Rgb([255, 140, 0]));
}

#[test]
fn empty_api_reply_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());
    let api = CannedApi {
        body: r#"{"content": []}"#.into(),
    };

    let extraction = extract_file(&api, &image, &ExtractOptions::default()).unwrap();
    assert!(extraction.outcome.is_degraded());
    assert!(extraction.model().walls.is_empty());
    assert!(extraction.model().error.is_some());
}

#[test]
fn envelope_carries_request_payload() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_png(dir.path());

    let envelope = ImageEnvelope::from_path(&image).unwrap();
    let out = dir.path().join("plan.json");
    envelope.save(&out).unwrap();

    let reloaded: ImageEnvelope =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(reloaded, envelope);

    let payload = reloaded.decode().unwrap();
    let body = build_request_body(&VisionConfig::new("k"), &payload, "x");
    assert_eq!(body["messages"][0]["content"][0]["source"]["data"], envelope.data.as_str());
}
