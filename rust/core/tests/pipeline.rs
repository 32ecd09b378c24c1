// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end checks of the extraction pipeline without a real model.

use floorplan_lite_core::{
    extract, extract_file, extract_from_response, find_close_parallel_pairs, load_model,
    model_from_json, model_to_json, normalize_response, save_model, validate_model,
    DegradedCause, Error, ExtractOptions, ImagePayload, MediaType, VisionError, VisionModel,
};
use serde_json::json;
use std::cell::Cell;

/// Sample response shaped like real model output: prose, a fence, and a
/// couple of sloppy records.
const SAMPLE_RESPONSE: &str = r#"Sure! Here is the extracted floor plan:

```json
{
  "walls": [
    {"wall_id": "wall_1", "start_point": {"x": 45.12345678, "y": 135.87654321}, "end_point": {"x": 45.12345678, "y": 797.65432109}},
    {"wall_id": "wall_2", "start_point": {"x": 45.12345678, "y": 797.65432109}, "end_point": {"x": 957.23456789, "y": 797.65432109}},
    {"start_point": {"x": "957.23456789", "y": 797.65432109}, "end_point": {"x": 957.23456789, "y": 135.87654321}},
    {"wall_id": "wall_4", "start_point": {"x": 957.23456789, "y": 135.87654321}, "end_point": {"x": 45.12345678, "y": 135.87654321}},
    {"wall_id": "wall_5", "start_point": {"x": 45.12345678, "y": 466.7654321}, "end_point": {"x": 501.18765432, "y": 466.7654321}},
    {"wall_id": "wall_5b", "start_point": {"x": 45.12345678, "y": 468.0}, "end_point": {"x": 501.18765432, "y": 468.0}}
  ],
  "rooms": [
    {"room_name": "bedroom", "center_point": {"x": 273.17901235, "y": 301.32098765}},
    {"room_name": "LIVING", "center_point": {"x": 729.21111111, "y": 301.32098765}},
    {"center_point": {"x": 273.17901235, "y": 632.22530864}}
  ]
}
```

Let me know if you need anything else."#;

struct CountingModel {
    reply: Result<String, VisionError>,
    calls: Cell<usize>,
}

impl CountingModel {
    fn new(reply: Result<&str, VisionError>) -> Self {
        Self {
            reply: reply.map(str::to_string),
            calls: Cell::new(0),
        }
    }
}

impl VisionModel for CountingModel {
    fn describe(&self, _image: &ImagePayload, _instruction: &str) -> Result<String, VisionError> {
        self.calls.set(self.calls.get() + 1);
        self.reply.clone()
    }
}

fn image() -> ImagePayload {
    ImagePayload::new(b"\x89PNG\r\n".to_vec(), MediaType::Png)
}

#[test]
fn sample_response_is_repaired() {
    let model = CountingModel::new(Ok(SAMPLE_RESPONSE));
    let extraction = extract(&model, &image(), &ExtractOptions::default());
    let plan = extraction.model();

    assert!(!extraction.outcome.is_degraded());
    assert_eq!(plan.walls.len(), 6);
    assert_eq!(plan.walls[2].id, "wall_3");
    assert_eq!(plan.walls[2].start.x, 957.23456789);
    assert_eq!(plan.rooms[0].name, "BEDROOM");
    assert_eq!(plan.rooms[2].name, "UNKNOWN");

    // wall_5 and wall_5b are the same line drawn twice
    assert_eq!(extraction.anomalies.len(), 1);
    assert_eq!(extraction.anomalies[0].wall_a, "wall_5");
    assert_eq!(extraction.anomalies[0].wall_b, "wall_5b");
}

#[test]
fn not_json_at_all_degrades_with_raw_text() {
    let model = CountingModel::new(Ok("not json at all"));
    let extraction = extract(&model, &image(), &ExtractOptions::default());
    let plan = extraction.model();

    assert!(plan.walls.is_empty());
    assert!(plan.rooms.is_empty());
    assert!(!plan.error.as_deref().unwrap_or_default().is_empty());
    assert_eq!(plan.raw_response.as_deref(), Some("not json at all"));
    assert!(matches!(
        extraction.outcome.cause(),
        Some(DegradedCause::MalformedResponse(_))
    ));
    assert!(extraction.summary().degraded);
}

#[test]
fn api_failure_degrades() {
    let model = CountingModel::new(Err(VisionError::Status {
        status: 529,
        body: "overloaded".into(),
    }));
    let extraction = extract(&model, &image(), &ExtractOptions::default());

    assert!(extraction.outcome.is_degraded());
    assert!(extraction.model().error.as_deref().unwrap().contains("529"));
    assert_eq!(extraction.summary().walls, 0);
}

#[test]
fn missing_image_fails_before_model_call() {
    let model = CountingModel::new(Ok("{}"));
    let result = extract_file(&model, "/missing/floorplan.png", &ExtractOptions::default());

    assert!(matches!(result, Err(Error::MissingInput(_))));
    assert_eq!(model.calls.get(), 0);
}

#[test]
fn extract_file_reads_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.jpg");
    std::fs::write(&path, b"fake jpeg").unwrap();

    let model = CountingModel::new(Ok(r#"{"walls": [], "rooms": []}"#));
    let extraction = extract_file(&model, &path, &ExtractOptions::default()).unwrap();

    assert_eq!(model.calls.get(), 1);
    assert!(!extraction.outcome.is_degraded());
}

#[test]
fn normalizer_returns_first_open_to_last_close() {
    let cases = [
        "{}",
        "prefix {\"a\": {\"b\": 1}} suffix",
        "```json\n{\"walls\": []}\n``` trailing } brace",
        "lead { one } mid { two } end",
    ];
    for raw in cases {
        let out = normalize_response(raw);
        assert!(out.starts_with('{'), "{raw:?} -> {out:?}");
        assert!(out.ends_with('}'), "{raw:?} -> {out:?}");
    }
    assert_eq!(
        normalize_response("lead { one } mid { two } end"),
        "{ one } mid { two }"
    );
}

#[test]
fn validation_is_a_fixed_point() {
    let first = extract_from_response(SAMPLE_RESPONSE, &ExtractOptions::default())
        .outcome
        .into_model();
    let value = serde_json::to_value(&first).unwrap();
    let second = validate_model(&value);

    assert_eq!(first, second);
}

#[test]
fn any_object_yields_both_sequences() {
    for value in [json!({}), json!({"walls": 1}), json!({"rooms": {}}), json!("text")] {
        let model = validate_model(&value);
        let json = serde_json::to_value(&model).unwrap();
        assert!(json["walls"].is_array());
        assert!(json["rooms"].is_array());
    }
}

#[test]
fn serialize_reparse_keeps_counts_and_coordinates() {
    let model = extract_from_response(SAMPLE_RESPONSE, &ExtractOptions::default())
        .outcome
        .into_model();
    let back = model_from_json(&model_to_json(&model).unwrap()).unwrap();

    assert_eq!(back.walls.len(), model.walls.len());
    assert_eq!(back.rooms.len(), model.rooms.len());
    for (a, b) in model.walls.iter().zip(&back.walls) {
        assert_eq!(a.start, b.start);
        assert_eq!(a.end, b.end);
    }
    for (a, b) in model.rooms.iter().zip(&back.rooms) {
        assert_eq!(a.center, b.center);
    }
}

#[test]
fn save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("floorplan_output.json");
    let model = extract_from_response(SAMPLE_RESPONSE, &ExtractOptions::default())
        .outcome
        .into_model();

    save_model(&model, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n  \"walls\""));

    assert_eq!(load_model(&path).unwrap(), model);
}

#[test]
fn distinct_directions_have_no_anomalies() {
    let model = validate_model(&json!({
        "walls": [
            {"start": [0, 0], "end": [10, 0]},
            {"start": [0, 0], "end": [0, 10]},
            {"start": [0, 0], "end": [10, 10]},
            {"start": [0, 0], "end": [10, -10]}
        ]
    }));
    assert!(find_close_parallel_pairs(&model.walls, 10.0).is_empty());
}
