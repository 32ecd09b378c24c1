// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raster preview of a floor plan model
//!
//! Walls are drawn as thick black lines, room centres as red dots.
//! Walls that take part in an anomaly pair are drawn in orange. Room names
//! are written in blue above their dot when a label font is available.

use ab_glyph::{Font, FontVec, PxScale};
use floorplan_lite_core::{AnomalyPair, Error, FloorplanModel, ModelBounds, Point2D, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const WALL: Rgb<u8> = Rgb([0, 0, 0]);
const ANOMALOUS_WALL: Rgb<u8> = Rgb([255, 140, 0]);
const ROOM: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL: Rgb<u8> = Rgb([0, 0, 255]);

/// Gap between a room dot and the centre of its label
const LABEL_OFFSET: f32 = 15.0;

/// Largest canvas edge in pixels; bigger plans are scaled down to fit
pub const MAX_CANVAS_EDGE: u32 = 8192;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Margin around the model footprint in pixels
    pub padding: u32,
    /// Pixels per model unit
    pub scale: f64,
    pub wall_thickness: u32,
    pub room_radius: i32,
    /// TrueType/OpenType font for room names; names are omitted without one
    pub label_font: Option<PathBuf>,
    /// Label height in pixels
    pub label_size: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            padding: 50,
            scale: 1.0,
            wall_thickness: 3,
            room_radius: 5,
            label_font: None,
            label_size: 20.0,
        }
    }
}

/// Model-to-pixel mapping
struct Viewport {
    min_x: f64,
    min_y: f64,
    scale: f64,
    padding: f64,
}

impl Viewport {
    fn project(&self, p: Point2D) -> (f32, f32) {
        (
            ((p.x - self.min_x) * self.scale + self.padding) as f32,
            ((p.y - self.min_y) * self.scale + self.padding) as f32,
        )
    }
}

/// Load a label font from disk
pub fn load_label_font(path: impl AsRef<Path>) -> Result<FontVec> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
    })
}

/// Draw `model` on a white canvas sized to its footprint plus padding,
/// without room names
pub fn render_model(
    model: &FloorplanModel,
    anomalies: &[AnomalyPair],
    options: &RenderOptions,
) -> RgbImage {
    draw_model::<FontVec>(model, anomalies, options, None)
}

/// Same as [`render_model`], writing each room name above its dot
pub fn render_model_with_labels<F: Font>(
    model: &FloorplanModel,
    anomalies: &[AnomalyPair],
    options: &RenderOptions,
    font: &F,
) -> RgbImage {
    draw_model(model, anomalies, options, Some(font))
}

fn draw_model<F: Font>(
    model: &FloorplanModel,
    anomalies: &[AnomalyPair],
    options: &RenderOptions,
    font: Option<&F>,
) -> RgbImage {
    let bounds = model.bounds().unwrap_or(ModelBounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    });

    let extent = (bounds.max_x - bounds.min_x).max(bounds.max_y - bounds.min_y);
    let available = f64::from(MAX_CANVAS_EDGE.saturating_sub(2 * options.padding).max(1));
    let mut scale = if options.scale > 0.0 { options.scale } else { 1.0 };
    if extent * scale > available {
        scale = available / extent;
        tracing::debug!(scale, "Scaled preview down to fit canvas");
    }

    let view = Viewport {
        min_x: bounds.min_x,
        min_y: bounds.min_y,
        scale,
        padding: f64::from(options.padding),
    };
    let width = ((bounds.max_x - bounds.min_x) * scale).ceil() as u32 + 2 * options.padding + 1;
    let height = ((bounds.max_y - bounds.min_y) * scale).ceil() as u32 + 2 * options.padding + 1;
    let mut canvas = RgbImage::from_pixel(width, height, WHITE);

    let flagged: FxHashSet<&str> = anomalies
        .iter()
        .flat_map(|pair| [pair.wall_a.as_str(), pair.wall_b.as_str()])
        .collect();

    for wall in &model.walls {
        let color = if flagged.contains(wall.id.as_str()) {
            ANOMALOUS_WALL
        } else {
            WALL
        };
        draw_thick_line(
            &mut canvas,
            view.project(wall.start),
            view.project(wall.end),
            options.wall_thickness,
            color,
        );
    }

    for room in &model.rooms {
        let (x, y) = view.project(room.center);
        draw_filled_circle_mut(
            &mut canvas,
            (x.round() as i32, y.round() as i32),
            options.room_radius,
            ROOM,
        );

        if let Some(font) = font {
            let scale = PxScale::from(options.label_size);
            let (x, y) = label_origin((x, y), text_size(scale, font, &room.name));
            draw_text_mut(&mut canvas, LABEL, x, y, scale, font, &room.name);
        }
    }

    canvas
}

/// Top-left corner of a label of `size` pixels centred above `dot`
fn label_origin(dot: (f32, f32), size: (u32, u32)) -> (i32, i32) {
    let (w, h) = (size.0 as f32, size.1 as f32);
    (
        (dot.0 - w / 2.0).round() as i32,
        (dot.1 - h / 2.0 - LABEL_OFFSET).round() as i32,
    )
}

/// Render and save as PNG
pub fn save_rendering(
    model: &FloorplanModel,
    anomalies: &[AnomalyPair],
    options: &RenderOptions,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let canvas = match &options.label_font {
        Some(font_path) => {
            let font = load_label_font(font_path)?;
            render_model_with_labels(model, anomalies, options, &font)
        }
        None => render_model(model, anomalies, options),
    };
    canvas
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;
    tracing::info!(
        path = %path.display(),
        width = canvas.width(),
        height = canvas.height(),
        "Image saved"
    );
    Ok(())
}

/// Parallel one-pixel segments spread across the line's normal
fn draw_thick_line(
    canvas: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt();
    let (nx, ny) = if len > f32::EPSILON {
        (-dy / len, dx / len)
    } else {
        (0.0, 0.0)
    };

    let half = thickness.max(1) as f32 / 2.0;
    let mut offset = -half + 0.5;
    while offset <= half - 0.5 + f32::EPSILON {
        let (ox, oy) = (nx * offset, ny * offset);
        draw_line_segment_mut(
            canvas,
            (start.0 + ox, start.1 + oy),
            (end.0 + ox, end.1 + oy),
            color,
        );
        offset += 0.5;
    }
}
