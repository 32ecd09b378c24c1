// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan-Lite CLI
//!
//! ## Commands
//!
//! - `extract`: floor plan image to validated model JSON via the vision model
//! - `build`: wall plan or model JSON to walls in a host document (OBJ output)
//! - `render`: model JSON to a PNG preview
//! - `encode`: image to a base64 JSON envelope, no model call

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use floorplan_lite_core::{
    extract_file, find_close_parallel_pairs_with, load_model, save_model, AnomalyConfig,
    ExtractOptions, ParallelCriterion, DEFAULT_CROSS_TOLERANCE, DEFAULT_DISTANCE_THRESHOLD,
};
use floorplan_lite_reconstruct::{
    load_wall_plan, reconstruct, MemoryHost, ObjHost, ReconstructOptions, Reconstruction,
};
use floorplan_lite_vision::{
    save_rendering, AnthropicClient, ImageEnvelope, RenderOptions, VisionConfig,
};
use std::path::{Path, PathBuf};

/// Wall types the build host starts with: (name, width in model units)
const HOST_WALL_TYPES: &[(&str, f64)] = &[
    ("Generic - 8\"", 0.667),
    ("Exterior - Brick on CMU", 1.208),
    ("Interior - 4 7/8\" Partition", 0.406),
];

#[derive(Parser)]
#[command(name = "floorplan-lite")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Floor plan extraction and wall reconstruction", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract walls and rooms from a floor plan image
    Extract {
        /// Floor plan image (png, jpg, gif, webp)
        image: PathBuf,

        /// Output model JSON (default: image path with .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        anomaly: AnomalyArgs,

        /// Skip the near-duplicate wall check
        #[arg(long)]
        no_anomalies: bool,

        /// Also write a PNG preview of the extracted model
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Font for room names in the preview
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Create walls from a wall plan or extracted model and export OBJ
    Build {
        /// Wall plan or model JSON
        plan: PathBuf,

        /// Output mesh (default: plan path with .obj extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base level elevation
        #[arg(long, default_value = "0.0")]
        elevation: f64,

        /// Wall height (default: plan metadata height, if any)
        #[arg(long)]
        height: Option<f64>,

        /// Preferred wall type name
        #[arg(long)]
        wall_type: Option<String>,
    },

    /// Draw a model as a PNG
    Render {
        /// Model JSON
        model: PathBuf,

        /// Output image (default: model path with .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pixels per model unit
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// Margin in pixels
        #[arg(long, default_value = "50")]
        padding: u32,

        /// Font for room names (names are omitted without one)
        #[arg(long)]
        font: Option<PathBuf>,

        #[command(flatten)]
        anomaly: AnomalyArgs,
    },

    /// Wrap an image as base64 JSON without calling the model
    Encode {
        image: PathBuf,

        /// Output JSON (default: <image stem>.envelope.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct AnomalyArgs {
    /// Midpoint distance below which parallel walls are flagged
    #[arg(long, default_value_t = DEFAULT_DISTANCE_THRESHOLD)]
    threshold: f64,

    /// Use an angular parallelism test with this tolerance in degrees
    #[arg(long)]
    angle_tolerance: Option<f64>,
}

impl AnomalyArgs {
    fn config(&self) -> AnomalyConfig {
        AnomalyConfig {
            distance_threshold: self.threshold,
            parallel: match self.angle_tolerance {
                Some(deg) => ParallelCriterion::Angular(deg.to_radians()),
                None => ParallelCriterion::AbsoluteCross(DEFAULT_CROSS_TOLERANCE),
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,floorplan_lite_core=debug,floorplan_lite_reconstruct=debug,floorplan_lite_vision=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            image,
            output,
            anomaly,
            no_anomalies,
            preview,
            font,
        } => {
            let output = output.unwrap_or_else(|| image.with_extension("json"));
            let options = ExtractOptions {
                detect_anomalies: !no_anomalies,
                anomaly: anomaly.config(),
                instruction: None,
            };
            let render = RenderOptions {
                label_font: font,
                ..RenderOptions::default()
            };
            run_extract(&image, &output, &options, preview.as_deref(), &render)
        }
        Commands::Build {
            plan,
            output,
            elevation,
            height,
            wall_type,
        } => {
            let output = output.unwrap_or_else(|| plan.with_extension("obj"));
            run_build(&plan, &output, elevation, height, wall_type).map(|_| ())
        }
        Commands::Render {
            model,
            output,
            scale,
            padding,
            font,
            anomaly,
        } => {
            let output = output.unwrap_or_else(|| model.with_extension("png"));
            let options = RenderOptions {
                scale,
                padding,
                label_font: font,
                ..RenderOptions::default()
            };
            run_render(&model, &output, &options, &anomaly.config())
        }
        Commands::Encode { image, output } => {
            let output = output.unwrap_or_else(|| default_envelope_path(&image));
            run_encode(&image, &output)
        }
    }
}

/// Envelope output next to the image, distinct from the extracted model's
/// `<stem>.json`
fn default_envelope_path(image: &Path) -> PathBuf {
    image.with_extension("envelope.json")
}

fn run_extract(
    image: &Path,
    output: &Path,
    options: &ExtractOptions,
    preview: Option<&Path>,
    render: &RenderOptions,
) -> Result<()> {
    // Fail on a missing image before any credential or network work
    if !image.is_file() {
        anyhow::bail!("Input file not found: {}", image.display());
    }
    tracing::info!(
        image = %image.display(),
        output = %output.display(),
        detect_anomalies = options.detect_anomalies,
        "Extracting floor plan"
    );
    let config = VisionConfig::from_env()?;
    let client = AnthropicClient::new(config)?;

    let extraction = extract_file(&client, image, options)?;
    save_model(extraction.model(), output)
        .with_context(|| format!("Failed to write model to {}", output.display()))?;

    println!("{}", extraction.summary());
    for pair in &extraction.anomalies {
        println!("  possible duplicate: {}", pair);
    }
    if let Some(cause) = extraction.outcome.cause() {
        println!("Warning: {}", cause);
    }
    println!("JSON saved to: {}", output.display());

    if let Some(preview) = preview {
        save_rendering(
            extraction.model(),
            &extraction.anomalies,
            render,
            preview,
        )?;
        println!("Image saved to: {}", preview.display());
    }
    Ok(())
}

fn build_host() -> ObjHost {
    let document = HOST_WALL_TYPES
        .iter()
        .fold(MemoryHost::new(), |host, (name, width)| {
            host.with_wall_type(name, *width)
        });
    ObjHost::new(document)
}

fn run_build(
    plan_path: &Path,
    output: &Path,
    elevation: f64,
    height: Option<f64>,
    wall_type: Option<String>,
) -> Result<Reconstruction> {
    tracing::info!(
        plan = %plan_path.display(),
        output = %output.display(),
        elevation,
        "Building walls from plan"
    );
    let plan = load_wall_plan(plan_path)?;
    let options = ReconstructOptions {
        elevation,
        target_height: height.or(plan.metadata.height),
        wall_type_hint: wall_type,
        ..ReconstructOptions::default()
    };

    let mut host = build_host();
    let result = reconstruct(&plan.walls, &options, &mut host)?;
    host.write_obj(output)?;

    println!(
        "Created {} walls on '{}' using '{}'",
        result.walls.len(),
        result.level.name,
        result.wall_type.name
    );
    if !result.skipped.is_empty() {
        println!("Skipped (missing start/end): {}", result.skipped.join(", "));
    }
    println!("OBJ saved to: {}", output.display());
    Ok(result)
}

fn run_render(
    model_path: &Path,
    output: &Path,
    options: &RenderOptions,
    anomaly: &AnomalyConfig,
) -> Result<()> {
    tracing::info!(
        model = %model_path.display(),
        output = %output.display(),
        labels = options.label_font.is_some(),
        "Rendering model"
    );
    let model = load_model(model_path)?;
    let anomalies = find_close_parallel_pairs_with(&model.walls, anomaly);
    save_rendering(&model, &anomalies, options, output)?;

    println!(
        "Rendered {} walls, {} rooms ({} flagged pairs)",
        model.walls.len(),
        model.rooms.len(),
        anomalies.len()
    );
    println!("Image saved to: {}", output.display());
    Ok(())
}

fn run_encode(image: &Path, output: &Path) -> Result<()> {
    tracing::info!(image = %image.display(), output = %output.display(), "Encoding image");
    let envelope = ImageEnvelope::from_path(image)?;
    envelope.save(output)?;
    println!(
        "Encoded {} ({} bytes, {})",
        envelope.filename,
        envelope.size_bytes,
        envelope.media_type.as_str()
    );
    println!("JSON saved to: {}", output.display());
    Ok(())
}
