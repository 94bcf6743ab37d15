//! Eyecolor CLI: extract the dominant colors of a pair of eyes.
//!
//! Usage:
//!   eyecolor <image>                                # Whole-image palette
//!   eyecolor <image> --eye 410,520 --eye 610,515    # Eye crops
//!   eyecolor <image> --eye 410,520 --face 300,350,420,520 --json
//!   eyecolor <image> --eye 410,520 --save-crop eye.png

mod config;
mod image_loader;
mod landmarks;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eyecolor_core::{Detection, Marker, Palette, Rect};
use eyecolor_session::{MeasureTarget, MeasurementSession, PaletteMarker};
use glam::DVec2;
use serde::Serialize;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::image_loader::{load_image, save_image};
use crate::landmarks::{ManualLandmarks, parse_point, parse_rect};

#[derive(Parser, Debug)]
#[command(name = "eyecolor")]
#[command(author, version, about = "Dominant eye color extraction", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Eye centre in image pixels (top-left origin), repeatable
    #[arg(long = "eye", value_name = "X,Y", value_parser = parse_point)]
    eyes: Vec<DVec2>,

    /// Face bounds in image pixels; sizes the eye crops
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    face: Option<Rect>,

    /// Palette size (overrides EYECOLOR_MAX_COLORS)
    #[arg(long)]
    colors: Option<usize>,

    /// Keep near-white pixels
    #[arg(long)]
    keep_white: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the merged eye crop
    #[arg(long, value_name = "FILE")]
    save_crop: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Output {
    image: String,
    width: u32,
    height: u32,
    /// "eyes" or "whole_image".
    measured: &'static str,
    colors: Vec<ColorOutput>,
    /// Eye markers in view space.
    markers: Vec<Marker>,
}

#[derive(Serialize)]
struct ColorOutput {
    hex: String,
    rgb: [u8; 3],
    percent: f64,
    /// Where the color sits in the viewer, if located.
    view_position: Option<DVec2>,
    /// Decoration diameter in view units, if located.
    view_size: Option<f64>,
}

impl ColorOutput {
    fn collect(palette: &Palette, located: &[PaletteMarker]) -> Vec<Self> {
        palette
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let marker = located.iter().find(|m| m.entry == index);
                ColorOutput {
                    hex: entry.hex(),
                    rgb: [entry.color.red, entry.color.green, entry.color.blue],
                    percent: entry.dominance,
                    view_position: marker.map(|m| m.center),
                    view_size: marker.map(|m| m.size),
                }
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::default();
    if let Some(colors) = args.colors {
        config.max_colors = colors;
    }
    if args.keep_white {
        config.ignore_near_white = false;
    }

    let image = load_image(&args.image)?;
    let (width, height) = (image.width(), image.height());

    let detector = ManualLandmarks {
        eyes: args.eyes.clone(),
        bounds: args.face,
    };
    let mut session =
        MeasurementSession::new(config.session_config(), Box::new(detector), Handle::current());
    session.load_image(image)?;
    if let Detection::Found(face) = session.detect()? {
        tracing::debug!("measuring {} eye point(s)", face.points.len());
    }
    session.wait_for_palette().await?;

    if let Some(path) = &args.save_crop {
        match session.measured() {
            Some(MeasureTarget::Eyes(composite)) => {
                save_image(&composite.image, path)?;
                tracing::info!("eye crop written to {}", path.display());
            }
            _ => tracing::warn!("no eye crop was measured, not writing {}", path.display()),
        }
    }

    let palette = session.palette().cloned().unwrap_or_default();
    let output = Output {
        image: args.image.display().to_string(),
        width,
        height,
        measured: match session.measured() {
            Some(MeasureTarget::Eyes(_)) => "eyes",
            _ => "whole_image",
        },
        colors: ColorOutput::collect(&palette, &session.palette_markers()),
        markers: session.markers(),
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(path) = &args.output {
        std::fs::write(path, &output_str)?;
        tracing::info!("output written to {}", path.display());
    } else {
        println!("{output_str}");
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = format!("Image: {} ({}x{})\n", output.image, output.width, output.height);
    let measured = match output.measured {
        "eyes" => format!("{} eye(s)", output.markers.len()),
        _ => "whole image".to_string(),
    };
    s.push_str(&format!("Measured: {measured}\n"));

    if output.colors.is_empty() {
        s.push_str("\nNo colors found.\n");
        return s;
    }

    s.push_str("\nColors:\n");
    for color in &output.colors {
        s.push_str(&format!("  {}  {:5.1}%\n", color.hex, color.percent));
    }
    s
}
