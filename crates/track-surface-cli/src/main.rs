//! Track Surface - command-line front-end
//!
//! Reads a GPX track and a GeoJSON road network, classifies every segment of
//! the track and prints either a summary or the full report as JSON.

mod logging;
mod settings;

use clap::Parser;
use settings::Settings;
use std::io::Write;
use std::process::ExitCode;
use track_surface_lib::track::{self, BoundingBox};
use track_surface_lib::{GeoPoint, RoadNetwork, SurfaceAnalyzer, SurfaceError, SurfaceReport};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("Failed to write JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    let settings = Settings::parse();
    logging::setup_logging(settings.verbose);

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<(), CliError> {
    profiling::scope!("track_surface::run");

    let config = settings.analysis_config();
    config.validate()?;

    let points = track::load_gpx(&settings.gpx_file)?;
    tracing::info!(
        "Loaded {} points from {}",
        points.len(),
        settings.gpx_file.display()
    );

    if settings.bounds {
        let region = network_region(&points, config.match_radius_m)
            .ok_or(SurfaceError::InsufficientData { points: 0 })?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if settings.json {
            serde_json::to_writer_pretty(&mut out, &region)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{region}")?;
        }
        return Ok(());
    }

    let network = match &settings.network {
        Some(path) => {
            let network = RoadNetwork::load_geojson(path)?;
            tracing::info!(
                "Loaded {} network edges from {}",
                network.len(),
                path.display()
            );
            network
        }
        None => {
            tracing::warn!("No network given, every segment will be unknown");
            RoadNetwork::default()
        }
    };

    let report = SurfaceAnalyzer::new(config).analyze(&points, &network)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if settings.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        write_summary(&mut out, &report, settings.segments)?;
    }
    Ok(())
}

/// Region a network extract must cover so every segment can be matched
fn network_region(points: &[GeoPoint], radius_m: f64) -> Option<BoundingBox> {
    track::bounding_box(points, track::NETWORK_BUFFER_M.max(radius_m))
}

/// Human-readable report: optional segment list followed by the totals
fn write_summary<W: Write>(
    out: &mut W,
    report: &SurfaceReport,
    segments: bool,
) -> std::io::Result<()> {
    if segments {
        for (i, result) in report.results.iter().enumerate() {
            let edge = result.edge.as_ref();
            writeln!(
                out,
                "{i:>6} {:>8.1} m  {:<8} highway={} surface={} tracktype={}",
                result.segment.length_m(),
                result.classification.as_str(),
                edge.and_then(|e| e.highway.as_deref()).unwrap_or("-"),
                edge.and_then(|e| e.surface.as_deref()).unwrap_or("-"),
                edge.and_then(|e| e.tracktype.as_deref()).unwrap_or("-"),
            )?;
        }
        writeln!(out)?;
    }
    write!(out, "{}", report.stats)
}
