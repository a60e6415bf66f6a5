//! Head-less geometry renderer.
//!
//! Reads a persisted geometry record (JSON), runs it through the
//! controller exactly like the map embedding would, and prints the
//! resulting metrics as JSON. With no file argument it renders the
//! default geometry around the given center.
//!
//! ```text
//! flightzone [geometry.json] [--center LNG,LAT]
//! ```

use std::fs;

use anyhow::{bail, Context};
use tracing::info;

use flightzone::{
    init_logging, FixedViewport, Geometry, GeometryController, LngLat, RenderOptions,
};

struct Args {
    geometry_path: Option<String>,
    center: LngLat,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut geometry_path = None;
    let mut center = LngLat::new(139.7454, 35.6586);

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--center" => {
                let value = args.next().context("--center needs LNG,LAT")?;
                let (lng, lat) = value
                    .split_once(',')
                    .context("--center expects LNG,LAT")?;
                center = LngLat::new(lng.trim().parse()?, lat.trim().parse()?);
            }
            "--help" | "-h" => {
                eprintln!("usage: flightzone [geometry.json] [--center LNG,LAT]");
                std::process::exit(0);
            }
            _ if geometry_path.is_none() => geometry_path = Some(arg),
            _ => bail!("unexpected argument: {arg}"),
        }
    }
    Ok(Args {
        geometry_path,
        center,
    })
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = parse_args()?;

    let mut controller = GeometryController::new(FixedViewport::new(args.center, 15.0));

    match &args.geometry_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading geometry record {path}"))?;
            let geometry = Geometry::from_json(&json)
                .with_context(|| format!("parsing geometry record {path}"))?;
            controller.render_geometry(
                Some(geometry),
                RenderOptions {
                    fit: true,
                    clear_history: true,
                },
            );
        }
        None => {
            info!(center = ?args.center, "no record given, rendering defaults");
            controller.create_default_geometry();
        }
    }

    info!(overlays = controller.overlays().len(), "geometry rendered");
    if let Some(report) = controller.last_turn_report() {
        info!(
            rect = report.rect_bearing_deg,
            ellipse = report.ellipse_bearing_deg,
            diff = report.raw_diff_deg,
            "orientation comparison"
        );
    }

    println!("{}", serde_json::to_string_pretty(controller.metrics())?);
    Ok(())
}
