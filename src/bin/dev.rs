//! Colorize Display - Development entry point
//!
//! Runs the display against a local JSON feature file instead of a browser
//! session and prints the resulting render props.
//!
//! Usage:
//! ```bash
//! cargo run --bin colorize_dev -- --features genes.json \
//!     [--config props.json] [--region ctgA:1-50000]
//! ```
//!
//! `genes.json` holds an array of features (`refName`, `start`, `end`,
//! `name`, ...). `props.json` holds display properties, e.g.
//! `{"palette": "Set1", "missing.attribute": "bucket"}`.

use anyhow::{bail, Context, Result};
use colorize_display::colorize::palettes::format_hex_color;
use colorize_display::colorize::{ColorizeDisplay, PluginDescriptor};
use colorize_display::config::DisplayConfig;
use colorize_display::host::{
    Feature, GetFeaturesArgs, Region, RendererConfig, RpcChannel, StaticBaseDisplay, TrackConfig,
    ViewState,
};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const TRACK_ID: &str = "dev_track";

/// Serves features from memory, filtered to the requested regions
struct FileRpc {
    features: Vec<Feature>,
}

impl FileRpc {
    fn overlaps(feature: &Feature, regions: &[Region]) -> bool {
        let ref_name = feature.get("refName").and_then(|v| v.as_str());
        let start = feature.get("start").and_then(|v| v.as_u64());
        let end = feature.get("end").and_then(|v| v.as_u64());

        match (ref_name, start, end) {
            (Some(ref_name), Some(start), Some(end)) => regions
                .iter()
                .any(|r| r.ref_name == ref_name && start < r.end && end > r.start),
            // Features without coordinates are always shown
            _ => true,
        }
    }
}

impl RpcChannel for FileRpc {
    fn call(
        &self,
        session_id: &str,
        method: &str,
        args: GetFeaturesArgs,
    ) -> BoxFuture<'static, colorize_display::colorize::Result<Vec<Feature>>> {
        info!(session_id, method, regions = args.regions.len(), "serving features");
        let feats: Vec<Feature> = self
            .features
            .iter()
            .filter(|f| Self::overlaps(f, &args.regions))
            .cloned()
            .collect();
        future::ready(Ok(feats)).boxed()
    }
}

struct Args {
    features: String,
    config: Option<String>,
    region: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut features = None;
    let mut config = None;
    let mut region = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--features" if i + 1 < args.len() => {
                features = Some(args[i + 1].clone());
                i += 2;
            }
            "--config" if i + 1 < args.len() => {
                config = Some(args[i + 1].clone());
                i += 2;
            }
            "--region" if i + 1 < args.len() => {
                region = Some(args[i + 1].clone());
                i += 2;
            }
            other => bail!("Unexpected argument '{}'", other),
        }
    }

    Ok(Args {
        features: features.context("--features <file.json> is required")?,
        config,
        region,
    })
}

/// Region spanning every feature on the first reference sequence seen
fn covering_region(features: &[Feature]) -> Option<Region> {
    let ref_name = features
        .iter()
        .find_map(|f| f.get("refName").and_then(|v| v.as_str()))?;

    let (start, end) = features
        .iter()
        .filter(|f| f.get("refName").and_then(|v| v.as_str()) == Some(ref_name))
        .filter_map(|f| Some((f.get("start")?.as_u64()?, f.get("end")?.as_u64()?)))
        .fold((u64::MAX, 0), |(lo, hi), (s, e)| (lo.min(s), hi.max(e)));

    (start <= end).then(|| Region::new("", ref_name, start, end))
}

fn log_phase(start: Instant, phase: &str) {
    info!("[PHASE @{:.3}s] {}", start.elapsed().as_secs_f64(), phase);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let start = Instant::now();
    let plugin = PluginDescriptor::colorize();
    info!("{} v{}", plugin.name, plugin.version);

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;

    log_phase(start, "Loading features and configuration");
    let raw = std::fs::read_to_string(&args.features)
        .with_context(|| format!("Failed to read {}", args.features))?;
    let features: Vec<Feature> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of features", args.features))?;

    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path))?;
            DisplayConfig::from_json_str(&raw)?
        }
        None => DisplayConfig::default(),
    };

    let region = match &args.region {
        Some(locstring) => locstring.parse::<Region>()?,
        None => covering_region(&features)
            .context("No --region given and features carry no coordinates")?,
    };
    info!(
        features = features.len(),
        region = %format!("{}:{}-{}", region.ref_name, region.start, region.end),
        "loaded"
    );

    log_phase(start, "Attaching display");
    let base = StaticBaseDisplay::new(
        RendererConfig::new()
            .with_slot("color1", "goldenrod")
            .with_slot("displayMode", "normal")
            .with_slot("maxHeight", 1200),
    )
    .with_prop("rpcDriverName", "MainThreadRpcDriver");
    let mut display = ColorizeDisplay::new(TRACK_ID, base, config);

    let (view_tx, view_rx) = watch::channel(ViewState::default());
    let mut state_rx = display.subscribe();
    display.attach(view_rx, Arc::new(FileRpc { features }));

    let track = TrackConfig::new(TRACK_ID)
        .with_slot("adapter", json!({"type": "FromConfigAdapter"}));
    view_tx.send_replace(ViewState::ready(vec![region], track));

    log_phase(start, "Waiting for features");
    tokio::time::timeout(FETCH_TIMEOUT, state_rx.changed())
        .await
        .context("Timed out waiting for features")??;

    if let Some(error) = display.error() {
        bail!("Fetching features failed: {}", error);
    }

    log_phase(start, "Composing render props");
    let assignment = display.color_assignment();
    for (category, color) in assignment.entries() {
        info!("  {:<24} {}", category.to_string(), format_hex_color(color));
    }

    let props = display.render_props();
    println!("{}", serde_json::to_string_pretty(&props)?);

    display.detach();
    log_phase(start, "Done");
    Ok(())
}
