use cuenav::{render, DefaultFetcher, Manifest, ResourceFetcher, Vault, Viewer};

use std::io;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Show a IIIF canvas and its caption cues at given playback times")]
struct Cli {
    #[arg(
        value_name = "MANIFEST",
        help = "Path or URL of the IIIF manifest."
    )]
    manifest: String,
    #[arg(
        short,
        long,
        value_name = "ID",
        help = "The canvas to show. If not supplied, the first canvas is shown."
    )]
    canvas: Option<String>,
    #[arg(
        long,
        value_name = "ID",
        help = "Use this text track instead of the canvas's first one."
    )]
    track: Option<String>,
    #[arg(
        short,
        long = "time",
        value_name = "SECONDS",
        help = "Playback time to render at. May be repeated.",
        default_value = "0",
        value_parser = parse_time
    )]
    times: Vec<f64>,
    #[arg(long, help = "Write the view as JSON instead of text.")]
    json: bool,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Give up on requests that take longer than this."
    )]
    timeout: Option<u64>,
    #[arg(short, long, help = "Log debug output to stderr.")]
    verbose: bool,
}

fn parse_time(arg: &str) -> Result<f64, String> {
    let time: f64 = arg.parse().map_err(|e| format!("{}", e))?;
    if time.is_finite() {
        Ok(time)
    } else {
        Err(format!("'{}' is not a finite number of seconds", arg))
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cuenav={}", default_level)));

    // Ignore a second initialisation rather than panic.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let fetcher = match cli.timeout {
        Some(secs) => DefaultFetcher::with_timeout(Duration::from_secs(secs)),
        None => DefaultFetcher::new(),
    }
    .context("Failed to create HTTP client")?;

    let data = fetcher
        .fetch_text(&cli.manifest)
        .await
        .context(format!("Failed to load manifest: '{}'", cli.manifest))?;
    let manifest = Manifest::from_json(&data)
        .context(format!("Failed to parse manifest: '{}'", cli.manifest))?;

    let canvas_id = match cli.canvas {
        Some(id) => id,
        None => manifest
            .canvases()
            .first()
            .map(|canvas| canvas.id.clone())
            .ok_or_else(|| anyhow!("The manifest has no canvases."))?,
    };
    if manifest.canvas(&canvas_id).is_none() {
        return Err(anyhow!("No canvas '{}' in the manifest.", canvas_id));
    }

    let mut viewer = Viewer::new();
    if let Some(request) = viewer.select_canvas(&manifest, &canvas_id) {
        let outcome = request.fetch(&fetcher).await;
        viewer.apply_load(outcome);
    }
    let current_track = viewer
        .navigator()
        .and_then(|navigator| navigator.resource_id())
        .map(String::from);
    if let Some(track) = cli.track.filter(|track| Some(track) != current_track.as_ref()) {
        let request = viewer
            .select_track(&track)
            .ok_or_else(|| anyhow!("'{}' is not a text track of canvas '{}'.", track, canvas_id))?;
        let outcome = request.fetch(&fetcher).await;
        viewer.apply_load(outcome);
    }

    for time in cli.times {
        viewer.set_current_time(time);
        let view = viewer.view(&manifest);
        if cli.json {
            serde_json::to_writer_pretty(io::stdout(), &view)?;
            println!();
        } else {
            render::serialise(&view, io::stdout())?;
        }
    }

    Ok(())
}
