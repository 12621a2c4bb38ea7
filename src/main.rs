use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spotter::video::{CameraSource, VideoWindow};
use spotter::{
    App, AudioSource, Config, Detector, HttpDetector, ItemCatalog, Microphone, Transcriber,
};

/// Spotter - voice-directed object spotlight for live video
#[derive(Parser)]
#[command(name = "spotter", version, about)]
struct Cli {
    /// Path to config file (default: ~/.config/spotter/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index
    #[arg(long, env = "SPOTTER_CAMERA_INDEX")]
    camera: Option<u32>,

    /// Inference server base URL
    #[arg(long, env = "SPOTTER_DETECTOR_URL")]
    detector_url: Option<String>,

    /// Initial focus label; skips the startup voice prompt
    #[arg(short, long)]
    focus: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Print the detector's label vocabulary
    Labels,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,spotter=info",
        1 => "info,spotter=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(index) = cli.camera {
        config.camera.index = index;
    }
    if let Some(url) = &cli.detector_url {
        config.detector.url = url.clone();
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::Labels => list_labels(&config).await,
        };
    }

    tracing::info!(
        camera = config.camera.index,
        detector = %config.detector.url,
        "starting spotter"
    );

    // Camera first: no frame source means nothing else matters
    let mut camera = CameraSource::open(config.camera.index)?;

    let detector = HttpDetector::new(&config.detector.url, config.detector.min_confidence)?;
    let catalog = Arc::new(ItemCatalog::new(detector.labels().await?));
    tracing::info!(
        items = catalog.sorted_labels().join(", "),
        "items the detector can focus on"
    );

    let transcriber: Arc<dyn Transcriber> = Arc::new(config.transcriber()?);
    let audio: Arc<dyn AudioSource> = Arc::new(Microphone::new()?);
    let settings = config.voice_settings();

    let initial = match &cli.focus {
        Some(label) => catalog
            .resolve(label)
            .ok_or_else(|| anyhow::anyhow!("'{label}' is not a detector label"))?
            .to_string(),
        None => {
            App::prompt_initial_focus(audio.as_ref(), transcriber.as_ref(), &catalog, &settings)
                .await?
        }
    };
    tracing::info!(focus = %initial, "focus set");
    tracing::info!("press 'q' to quit, 'f' to change focus");

    let mut window = VideoWindow::open(
        "spotter (q=quit, f=change focus)",
        camera.width(),
        camera.height(),
    )?;

    let app = App::new(&initial, catalog, audio, transcriber, settings);
    app.run(&mut camera, &detector, &mut window).await?;

    Ok(())
}

/// Record from the microphone once and report what was heard
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Recording for up to {duration} seconds... speak now");

    let mic = Microphone::new()?;
    let window = Duration::from_secs(duration);

    match mic.capture_utterance(window, window).await? {
        Some(clip) => {
            println!(
                "Captured {:.1}s of speech ({} samples at {} Hz)",
                clip.duration_secs(),
                clip.samples().len(),
                clip.sample_rate()
            );
        }
        None => println!("No speech detected"),
    }

    Ok(())
}

/// Fetch and print the detector's vocabulary
async fn list_labels(config: &Config) -> anyhow::Result<()> {
    let detector = HttpDetector::new(&config.detector.url, config.detector.min_confidence)?;
    let catalog = ItemCatalog::new(detector.labels().await?);

    println!("Items the detector can focus on:");
    println!("{}", catalog.sorted_labels().join(", "));

    Ok(())
}
