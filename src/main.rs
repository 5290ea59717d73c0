use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use ambient_loop::{
    config::Config,
    pipeline::AmbientEngine,
    probe::FfprobeProbe,
    render::FfmpegInvoker,
};

#[derive(Parser)]
#[command(
    name = "ambient-loop",
    version,
    about = "Render a short vertical clip and a seamlessly looped ambient video",
    long_about = "ambient-loop picks the newest video and audio file from the configured input folders, renders a short vertical clip, and renders a long video that loops the clip with a crossfade hiding the loop seam."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG directives refine the default level
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    if let Some(path) = cli.write_config {
        Config::default().save_to_file(&path)?;
        info!("Default configuration written to {:?}", path);
        return Ok(());
    }

    info!("Starting ambient-loop v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    config.validate()?;

    info!("Videos: {:?}", config.paths.video_dir);
    info!("Audio: {:?}", config.paths.audio_dir);

    let engine = AmbientEngine::new(
        config.clone(),
        Box::new(FfprobeProbe::new(config.tools.ffprobe.clone())),
        Box::new(FfmpegInvoker::new(config.tools.ffmpeg.clone())),
    );

    let report = engine.run().map_err(|e| {
        error!("{}", e.user_message());
        e
    })?;

    println!("Short: {}", report.short_output.display());
    println!("Long : {}", report.long_output.display());
    Ok(())
}
