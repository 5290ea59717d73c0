// Print the crossfade loop graph for a clip without running ffmpeg

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use ambient_loop::{
    config::Config,
    crossfade::{plan, CrossfadeGraphBuilder, StreamFormat},
};

#[derive(Parser)]
#[command(name = "loop-graph", about = "Show the seamless-loop filter graph for a clip duration")]
struct Args {
    /// Clip duration in seconds
    clip_duration: f64,

    /// Crossfade length in seconds (defaults to the configured value)
    #[arg(short = 'x', long)]
    crossfade: Option<f64>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print one filter chain per line
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let crossfade = args.crossfade.unwrap_or_else(|| config.long.crossfade());

    let plan = plan(args.clip_duration, crossfade)?;
    println!("clip      {:.3}s", plan.clip_duration());
    println!("crossfade {:.3}s", plan.crossfade_duration());
    println!("offset    {:.3}s", plan.offset());
    println!("loop unit {:.3}s from {:.3}s", plan.loop_duration(), plan.loop_start());
    println!();

    let graph = CrossfadeGraphBuilder::new(StreamFormat::from(&config.encoding)).build(&plan)?;
    if args.pretty {
        for chain in graph.chains() {
            println!("{};", chain);
        }
    } else {
        println!("{}", graph.to_filter_complex());
    }

    Ok(())
}
