// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Runs one context: allocate, set up, start with a stop timer, release.

mod common;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use gstbridge::{BridgeContext, Layout, PipelineConfig, StopTimer};

const DEFAULT_SOURCE: &str = "rtmp://192.168.1.114:1935/yanked/stream-fancy";
const DEFAULT_SINK: &str = "rtmp://192.168.1.114:1935/yanked/stream-videotestsrc";

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the native library (defaults to $GSTBRIDGE_LIBRARY or the build directory).
    #[arg(long, env = "GSTBRIDGE_LIBRARY")]
    library: Option<PathBuf>,

    /// RTMP source; repeat for layouts with several sources.
    #[arg(long = "source")]
    sources: Vec<String>,

    /// RTMP sink.
    #[arg(long, default_value = DEFAULT_SINK)]
    sink: String,

    /// Output layout: single, picture_in_picture, split, quad or judge.
    #[arg(long, default_value_t = Layout::Single)]
    layout: Layout,

    /// JSON pipeline configuration file; overrides the source, sink and layout flags.
    #[arg(long, conflicts_with = "launch")]
    config: Option<PathBuf>,

    /// gst-launch style pipeline description; overrides every other setup flag.
    #[arg(long)]
    launch: Option<String>,

    /// Seconds before the timer stops the pipeline.
    #[arg(long, default_value_t = 30)]
    stop_after: u64,
}

fn setup(context: &BridgeContext, args: &Args) -> Result<(), gstbridge::Error> {
    if let Some(description) = &args.launch {
        return context.setup_launch(description);
    }
    if let Some(path) = &args.config {
        return context.setup_config(&PipelineConfig::from_file(path)?);
    }
    if args.layout == Layout::Single && args.sources.len() <= 1 {
        let source = args.sources.first().map_or(DEFAULT_SOURCE, String::as_str);
        return context.setup(source, &args.sink);
    }
    context.setup_config(&PipelineConfig::new(
        args.layout,
        args.sources.clone(),
        args.sink.clone(),
    ))
}

fn main() -> Result<(), gstbridge::Error> {
    common::setup_logging();
    let args = Args::parse();
    let bridge = common::load_bridge(args.library.clone())?;

    let context = match bridge.allocate() {
        Ok(context) => {
            println!("Got the context pointer");
            context
        }
        Err(error) => {
            println!("Didn't get it");
            println!("Exiting");
            return Err(error);
        }
    };
    context.set_event_handler(|event| tracing::info!("Event: {:?}", event))?;

    if let Err(error) = setup(&context, &args) {
        eprintln!("Setup failed: {error}");
        println!("Exiting");
        return Err(error);
    }

    println!("Scheduling a timer");
    let handle = context.stop_handle();
    let timer = StopTimer::schedule(Duration::from_secs(args.stop_after), move || {
        println!("Running the timer");
        handle.stop();
        println!("Came out, didn't freeze");
    });

    let result = context.start();
    timer.cancel();
    println!("Exiting");
    result
}
