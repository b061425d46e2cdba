// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Walks through the context-free calls of the native library: a plain call,
//! strings in and out, arrays, a callback and, optionally, a test stream.

mod common;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the native library (defaults to $GSTBRIDGE_LIBRARY or the build directory).
    #[arg(long, env = "GSTBRIDGE_LIBRARY")]
    library: Option<PathBuf>,

    /// Stream a test pattern to this RTMP location after the other calls.
    #[arg(long)]
    sink: Option<String>,

    /// Element factories to look up.
    #[arg(long = "element", default_values_t = [
        "rtmpsrc".to_string(),
        "decodebin".to_string(),
        "x264enc".to_string(),
        "flvmux".to_string(),
        "rtmpsink".to_string(),
    ])]
    elements: Vec<String>,
}

fn main() -> Result<(), gstbridge::Error> {
    common::setup_logging();
    let args = Args::parse();
    let bridge = common::load_bridge(args.library)?;

    bridge.hello();
    println!("Native library version {}", bridge.library_version());
    println!("GStreamer version {}", bridge.gstreamer_version());

    let test = "This is a test";
    bridge.parameter_in(test)?;
    println!("{}", bridge.parameter_out(test)?);

    let names: Vec<&str> = args.elements.iter().map(String::as_str).collect();
    for (name, available) in names.iter().zip(bridge.check_elements(&names)?) {
        println!("{name}: {}", if available { "available" } else { "missing" });
    }

    bridge.hello_with(|message| println!("Callback received: {message}"));

    if let Some(sink) = args.sink {
        bridge.video_test_source(&sink)?;
    }
    Ok(())
}
