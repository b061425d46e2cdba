// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! # gstbridge
//!
//! Safe, idiomatic Rust bindings for the gstbridge native library, a shared
//! library that drives GStreamer pipelines behind a small C ABI.
//!
//! This crate wraps the raw declarations of [`gstbridge_sys`] with `Result`
//! based errors, RAII contexts and closures for callbacks.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────┐
//! │ Bridge │  (loaded library)
//! └───┬────┘
//!     │
//!     ├─► hello / parameter_* / check_elements / hello_with
//!     │
//!     └─► BridgeContext ──► setup* ──► start (blocks)
//!                      └─► StopHandle ──► stop / stop_after ──► StopTimer
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use gstbridge::{Bridge, Event, load_api, config::get_library_path};
//!
//! # fn main() -> Result<(), gstbridge::Error> {
//! let bridge = Bridge::new(load_api(get_library_path())?);
//! println!("{}", bridge.parameter_out("This is a test")?);
//!
//! let context = bridge.allocate()?;
//! context.set_event_handler(|event: Event| println!("{event:?}"))?;
//! context.setup_launch("videotestsrc num-buffers=100 ! fakesink")?;
//! let timer = context.stop_handle().stop_after(Duration::from_secs(30));
//! context.start()?;
//! timer.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! - [`Bridge`] is `Send + Sync` and cheap to clone
//! - [`BridgeContext::start`] blocks its thread; [`StopHandle`] is `Send + Sync`
//!   and stops it from anywhere
//! - Event handlers may run on GStreamer streaming threads

mod api;
mod bridge;
mod context;
mod error;
mod event;
mod timer;
mod version;

pub mod config;
pub mod pipeline;

pub use api::{BridgeApi, BridgeApiHandle, from_functions, load_api};
pub use bridge::Bridge;
pub use context::{BridgeContext, StopHandle};
pub use error::{Error, Result};
pub use event::Event;
pub use pipeline::{EncoderSettings, Layout, MuxerSettings, PipelineConfig};
pub use timer::StopTimer;
pub use version::{GstVersion, Release};
