// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! # gstbridge-native
//!
//! The native side of the gstbridge boundary: a shared library exposing a
//! small C ABI on top of GStreamer.
//!
//! ## Exported functions
//!
//! | Function | Purpose |
//! |---|---|
//! | `gstbridge_hello` | No-argument call that logs a greeting |
//! | `gstbridge_library_version` | Static version string |
//! | `gstbridge_gst_version` | Linked GStreamer version, returned by value |
//! | `gstbridge_parameter_in` / `gstbridge_parameter_out` | Strings in and out |
//! | `gstbridge_check_elements` | Arrays in and out |
//! | `gstbridge_hello_with` | Synchronous callback |
//! | `gstbridge_video_test_source` | Blocking test pattern stream |
//! | `gstbridge_allocate` ... `gstbridge_release` | Context lifecycle |
//!
//! ## Context lifecycle
//!
//! ```text
//! allocate ─► setup / setup_config / setup_launch ─► start (blocks) ─► release
//!                                                      ▲
//!                                       stop (any thread)
//! ```
//!
//! Fallible calls return a [`gstbridge_sys::Status`]. Its message lives in a
//! thread-local buffer and must be copied before the next status-returning
//! call on the same thread.
//!
//! ## Logging
//!
//! Library logs go through `tracing` (filter: `GSTBRIDGE_LOG`). Pipeline
//! internals are logged on the `gstbridge` GStreamer debug category, enabled
//! with `GST_DEBUG=gstbridge:5`.

mod bus;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
mod ffi;
pub mod layout;
pub mod logging;
pub mod pipeline;
mod status;

pub use config::{EncoderSettings, MuxerSettings, PipelineConfig};
pub use context::{BridgeContext, Phase};
pub use error::{BridgeError, Result};
pub use ffi::*;
pub use layout::Layout;
