// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Common utilities shared across examples.

use std::path::PathBuf;

use gstbridge::{Bridge, config::get_library_path, load_api};

/// Initializes tracing subscriber for examples.
///
/// Configures logging to stdout with an INFO level filter, respecting the
/// `RUST_LOG` environment variable for custom log levels.
pub fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

/// Loads the native library from `path`, or from the default location.
pub fn load_bridge(path: Option<PathBuf>) -> Result<Bridge, gstbridge::Error> {
    let path = path.unwrap_or_else(get_library_path);
    tracing::info!("Using native library {}", path.display());
    Ok(Bridge::new(load_api(path)?))
}
