// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Once;

/// Environment variable holding the native library's log filter.
pub const LOG_ENV: &str = "GSTBRIDGE_LOG";

static INIT: Once = Once::new();

/// Installs the library's `tracing` subscriber on first use.
///
/// Logs go to stdout at INFO unless `GSTBRIDGE_LOG` says otherwise. If the
/// host process already installed a global subscriber, that one is kept.
pub fn init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .with_env_var(LOG_ENV)
                    .from_env_lossy(),
            )
            .try_init();
    });
}
