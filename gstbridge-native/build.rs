//! Build Script for gstbridge-native
//!
//! Generates version information for the native library using
//! `gst_plugin_version_helper`.
//!
//! ## Generated Environment Variables
//! - `COMMIT_ID`: Git commit hash (or `RELEASE` outside a git checkout)
//! - `BUILD_REL_DATE`: Build date
//!
//! These are read in lib.rs via `env!` to build the string returned by
//! `gstbridge_library_version`.

// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

fn main() {
    gst_plugin_version_helper::info()
}
