// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

use std::ffi::OsStr;
use std::sync::Arc;

use gstbridge_sys::{Functions, GstBridgeLibrary};

use crate::Result;

/// The loaded native library.
pub type BridgeApi = GstBridgeLibrary;

/// Shared handle to the loaded native library.
///
/// Every [`crate::Bridge`] and [`crate::BridgeContext`] keeps one, so the
/// library stays mapped while anything created from it is alive.
pub type BridgeApiHandle = Arc<BridgeApi>;

/// Opens the native library at `path` and resolves its functions.
pub fn load_api(path: impl AsRef<OsStr>) -> Result<BridgeApiHandle> {
    let path = path.as_ref();
    tracing::debug!("Loading native library from {}", path.to_string_lossy());
    // Safety: the library is only called through the signatures declared in
    // gstbridge-sys, which match its exports.
    let library = unsafe { GstBridgeLibrary::new(path) }?;
    Ok(Arc::new(library))
}

/// Wraps functions that are linked into the process instead of loaded.
pub fn from_functions(functions: Functions) -> BridgeApiHandle {
    Arc::new(GstBridgeLibrary::from_functions(functions))
}
