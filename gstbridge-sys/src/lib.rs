// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! # gstbridge-sys: Raw C ABI of the gstbridge native library
//!
//! This crate describes, in Rust, the C interface exported by the
//! `gstbridge_native` shared library: the `#[repr(C)]` records that cross the
//! boundary, the status and event codes, and a table of function pointers.
//!
//! ## Overview
//!
//! `gstbridge-sys` exposes:
//! - The opaque [`Context`] handle type (only ever used behind `*mut`)
//! - Records returned by value ([`Status`], [`Version`])
//! - Callback signatures ([`EventCallback`], [`MessageCallback`])
//! - [`GstBridgeLibrary`], which resolves every exported symbol from a shared
//!   library via `libloading`, or wraps a statically linked [`Functions`] table
//!
//! ## Usage
//!
//! **Most users should NOT use this crate directly.** Use the safe `gstbridge`
//! wrapper crate instead, which provides RAII contexts, `Result` based error
//! handling and closures for callbacks.
//!
//! ## Safety
//!
//! All functions in this crate are `unsafe` and require the caller to uphold the
//! native library's invariants:
//! - A context must be obtained from `allocate` before it is passed anywhere else
//! - A context must not be used after `release`
//! - `release` must not race a running `start` on the same context
//! - String arguments must be valid, NUL-terminated and UTF-8
//! - The message of a returned [`Status`] is only valid until the next
//!   status-returning call on the same thread

#![allow(clippy::missing_safety_doc)]

use std::ffi::{OsStr, c_char, c_int, c_uint, c_void};
use std::marker::{PhantomData, PhantomPinned};

/// Success.
pub const STATUS_OK: c_int = 200;
/// A null pointer, invalid UTF-8 or an invalid pipeline configuration was passed.
pub const STATUS_BAD_REQUEST: c_int = 400;
/// The call is not valid in the context's current phase.
pub const STATUS_CONFLICT: c_int = 409;
/// GStreamer failed (element creation, linking, state change, bus error).
pub const STATUS_INTERNAL_ERROR: c_int = 500;

/// The pipeline posted an error. `message` carries the error text.
pub const EVENT_ERROR: c_int = 1;
/// The pipeline reached end of stream.
pub const EVENT_EOS: c_int = 2;
/// Buffering progress. `value` carries the percentage.
pub const EVENT_BUFFERING: c_int = 3;
/// The pipeline clock was lost and is being reselected.
pub const EVENT_CLOCK_LOST: c_int = 4;
/// The pipeline changed state. `message` carries the new state name.
pub const EVENT_STATE_CHANGED: c_int = 5;
/// A decoded pad was linked. `message` carries its media type.
pub const EVENT_PAD_LINKED: c_int = 6;

/// Opaque native context.
///
/// Only ever handled as `*mut Context`; its layout is private to the native
/// library.
#[repr(C)]
pub struct Context {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Result record returned by value from fallible native calls.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Status {
    pub message: *const c_char,
    pub status_code: c_int,
}

/// Linked GStreamer version, returned by value.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: c_uint,
    pub minor: c_uint,
    pub micro: c_uint,
    pub nano: c_uint,
}

/// Context event callback: `(event, value, message, user_data)`.
pub type EventCallback = Option<
    unsafe extern "C" fn(event: c_int, value: c_int, message: *const c_char, user_data: *mut c_void),
>;

/// Plain message callback: `(message, user_data)`.
pub type MessageCallback =
    Option<unsafe extern "C" fn(message: *const c_char, user_data: *mut c_void)>;

/// Every function exported by the native library.
#[derive(Debug, Clone, Copy)]
pub struct Functions {
    pub hello: unsafe extern "C" fn(),
    pub library_version: unsafe extern "C" fn() -> *const c_char,
    pub gst_version: unsafe extern "C" fn() -> Version,
    pub parameter_in: unsafe extern "C" fn(param: *const c_char),
    pub parameter_out: unsafe extern "C" fn(param: *const c_char) -> *const c_char,
    pub check_elements: unsafe extern "C" fn(
        names: *const *const c_char,
        count: usize,
        available: *mut u8,
    ) -> c_int,
    pub hello_with: unsafe extern "C" fn(callback: MessageCallback, user_data: *mut c_void),
    pub video_test_source: unsafe extern "C" fn(sink: *const c_char) -> Status,
    pub allocate: unsafe extern "C" fn() -> *mut Context,
    pub setup: unsafe extern "C" fn(
        source: *const c_char,
        sink: *const c_char,
        context: *mut Context,
    ) -> Status,
    pub setup_config: unsafe extern "C" fn(config: *const c_char, context: *mut Context) -> Status,
    pub setup_launch:
        unsafe extern "C" fn(description: *const c_char, context: *mut Context) -> Status,
    pub set_event_callback: unsafe extern "C" fn(
        context: *mut Context,
        callback: EventCallback,
        user_data: *mut c_void,
    ) -> Status,
    pub start: unsafe extern "C" fn(context: *mut Context) -> Status,
    pub stop: unsafe extern "C" fn(context: *mut Context),
    pub release: unsafe extern "C" fn(context: *mut Context),
}

/// Handle to the native library.
///
/// Either owns a dynamically opened library (see [`GstBridgeLibrary::new`]) or
/// wraps a table of statically linked functions (see
/// [`GstBridgeLibrary::from_functions`]).
pub struct GstBridgeLibrary {
    // Keeps the shared object mapped for as long as `functions` may be called.
    _library: Option<libloading::Library>,
    functions: Functions,
}

impl std::fmt::Debug for GstBridgeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GstBridgeLibrary")
            .field("dynamic", &self._library.is_some())
            .finish_non_exhaustive()
    }
}

impl GstBridgeLibrary {
    /// Opens the shared library at `path` and resolves every exported symbol.
    ///
    /// Fails if the library cannot be opened or any symbol is missing.
    pub unsafe fn new<P: AsRef<OsStr>>(path: P) -> Result<Self, libloading::Error> {
        let library = unsafe { libloading::Library::new(path) }?;
        let functions = unsafe { Self::resolve(&library) }?;
        Ok(Self {
            _library: Some(library),
            functions,
        })
    }

    /// Wraps a table of functions that are already linked into the process.
    pub fn from_functions(functions: Functions) -> Self {
        Self {
            _library: None,
            functions,
        }
    }

    /// Returns the resolved function table.
    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    unsafe fn resolve(library: &libloading::Library) -> Result<Functions, libloading::Error> {
        macro_rules! symbol {
            ($name:literal) => {
                unsafe { symbol(library, $name) }?
            };
        }

        Ok(Functions {
            hello: symbol!(b"gstbridge_hello\0"),
            library_version: symbol!(b"gstbridge_library_version\0"),
            gst_version: symbol!(b"gstbridge_gst_version\0"),
            parameter_in: symbol!(b"gstbridge_parameter_in\0"),
            parameter_out: symbol!(b"gstbridge_parameter_out\0"),
            check_elements: symbol!(b"gstbridge_check_elements\0"),
            hello_with: symbol!(b"gstbridge_hello_with\0"),
            video_test_source: symbol!(b"gstbridge_video_test_source\0"),
            allocate: symbol!(b"gstbridge_allocate\0"),
            setup: symbol!(b"gstbridge_setup\0"),
            setup_config: symbol!(b"gstbridge_setup_config\0"),
            setup_launch: symbol!(b"gstbridge_setup_launch\0"),
            set_event_callback: symbol!(b"gstbridge_set_event_callback\0"),
            start: symbol!(b"gstbridge_start\0"),
            stop: symbol!(b"gstbridge_stop\0"),
            release: symbol!(b"gstbridge_release\0"),
        })
    }

    pub unsafe fn hello(&self) {
        unsafe { (self.functions.hello)() }
    }

    pub unsafe fn library_version(&self) -> *const c_char {
        unsafe { (self.functions.library_version)() }
    }

    pub unsafe fn gst_version(&self) -> Version {
        unsafe { (self.functions.gst_version)() }
    }

    pub unsafe fn parameter_in(&self, param: *const c_char) {
        unsafe { (self.functions.parameter_in)(param) }
    }

    pub unsafe fn parameter_out(&self, param: *const c_char) -> *const c_char {
        unsafe { (self.functions.parameter_out)(param) }
    }

    pub unsafe fn check_elements(
        &self,
        names: *const *const c_char,
        count: usize,
        available: *mut u8,
    ) -> c_int {
        unsafe { (self.functions.check_elements)(names, count, available) }
    }

    pub unsafe fn hello_with(&self, callback: MessageCallback, user_data: *mut c_void) {
        unsafe { (self.functions.hello_with)(callback, user_data) }
    }

    pub unsafe fn video_test_source(&self, sink: *const c_char) -> Status {
        unsafe { (self.functions.video_test_source)(sink) }
    }

    pub unsafe fn allocate(&self) -> *mut Context {
        unsafe { (self.functions.allocate)() }
    }

    pub unsafe fn setup(
        &self,
        source: *const c_char,
        sink: *const c_char,
        context: *mut Context,
    ) -> Status {
        unsafe { (self.functions.setup)(source, sink, context) }
    }

    pub unsafe fn setup_config(&self, config: *const c_char, context: *mut Context) -> Status {
        unsafe { (self.functions.setup_config)(config, context) }
    }

    pub unsafe fn setup_launch(&self, description: *const c_char, context: *mut Context) -> Status {
        unsafe { (self.functions.setup_launch)(description, context) }
    }

    pub unsafe fn set_event_callback(
        &self,
        context: *mut Context,
        callback: EventCallback,
        user_data: *mut c_void,
    ) -> Status {
        unsafe { (self.functions.set_event_callback)(context, callback, user_data) }
    }

    pub unsafe fn start(&self, context: *mut Context) -> Status {
        unsafe { (self.functions.start)(context) }
    }

    pub unsafe fn stop(&self, context: *mut Context) {
        unsafe { (self.functions.stop)(context) }
    }

    pub unsafe fn release(&self, context: *mut Context) {
        unsafe { (self.functions.release)(context) }
    }
}

/// Resolves one symbol and copies the function pointer out of it.
unsafe fn symbol<T: Copy>(library: &libloading::Library, name: &[u8]) -> Result<T, libloading::Error> {
    let symbol = unsafe { library.get::<T>(name) }?;
    Ok(*symbol)
}
