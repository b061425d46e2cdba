// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Context-free calls into the native library.

use std::ffi::{CStr, CString, c_char, c_void};
use std::panic::AssertUnwindSafe;

use crate::{BridgeContext, Error, GstVersion, Result, api::BridgeApiHandle};

unsafe extern "C" fn message_trampoline<F>(message: *const c_char, user_data: *mut c_void)
where
    F: FnMut(&str),
{
    if user_data.is_null() || message.is_null() {
        return;
    }
    let callback = unsafe { &mut *(user_data as *mut F) };
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    if std::panic::catch_unwind(AssertUnwindSafe(|| callback(message.as_ref()))).is_err() {
        tracing::error!("Message callback panicked");
    }
}

/// Entry point to the native library.
///
/// Cheap to clone; all clones share the loaded library.
#[derive(Clone)]
pub struct Bridge {
    api: BridgeApiHandle,
}

impl Bridge {
    pub fn new(api: BridgeApiHandle) -> Self {
        Bridge { api }
    }

    /// Calls the no-argument greeting.
    pub fn hello(&self) {
        unsafe { self.api.hello() }
    }

    /// Version string of the native library.
    pub fn library_version(&self) -> String {
        let version = unsafe { self.api.library_version() };
        if version.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(version) }
            .to_string_lossy()
            .into_owned()
    }

    /// Version of GStreamer the native library is linked against.
    pub fn gstreamer_version(&self) -> GstVersion {
        unsafe { self.api.gst_version() }.into()
    }

    /// Hands `param` to the native library, which logs it.
    pub fn parameter_in(&self, param: &str) -> Result<()> {
        let param = CString::new(param)?;
        unsafe { self.api.parameter_in(param.as_ptr()) };
        Ok(())
    }

    /// Hands `param` to the native library and returns its answer.
    pub fn parameter_out(&self, param: &str) -> Result<String> {
        let param = CString::new(param)?;
        let answer = unsafe { self.api.parameter_out(param.as_ptr()) };
        if answer.is_null() {
            return Err(Error::Other("parameter_out returned null".to_string()));
        }
        Ok(unsafe { CStr::from_ptr(answer) }
            .to_string_lossy()
            .into_owned())
    }

    /// Reports, for each element factory name, whether it is installed.
    pub fn check_elements(&self, names: &[&str]) -> Result<Vec<bool>> {
        let names = names
            .iter()
            .map(|name| CString::new(*name))
            .collect::<core::result::Result<Vec<_>, _>>()?;
        let pointers: Vec<*const c_char> = names.iter().map(|name| name.as_ptr()).collect();
        let mut available = vec![0u8; names.len()];
        let found = unsafe {
            self.api
                .check_elements(pointers.as_ptr(), pointers.len(), available.as_mut_ptr())
        };
        if found < 0 {
            return Err(Error::BadRequest(
                "check_elements rejected the element names".to_string(),
            ));
        }
        Ok(available.into_iter().map(|slot| slot != 0).collect())
    }

    /// Calls into the native library, which calls `callback` back before
    /// returning.
    pub fn hello_with<F>(&self, mut callback: F)
    where
        F: FnMut(&str),
    {
        unsafe {
            self.api.hello_with(
                Some(message_trampoline::<F>),
                &mut callback as *mut F as *mut c_void,
            )
        }
    }

    /// Streams a test pattern to `sink`, blocking until the stream ends or
    /// fails.
    pub fn video_test_source(&self, sink: &str) -> Result<()> {
        let sink = CString::new(sink)?;
        unsafe { Error::from_status(self.api.video_test_source(sink.as_ptr())) }
    }

    /// Allocates a new native context.
    pub fn allocate(&self) -> Result<BridgeContext> {
        let context = unsafe { self.api.allocate() };
        if context.is_null() {
            return Err(Error::NullContext);
        }
        Ok(BridgeContext::new(self.api.clone(), context))
    }
}
