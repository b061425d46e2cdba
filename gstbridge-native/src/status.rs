// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Construction of the [`Status`] records returned by value.
//!
//! The message text is kept in a thread-local buffer owned by this library. It
//! stays valid until the next status-returning call on the same thread, which
//! is long enough for the caller to copy it out.

use std::cell::RefCell;
use std::ffi::{CString, c_int};

use gstbridge_sys::Status;

use crate::error::BridgeError;

thread_local! {
    static LAST_MESSAGE: RefCell<CString> = RefCell::new(CString::default());
}

/// Stores `message` and returns a status pointing at it.
pub(crate) fn status(status_code: c_int, message: &str) -> Status {
    // Interior NULs would truncate the C view anyway.
    let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
    LAST_MESSAGE.with(|last| {
        let mut last = last.borrow_mut();
        *last = message;
        Status {
            message: last.as_ptr(),
            status_code,
        }
    })
}

pub(crate) fn ok() -> Status {
    status(gstbridge_sys::STATUS_OK, "Success")
}

impl From<BridgeError> for Status {
    fn from(error: BridgeError) -> Self {
        status(error.status_code(), &error.to_string())
    }
}

/// Collapses a native result into the record handed back to the caller.
pub(crate) fn from_result(result: crate::error::Result<()>) -> Status {
    match result {
        Ok(()) => ok(),
        Err(error) => {
            tracing::warn!(code = error.status_code(), "{error}");
            error.into()
        }
    }
}
