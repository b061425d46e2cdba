// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for gstbridge operations.
//!
//! Native calls report failures as a [`gstbridge_sys::Status`]; this module
//! turns those records into [`Error`] variants and adds the failures that can
//! only happen on the Rust side (loading the library, string conversion).

use std::ffi::{CStr, c_int};

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur when using the native library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The native library rejected an argument or a pipeline configuration.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The call is not valid in the context's current phase.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// GStreamer failed inside the native library.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A status code this crate does not know about.
    #[error("Unknown status {code}: {message}")]
    Unknown { code: c_int, message: String },

    /// `allocate` returned a null context.
    #[error("The native library did not return a context")]
    NullContext,

    /// A generic error for Rust-level failures not mapped from a status code.
    #[error("Other error: {0}")]
    Other(String),

    /// Failed to convert a Rust string to a C-compatible null-terminated string.
    #[error("Null string: {0}")]
    NulString(#[from] std::ffi::NulError),

    /// Failed to load or interact with the native library.
    #[error("Loading library: {0}")]
    LibLoading(#[from] libloading::Error),

    /// A pipeline configuration could not be encoded or decoded.
    #[error("Pipeline configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A pipeline configuration file could not be read.
    #[error("Reading configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Converts a native status record to a [`Result`].
    ///
    /// # Safety
    ///
    /// `status` must have just been returned by the native library on the
    /// current thread, so that its message is still valid.
    pub(crate) unsafe fn from_status(status: gstbridge_sys::Status) -> Result<()> {
        let message = if status.message.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(status.message) }
                .to_string_lossy()
                .into_owned()
        };
        Self::from_code(status.status_code, message)
    }

    fn from_code(code: c_int, message: String) -> Result<()> {
        match code {
            gstbridge_sys::STATUS_OK => Ok(()),
            gstbridge_sys::STATUS_BAD_REQUEST => Err(Error::BadRequest(message)),
            gstbridge_sys::STATUS_CONFLICT => Err(Error::Conflict(message)),
            gstbridge_sys::STATUS_INTERNAL_ERROR => Err(Error::Internal(message)),
            code => Err(Error::Unknown { code, message }),
        }
    }

    /// The native status code behind this error, if it came from one.
    pub fn status_code(&self) -> Option<c_int> {
        match self {
            Error::BadRequest(_) => Some(gstbridge_sys::STATUS_BAD_REQUEST),
            Error::Conflict(_) => Some(gstbridge_sys::STATUS_CONFLICT),
            Error::Internal(_) => Some(gstbridge_sys::STATUS_INTERNAL_ERROR),
            Error::Unknown { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        assert!(Error::from_code(200, "Success".into()).is_ok());
        assert!(matches!(
            Error::from_code(400, "bad".into()),
            Err(Error::BadRequest(m)) if m == "bad"
        ));
        assert!(matches!(
            Error::from_code(409, String::new()),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(
            Error::from_code(500, String::new()),
            Err(Error::Internal(_))
        ));
        let unknown = Error::from_code(418, "teapot".into()).unwrap_err();
        assert_eq!(unknown.status_code(), Some(418));
    }

    #[test]
    fn status_message_is_copied() {
        let status = gstbridge_sys::Status {
            message: c"Could not create elements.".as_ptr(),
            status_code: gstbridge_sys::STATUS_INTERNAL_ERROR,
        };
        let error = unsafe { Error::from_status(status) }.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Internal error: Could not create elements."
        );
    }
}
