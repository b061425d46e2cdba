// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for native operations.
//!
//! Every failure inside the library is a [`BridgeError`]; at the C boundary it
//! collapses into a [`gstbridge_sys::Status`] whose code is chosen by
//! [`BridgeError::status_code`].

use std::ffi::c_int;

use gstreamer as gst;

/// Convenience result type using [`BridgeError`] as the error variant.
pub type Result<T> = core::result::Result<T, BridgeError>;

/// Errors raised while serving a call from the caller.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A required pointer argument was null.
    #[error("Argument '{0}' is null.")]
    NullArgument(&'static str),

    /// A string argument was not valid UTF-8.
    #[error("Argument '{0}' is not valid UTF-8.")]
    InvalidUtf8(&'static str),

    /// The pipeline configuration could not be decoded.
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The call is not valid in the context's current phase.
    #[error("{0}")]
    Conflict(String),

    /// GStreamer could not be initialised.
    #[error("Could not initialise GStreamer: {0}")]
    Init(#[from] glib::Error),

    /// An element factory is missing or refused to build the element.
    #[error("Could not create element '{factory}'.")]
    ElementCreation {
        factory: String,
        #[source]
        source: glib::BoolError,
    },

    /// Two elements or pads could not be linked.
    #[error("Could not link {from} to {to}.")]
    Link { from: String, to: String },

    /// The pipeline refused a state change.
    #[error("Unable to set the pipeline to the {0:?} state.")]
    StateChange(gst::State),

    /// The pipeline posted an error on its bus.
    #[error("Error received from element {source_name}: {message}")]
    Stream {
        source_name: String,
        message: String,
    },

    /// Any other GLib level failure.
    #[error(transparent)]
    Glib(#[from] glib::BoolError),
}

impl BridgeError {
    /// Maps the error to the status code reported across the boundary.
    pub fn status_code(&self) -> c_int {
        match self {
            BridgeError::NullArgument(_)
            | BridgeError::InvalidUtf8(_)
            | BridgeError::InvalidConfig(_) => gstbridge_sys::STATUS_BAD_REQUEST,
            BridgeError::Conflict(_) => gstbridge_sys::STATUS_CONFLICT,
            BridgeError::Init(_)
            | BridgeError::ElementCreation { .. }
            | BridgeError::Link { .. }
            | BridgeError::StateChange(_)
            | BridgeError::Stream { .. }
            | BridgeError::Glib(_) => gstbridge_sys::STATUS_INTERNAL_ERROR,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(error: serde_json::Error) -> Self {
        BridgeError::InvalidConfig(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_are_bad_requests() {
        assert_eq!(
            BridgeError::NullArgument("sink").status_code(),
            gstbridge_sys::STATUS_BAD_REQUEST
        );
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            BridgeError::from(decode).status_code(),
            gstbridge_sys::STATUS_BAD_REQUEST
        );
    }

    #[test]
    fn pipeline_errors_are_internal() {
        let error = BridgeError::Link {
            from: "muxer".into(),
            to: "sink".into(),
        };
        assert_eq!(error.status_code(), gstbridge_sys::STATUS_INTERNAL_ERROR);
        assert_eq!(error.to_string(), "Could not link muxer to sink.");
        assert_eq!(
            BridgeError::Conflict("busy".into()).status_code(),
            gstbridge_sys::STATUS_CONFLICT
        );
    }
}
