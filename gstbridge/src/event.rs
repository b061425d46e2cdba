// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Events reported by a running context.

use std::ffi::c_int;

/// Something that happened in a context's pipeline.
///
/// Events are delivered to the handler registered with
/// [`crate::BridgeContext::set_event_handler`], possibly from GStreamer
/// streaming threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The pipeline posted an error; `start` is about to return.
    Error(String),
    /// The pipeline reached end of stream; `start` is about to return.
    EndOfStream,
    /// Buffering progress in percent.
    Buffering(i32),
    /// The pipeline clock was lost and is being reselected.
    ClockLost,
    /// The pipeline changed to the named state.
    StateChanged(String),
    /// A decoded pad of the given media type was linked.
    PadLinked(String),
    /// An event code this crate does not know about.
    Unknown {
        code: c_int,
        value: c_int,
        message: String,
    },
}

impl Event {
    pub(crate) fn from_raw(code: c_int, value: c_int, message: String) -> Self {
        match code {
            gstbridge_sys::EVENT_ERROR => Event::Error(message),
            gstbridge_sys::EVENT_EOS => Event::EndOfStream,
            gstbridge_sys::EVENT_BUFFERING => Event::Buffering(value),
            gstbridge_sys::EVENT_CLOCK_LOST => Event::ClockLost,
            gstbridge_sys::EVENT_STATE_CHANGED => Event::StateChanged(message),
            gstbridge_sys::EVENT_PAD_LINKED => Event::PadLinked(message),
            code => Event::Unknown {
                code,
                value,
                message,
            },
        }
    }

    /// Whether `start` returns after this event.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Error(_) | Event::EndOfStream)
    }
}
