// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Delivery of context events to the caller's callback.

use std::ffi::{CString, c_int, c_void};
use std::sync::Mutex;

use gstbridge_sys::EventCallback;

/// Kind of event reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Error,
    Eos,
    Buffering,
    ClockLost,
    StateChanged,
    PadLinked,
}

impl EventKind {
    pub fn code(self) -> c_int {
        match self {
            EventKind::Error => gstbridge_sys::EVENT_ERROR,
            EventKind::Eos => gstbridge_sys::EVENT_EOS,
            EventKind::Buffering => gstbridge_sys::EVENT_BUFFERING,
            EventKind::ClockLost => gstbridge_sys::EVENT_CLOCK_LOST,
            EventKind::StateChanged => gstbridge_sys::EVENT_STATE_CHANGED,
            EventKind::PadLinked => gstbridge_sys::EVENT_PAD_LINKED,
        }
    }
}

#[derive(Clone, Copy)]
struct Registration {
    callback: unsafe extern "C" fn(c_int, c_int, *const std::ffi::c_char, *mut c_void),
    user_data: *mut c_void,
}

// Safety: `user_data` is opaque to us and only handed back to the caller's
// callback, which is documented to run on arbitrary threads.
unsafe impl Send for Registration {}

/// Holds the registered callback of one context.
///
/// Shared with bus watches and `pad-added` handlers, so events may be emitted
/// from the thread running the main loop as well as from streaming threads.
#[derive(Default)]
pub struct EventDispatcher {
    registration: Mutex<Option<Registration>>,
}

impl EventDispatcher {
    /// Replaces the callback. A null callback clears it.
    pub fn register(&self, callback: EventCallback, user_data: *mut c_void) {
        let registration = callback.map(|callback| Registration {
            callback,
            user_data,
        });
        match self.registration.lock() {
            Ok(mut current) => *current = registration,
            Err(poisoned) => *poisoned.into_inner() = registration,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registration
            .lock()
            .map(|current| current.is_some())
            .unwrap_or(false)
    }

    /// Calls the registered callback, if any.
    pub fn emit(&self, kind: EventKind, value: c_int, message: &str) {
        // Copied out so the callback runs without the lock held.
        let registration = match self.registration.lock() {
            Ok(current) => *current,
            Err(_) => None,
        };
        let Some(registration) = registration else {
            return;
        };
        let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
        tracing::trace!(event = ?kind, value, "emitting event");
        unsafe {
            (registration.callback)(kind.code(), value, message.as_ptr(), registration.user_data)
        };
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, c_char};

    use super::*;

    unsafe extern "C" fn record(event: c_int, value: c_int, message: *const c_char, data: *mut c_void) {
        let seen = unsafe { &mut *(data as *mut Vec<(c_int, c_int, String)>) };
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
        seen.push((event, value, message));
    }

    #[test]
    fn emits_to_the_registered_callback() {
        let mut seen: Vec<(c_int, c_int, String)> = Vec::new();
        let dispatcher = EventDispatcher::default();
        dispatcher.register(Some(record), &mut seen as *mut _ as *mut c_void);
        assert!(dispatcher.is_registered());

        dispatcher.emit(EventKind::Buffering, 42, "");
        dispatcher.emit(EventKind::StateChanged, 0, "Playing");

        assert_eq!(
            seen,
            vec![
                (gstbridge_sys::EVENT_BUFFERING, 42, String::new()),
                (gstbridge_sys::EVENT_STATE_CHANGED, 0, "Playing".to_string()),
            ]
        );
    }

    #[test]
    fn cleared_callback_is_not_called() {
        let mut seen: Vec<(c_int, c_int, String)> = Vec::new();
        let dispatcher = EventDispatcher::default();
        dispatcher.register(Some(record), &mut seen as *mut _ as *mut c_void);
        dispatcher.register(None, std::ptr::null_mut());
        dispatcher.emit(EventKind::Eos, 0, "");
        assert!(seen.is_empty());
        assert!(!dispatcher.is_registered());
    }
}
