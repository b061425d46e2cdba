// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Safe handle to a native context.
//!
//! A [`BridgeContext`] owns one opaque native context. Setup, start and the
//! event handler go through the context itself; stopping goes through a
//! [`StopHandle`], which can be cloned and sent to other threads (for example
//! into a [`StopTimer`]).

use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::{Error, Event, PipelineConfig, Result, StopTimer, api::BridgeApiHandle};

type HandlerSlot = Mutex<Box<dyn FnMut(Event) + Send>>;

/// Internal shared state of a context.
///
/// The native context is released when the last reference is dropped, after
/// which the registered handlers are freed.
pub(crate) struct ContextInner {
    api: BridgeApiHandle,
    context: *mut gstbridge_sys::Context,
    // Every handler ever registered stays boxed until release, since native
    // code may still hold a pointer to a replaced one.
    handlers: Mutex<Vec<Box<HandlerSlot>>>,
}

// Safety: the native context serialises setup and start internally and its
// stop function is thread-safe. `release` only runs from Drop, once no other
// reference (and so no running `start`) remains.
unsafe impl Send for ContextInner {}
unsafe impl Sync for ContextInner {}

impl ContextInner {
    fn stop(&self) {
        unsafe { self.api.stop(self.context) };
    }
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        if !self.context.is_null() {
            unsafe { self.api.release(self.context) };
            tracing::debug!("Released native context");
        }
    }
}

unsafe extern "C" fn event_trampoline(
    event: c_int,
    value: c_int,
    message: *const c_char,
    user_data: *mut c_void,
) {
    if user_data.is_null() {
        return;
    }
    let slot = unsafe { &*(user_data as *const HandlerSlot) };
    let message = if message.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    };
    let event = Event::from_raw(event, value, message);
    let delivered = std::panic::catch_unwind(AssertUnwindSafe(|| {
        // A handler that panicked once still gets the next event.
        let mut handler = slot.lock().unwrap_or_else(PoisonError::into_inner);
        handler(event);
    }));
    if delivered.is_err() {
        tracing::error!("Event handler panicked");
    }
}

/// A native context: one pipeline, set up once and started once.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use gstbridge::{Bridge, load_api, config::get_library_path};
///
/// # fn main() -> Result<(), gstbridge::Error> {
/// let bridge = Bridge::new(load_api(get_library_path())?);
/// let context = bridge.allocate()?;
/// context.setup("rtmp://host/app/in", "rtmp://host/app/out")?;
/// let timer = context.stop_handle().stop_after(Duration::from_secs(30));
/// context.start()?;
/// timer.cancel();
/// # Ok(())
/// # }
/// ```
pub struct BridgeContext {
    inner: Arc<ContextInner>,
}

impl BridgeContext {
    pub(crate) fn new(api: BridgeApiHandle, context: *mut gstbridge_sys::Context) -> Self {
        BridgeContext {
            inner: Arc::new(ContextInner {
                api,
                context,
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    fn api(&self) -> &BridgeApiHandle {
        &self.inner.api
    }

    fn raw(&self) -> *mut gstbridge_sys::Context {
        self.inner.context
    }

    /// Relays `source` to `sink`.
    pub fn setup(&self, source: &str, sink: &str) -> Result<()> {
        let source = CString::new(source)?;
        let sink = CString::new(sink)?;
        unsafe {
            Error::from_status(
                self.api()
                    .setup(source.as_ptr(), sink.as_ptr(), self.raw()),
            )
        }
    }

    /// Builds the pipeline described by `config`.
    pub fn setup_config(&self, config: &PipelineConfig) -> Result<()> {
        let json = CString::new(config.to_json()?)?;
        unsafe { Error::from_status(self.api().setup_config(json.as_ptr(), self.raw())) }
    }

    /// Builds the pipeline from a `gst-launch` style description.
    pub fn setup_launch(&self, description: &str) -> Result<()> {
        let description = CString::new(description)?;
        unsafe { Error::from_status(self.api().setup_launch(description.as_ptr(), self.raw())) }
    }

    /// Registers `handler` for the events of this context, replacing any
    /// previous handler.
    ///
    /// The handler may be called from GStreamer streaming threads as well as
    /// from the thread running [`Self::start`].
    pub fn set_event_handler<F>(&self, handler: F) -> Result<()>
    where
        F: FnMut(Event) + Send + 'static,
    {
        let slot: Box<HandlerSlot> = Box::new(Mutex::new(Box::new(handler)));
        let user_data = &*slot as *const HandlerSlot as *mut c_void;
        let mut handlers = self
            .inner
            .handlers
            .lock()
            .map_err(|_| Error::Other("Event handler registry poisoned".to_string()))?;
        handlers.push(slot);
        unsafe {
            Error::from_status(self.api().set_event_callback(
                self.raw(),
                Some(event_trampoline),
                user_data,
            ))
        }
    }

    /// Plays the pipeline, blocking until it is stopped, fails or ends.
    pub fn start(&self) -> Result<()> {
        unsafe { Error::from_status(self.api().start(self.raw())) }
    }

    /// Asks a running [`Self::start`] to return.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Returns a handle that can stop this context from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            inner: self.inner.clone(),
        }
    }
}

/// Stops a context from any thread.
///
/// Keeps the context alive while it exists.
#[derive(Clone)]
pub struct StopHandle {
    inner: Arc<ContextInner>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Stops the context after `delay` unless the returned timer is cancelled.
    pub fn stop_after(&self, delay: Duration) -> StopTimer {
        let handle = self.clone();
        StopTimer::schedule(delay, move || handle.stop())
    }
}
