// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! The exported C ABI.
//!
//! Every function here validates its raw arguments, hands off to the safe
//! modules of this crate and turns the outcome into a status record or a
//! sentinel value. Nothing in this module panics on bad input.

use std::cmp::Ordering;
use std::ffi::{CStr, c_char, c_int, c_void};

use gstbridge_sys::{Context, EventCallback, MessageCallback, Status, Version};
use gstreamer as gst;

use crate::config::PipelineConfig;
use crate::context::BridgeContext;
use crate::error::{BridgeError, Result};
use crate::status::from_result;
use crate::{logging, pipeline};

const GREETING: &CStr = c"Hello from native code.";
const EXPECTED_PARAMETER: &str = "This is a test";
const MATCHED: &CStr = c"Is it really?";
const NOT_MATCHED: &CStr = c"Nothing to see here";
const LIBRARY_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("COMMIT_ID"), "\0");

unsafe fn str_arg<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(BridgeError::NullArgument(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| BridgeError::InvalidUtf8(name))
}

unsafe fn context_arg<'a>(context: *mut Context) -> Result<&'a BridgeContext> {
    if context.is_null() {
        return Err(BridgeError::NullArgument("context"));
    }
    Ok(unsafe { &*(context as *const BridgeContext) })
}

fn release_suffix(nano: u32) -> &'static str {
    match nano {
        1 => "(CVS)",
        2 => "(Prerelease)",
        _ => "",
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn gstbridge_hello() {
    logging::init();
    tracing::info!("{}", GREETING.to_string_lossy());
}

/// Returns `"<crate version>-<commit>"` as a static string.
#[unsafe(no_mangle)]
pub extern "C" fn gstbridge_library_version() -> *const c_char {
    LIBRARY_VERSION.as_ptr().cast()
}

#[unsafe(no_mangle)]
pub extern "C" fn gstbridge_gst_version() -> Version {
    logging::init();
    let (major, minor, micro, nano) = gst::version();
    tracing::info!(
        "This program is linked against GStreamer version {}.{}.{} {}",
        major,
        minor,
        micro,
        release_suffix(nano)
    );
    Version {
        major,
        minor,
        micro,
        nano,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_parameter_in(param: *const c_char) {
    logging::init();
    match unsafe { str_arg(param, "param") } {
        Ok(param) => tracing::info!("The passed in parameter is: '{}'", param),
        Err(error) => tracing::warn!("{error}"),
    }
}

/// Compares `param` with a fixed phrase and answers with a static string.
///
/// Returns null for a null or non UTF-8 argument.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_parameter_out(param: *const c_char) -> *const c_char {
    logging::init();
    let param = match unsafe { str_arg(param, "param") } {
        Ok(param) => param,
        Err(error) => {
            tracing::warn!("{error}");
            return std::ptr::null();
        }
    };
    let comparison = param.cmp(EXPECTED_PARAMETER);
    tracing::info!("The result of string compare is {}", comparison as i8);
    match comparison {
        Ordering::Equal => MATCHED.as_ptr(),
        _ => NOT_MATCHED.as_ptr(),
    }
}

/// Looks up `count` element factories by name.
///
/// Writes `1` into `available[i]` when `names[i]` is installed and `0`
/// otherwise, and returns how many were found. Returns `-1` when an array or
/// one of the names is invalid; `available` is left untouched in that case.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_check_elements(
    names: *const *const c_char,
    count: usize,
    available: *mut u8,
) -> c_int {
    logging::init();
    if count == 0 {
        return 0;
    }
    if names.is_null() || available.is_null() {
        tracing::warn!("check_elements called with a null array");
        return -1;
    }
    if let Err(error) = gst::init() {
        tracing::error!("Could not initialise GStreamer: {error}");
        return -1;
    }

    let names = unsafe { std::slice::from_raw_parts(names, count) };
    let mut found = Vec::with_capacity(count);
    for &name in names {
        match unsafe { str_arg(name, "names") } {
            Ok(name) => found.push(gst::ElementFactory::find(name).is_some()),
            Err(error) => {
                tracing::warn!("{error}");
                return -1;
            }
        }
    }

    let available = unsafe { std::slice::from_raw_parts_mut(available, count) };
    for (slot, present) in available.iter_mut().zip(&found) {
        *slot = u8::from(*present);
    }
    let total = found.iter().filter(|present| **present).count();
    tracing::debug!("{} of {} element(s) available", total, count);
    c_int::try_from(total).unwrap_or(c_int::MAX)
}

/// Calls `callback` once, synchronously, with a greeting.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_hello_with(callback: MessageCallback, user_data: *mut c_void) {
    logging::init();
    let Some(callback) = callback else {
        tracing::debug!("hello_with called without a callback");
        return;
    };
    unsafe { callback(GREETING.as_ptr(), user_data) };
}

/// Streams a test pattern to `sink` until the pipeline errors or ends.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_video_test_source(sink: *const c_char) -> Status {
    logging::init();
    let sink = match unsafe { str_arg(sink, "sink") } {
        Ok(sink) => sink,
        Err(error) => return error.into(),
    };
    from_result(run_video_test_source(sink))
}

fn run_video_test_source(sink: &str) -> Result<()> {
    gst::init()?;
    let pipeline = pipeline::video_test_source(sink)?;
    pipeline::run_to_completion(&pipeline)
}

/// Creates a context. Returns null if GStreamer cannot be initialised.
#[unsafe(no_mangle)]
pub extern "C" fn gstbridge_allocate() -> *mut Context {
    logging::init();
    match BridgeContext::new() {
        Ok(context) => Box::into_raw(Box::new(context)).cast(),
        Err(error) => {
            tracing::error!("{error}");
            std::ptr::null_mut()
        }
    }
}

/// Configures `context` to relay `source` to `sink`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_setup(
    source: *const c_char,
    sink: *const c_char,
    context: *mut Context,
) -> Status {
    let result = (|| {
        let context = unsafe { context_arg(context) }?;
        let source = unsafe { str_arg(source, "source") }?;
        let sink = unsafe { str_arg(sink, "sink") }?;
        tracing::info!(id = %context.id(), "Source: {}, sink: {}", source, sink);
        context.setup(&PipelineConfig::relay(source, sink))
    })();
    from_result(result)
}

/// Configures `context` from a JSON pipeline configuration.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_setup_config(
    config: *const c_char,
    context: *mut Context,
) -> Status {
    let result = (|| {
        let context = unsafe { context_arg(context) }?;
        let config = PipelineConfig::from_json(unsafe { str_arg(config, "config") }?)?;
        context.setup(&config)
    })();
    from_result(result)
}

/// Configures `context` from a `gst-launch` style description.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_setup_launch(
    description: *const c_char,
    context: *mut Context,
) -> Status {
    let result = (|| {
        let context = unsafe { context_arg(context) }?;
        context.setup_launch(unsafe { str_arg(description, "description") }?)
    })();
    from_result(result)
}

/// Registers the event callback of `context`; a null callback clears it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_set_event_callback(
    context: *mut Context,
    callback: EventCallback,
    user_data: *mut c_void,
) -> Status {
    let result = unsafe { context_arg(context) }.map(|context| {
        context.events().register(callback, user_data);
    });
    from_result(result)
}

/// Runs the pipeline of `context`, blocking until it is stopped or ends.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_start(context: *mut Context) -> Status {
    let result = unsafe { context_arg(context) }.and_then(BridgeContext::start);
    from_result(result)
}

/// Asks a running `gstbridge_start` on `context` to return. Thread safe.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_stop(context: *mut Context) {
    match unsafe { context_arg(context) } {
        Ok(context) => context.stop(),
        Err(error) => tracing::warn!("stop: {error}"),
    }
}

/// Frees `context`. Null is ignored.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gstbridge_release(context: *mut Context) {
    if context.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(context.cast::<BridgeContext>()) });
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    #[traced_test]
    fn hello_logs_a_greeting() {
        gstbridge_hello();
        assert!(logs_contain("Hello from native code."));
    }

    #[test]
    #[traced_test]
    fn parameter_in_logs_the_parameter() {
        unsafe { gstbridge_parameter_in(c"This is a test".as_ptr()) };
        assert!(logs_contain("The passed in parameter is: 'This is a test'"));
        unsafe { gstbridge_parameter_in(std::ptr::null()) };
        assert!(logs_contain("Argument 'param' is null."));
    }

    #[test]
    #[traced_test]
    fn parameter_out_logs_the_comparison() {
        unsafe { gstbridge_parameter_out(c"This is a test".as_ptr()) };
        assert!(logs_contain("The result of string compare is 0"));
        unsafe { gstbridge_parameter_out(c"Something else".as_ptr()) };
        assert!(logs_contain("The result of string compare is -1"));
    }

    #[test]
    fn release_suffixes() {
        assert_eq!(release_suffix(0), "");
        assert_eq!(release_suffix(1), "(CVS)");
        assert_eq!(release_suffix(2), "(Prerelease)");
    }

    #[test]
    fn library_version_is_nul_terminated() {
        let version = unsafe { CStr::from_ptr(gstbridge_library_version()) };
        assert!(
            version
                .to_str()
                .unwrap()
                .starts_with(env!("CARGO_PKG_VERSION"))
        );
    }
}
