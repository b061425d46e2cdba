// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Shared setup for the integration tests.
//!
//! The native crate is linked into the test binary, so its exported functions
//! are wrapped directly instead of loading the shared library from disk.

use gstbridge::{Bridge, BridgeApiHandle, from_functions};
use gstbridge_native as native;
use gstbridge_sys::Functions;

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

pub fn in_process_api() -> BridgeApiHandle {
    from_functions(Functions {
        hello: native::gstbridge_hello,
        library_version: native::gstbridge_library_version,
        gst_version: native::gstbridge_gst_version,
        parameter_in: native::gstbridge_parameter_in,
        parameter_out: native::gstbridge_parameter_out,
        check_elements: native::gstbridge_check_elements,
        hello_with: native::gstbridge_hello_with,
        video_test_source: native::gstbridge_video_test_source,
        allocate: native::gstbridge_allocate,
        setup: native::gstbridge_setup,
        setup_config: native::gstbridge_setup_config,
        setup_launch: native::gstbridge_setup_launch,
        set_event_callback: native::gstbridge_set_event_callback,
        start: native::gstbridge_start,
        stop: native::gstbridge_stop,
        release: native::gstbridge_release,
    })
}

/// Initializes logging once and returns a bridge over the linked library.
pub fn setup_test() -> Bridge {
    LOG_ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
    Bridge::new(in_process_api())
}
