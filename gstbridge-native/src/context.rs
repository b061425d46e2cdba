// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! The state behind the opaque context handle.
//!
//! A context walks through `Allocated -> Configured -> Running -> Finished`.
//! It owns a private GLib main context and main loop: `start` makes that
//! context thread-default, attaches the bus watch to it and runs the loop;
//! `stop` posts the quit onto the same context, so it works from any thread
//! and is not lost when it arrives before the loop runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gst::prelude::*;
use gstreamer as gst;
use uuid::Uuid;

use crate::bus;
use crate::config::PipelineConfig;
use crate::error::{BridgeError, Result};
use crate::events::EventDispatcher;
use crate::pipeline::{self, CAT};

/// Lifecycle phase of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Allocated, no pipeline yet.
    Allocated,
    /// A pipeline has been built and is waiting for `start`.
    Configured,
    /// `start` is running the main loop.
    Running,
    /// `start` has returned; the pipeline is gone.
    Finished,
}

struct State {
    phase: Phase,
    pipeline: Option<gst::Pipeline>,
}

/// Native context handed to the caller as `*mut gstbridge_sys::Context`.
pub struct BridgeContext {
    id: Uuid,
    main_context: glib::MainContext,
    main_loop: glib::MainLoop,
    events: Arc<EventDispatcher>,
    state: Mutex<State>,
}

impl BridgeContext {
    /// Initialises GStreamer and creates an idle context.
    pub fn new() -> Result<Self> {
        gst::init()?;
        let main_context = glib::MainContext::new();
        let main_loop = glib::MainLoop::new(Some(&main_context), false);
        let id = Uuid::new_v4();
        tracing::info!(%id, "Set up the context and returning the pointer.");
        Ok(BridgeContext {
            id,
            main_context,
            main_loop,
            events: Arc::new(EventDispatcher::default()),
            state: Mutex::new(State {
                phase: Phase::Allocated,
                pipeline: None,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        // Only plain data lives behind the lock; a panic elsewhere cannot leave
        // it half-updated.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pipeline_name(&self) -> String {
        format!("contextdriven-{}", self.id.simple())
    }

    /// Builds the pipeline described by `config`.
    pub fn setup(&self, config: &PipelineConfig) -> Result<()> {
        self.configure(|| pipeline::build(&self.pipeline_name(), config, &self.events))
    }

    /// Builds the pipeline from a `gst-launch` style description.
    pub fn setup_launch(&self, description: &str) -> Result<()> {
        self.configure(|| pipeline::launch(&self.pipeline_name(), description))
    }

    fn configure<F>(&self, build: F) -> Result<()>
    where
        F: FnOnce() -> Result<gst::Pipeline>,
    {
        let mut state = self.lock_state();
        if state.phase != Phase::Allocated {
            return Err(BridgeError::Conflict(format!(
                "Context is already {:?}; setup is only valid once.",
                state.phase
            )));
        }
        let pipeline = build()?;
        tracing::info!(id = %self.id, pipeline = %pipeline.name(), "Returning successfully...");
        state.pipeline = Some(pipeline);
        state.phase = Phase::Configured;
        Ok(())
    }

    /// Plays the configured pipeline until it is stopped, fails or ends.
    ///
    /// Blocks the calling thread. On return the pipeline has been set to
    /// `NULL` and released and the context is `Finished`. An error posted on
    /// the bus while running is returned as [`BridgeError::Stream`].
    pub fn start(&self) -> Result<()> {
        let pipeline = {
            let mut state = self.lock_state();
            if state.phase != Phase::Configured {
                return Err(BridgeError::Conflict(format!(
                    "Context is {:?}; start needs a configured context.",
                    state.phase
                )));
            }
            state.phase = Phase::Running;
            state.pipeline.clone()
        };
        let result = match pipeline {
            Some(pipeline) => self.run(&pipeline),
            None => Err(BridgeError::Conflict(
                "Context has no pipeline.".to_string(),
            )),
        };

        let mut state = self.lock_state();
        state.pipeline = None;
        state.phase = Phase::Finished;
        result
    }

    fn run(&self, pipeline: &gst::Pipeline) -> Result<()> {
        let bus = pipeline
            .bus()
            .ok_or_else(|| glib::bool_error!("Pipeline without a bus"))?;

        let is_live = match pipeline.set_state(gst::State::Playing) {
            Ok(gst::StateChangeSuccess::NoPreroll) => true,
            Ok(_) => false,
            Err(_) => {
                gst::error!(CAT, obj = pipeline, "Unable to start playing the pipeline.");
                let _ = pipeline.set_state(gst::State::Null);
                return Err(BridgeError::StateChange(gst::State::Playing));
            }
        };
        gst::info!(CAT, obj = pipeline, "Playing (live: {})", is_live);

        let failure = Arc::new(Mutex::new(None));
        let watch = bus::Watch {
            pipeline: pipeline.downgrade(),
            main_loop: self.main_loop.clone(),
            events: self.events.clone(),
            is_live,
            failure: failure.clone(),
        };
        let ran = self
            .main_context
            .with_thread_default(|| -> Result<()> {
                let _guard = bus.add_watch(move |_, message| watch.handle(message))?;
                self.main_loop.run();
                Ok(())
            })
            .map_err(BridgeError::from)
            .and_then(|ran| ran);

        if pipeline.set_state(gst::State::Null).is_err() {
            gst::warning!(CAT, obj = pipeline, "Failed to set the pipeline to NULL");
        }
        tracing::info!(id = %self.id, "Main loop finished");
        ran?;
        match failure.lock().unwrap_or_else(PoisonError::into_inner).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Asks a running (or about to run) `start` to return.
    pub fn stop(&self) {
        tracing::info!(id = %self.id, "Stopping...");
        let main_loop = self.main_loop.clone();
        self.main_context.invoke(move || main_loop.quit());
    }
}

impl Drop for BridgeContext {
    fn drop(&mut self) {
        let state = self.lock_state();
        if let Some(pipeline) = &state.pipeline {
            let _ = pipeline.set_state(gst::State::Null);
        }
        tracing::debug!(id = %self.id, "Context released");
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn new_context_is_allocated() {
        let context = BridgeContext::new().unwrap();
        assert_eq!(context.phase(), Phase::Allocated);
        assert!(!context.events().is_registered());
    }

    #[test]
    fn start_without_setup_conflicts() {
        let context = BridgeContext::new().unwrap();
        let error = context.start().unwrap_err();
        assert_eq!(error.status_code(), gstbridge_sys::STATUS_CONFLICT);
        assert_eq!(context.phase(), Phase::Allocated);
    }

    #[test]
    fn setup_only_once() {
        let context = BridgeContext::new().unwrap();
        context.setup_launch("fakesrc ! fakesink").unwrap();
        assert_eq!(context.phase(), Phase::Configured);
        let error = context.setup_launch("fakesrc ! fakesink").unwrap_err();
        assert_eq!(error.status_code(), gstbridge_sys::STATUS_CONFLICT);
    }

    #[test]
    fn failed_setup_can_be_retried() {
        let context = BridgeContext::new().unwrap();
        assert!(context.setup_launch("no-such-element").is_err());
        assert_eq!(context.phase(), Phase::Allocated);
        context.setup_launch("fakesrc ! fakesink").unwrap();
    }

    #[test]
    fn stop_before_start_returns_promptly() {
        let context = BridgeContext::new().unwrap();
        context.setup_launch("fakesrc ! fakesink").unwrap();
        context.stop();
        let started = Instant::now();
        context.start().unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(context.phase(), Phase::Finished);
    }

    #[test]
    fn stop_from_another_thread() {
        let context = Arc::new(BridgeContext::new().unwrap());
        context.setup_launch("fakesrc ! fakesink").unwrap();
        let stopper = {
            let context = context.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(100));
                context.stop();
            })
        };
        context.start().unwrap();
        stopper.join().unwrap();
        assert_eq!(context.phase(), Phase::Finished);
        assert!(context.start().is_err());
    }

    #[test]
    fn bus_error_ends_start_with_a_stream_error() {
        let context = BridgeContext::new().unwrap();
        context
            .setup_launch("fakesrc ! fakesink name=sink")
            .unwrap();
        let pipeline = context.lock_state().pipeline.clone().unwrap();
        let poster = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            let sink = pipeline.by_name("sink").unwrap();
            let message = gst::message::Error::builder(gst::CoreError::Failed, "stream died")
                .src(&sink)
                .build();
            pipeline.bus().unwrap().post(message).unwrap();
        });

        let started = Instant::now();
        let error = context.start().unwrap_err();
        poster.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(error.status_code(), gstbridge_sys::STATUS_INTERNAL_ERROR);
        assert_eq!(
            error.to_string(),
            "Error received from element sink: stream died"
        );
        assert_eq!(context.phase(), Phase::Finished);
    }

    #[test]
    fn end_of_stream_ends_start() {
        let context = BridgeContext::new().unwrap();
        context
            .setup_launch("fakesrc num-buffers=3 ! fakesink")
            .unwrap();
        context.start().unwrap();
        assert_eq!(context.phase(), Phase::Finished);
    }
}
