// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, Mutex, PoisonError};

use glib::translate::IntoGlib;
use gst::prelude::*;
use gstreamer as gst;

use crate::error::BridgeError;
use crate::events::{EventDispatcher, EventKind};
use crate::pipeline::CAT;

/// Bus watch installed by `start` for the lifetime of the main loop.
pub(crate) struct Watch {
    pub pipeline: glib::WeakRef<gst::Pipeline>,
    pub main_loop: glib::MainLoop,
    pub events: Arc<EventDispatcher>,
    pub is_live: bool,
    /// First error posted on the bus, handed back to `start`.
    pub failure: Arc<Mutex<Option<BridgeError>>>,
}

impl Watch {
    pub fn handle(&self, message: &gst::Message) -> glib::ControlFlow {
        let Some(pipeline) = self.pipeline.upgrade() else {
            self.main_loop.quit();
            return glib::ControlFlow::Break;
        };

        match message.view() {
            gst::MessageView::Error(err) => {
                let source_name = err
                    .src()
                    .map(|s| s.name().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                gst::error!(
                    CAT,
                    obj = &pipeline,
                    "Error received from element {}: {} ({:?})",
                    source_name,
                    err.error(),
                    err.debug()
                );
                let text = err.error().to_string();
                self.events
                    .emit(EventKind::Error, 0, &format!("{}: {}", source_name, text));
                self.failure
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get_or_insert(BridgeError::Stream {
                        source_name,
                        message: text,
                    });
                let _ = pipeline.set_state(gst::State::Ready);
                self.main_loop.quit();
            }
            gst::MessageView::Eos(..) => {
                gst::info!(CAT, obj = &pipeline, "End of stream reached.");
                self.events.emit(EventKind::Eos, 0, "");
                let _ = pipeline.set_state(gst::State::Ready);
                self.main_loop.quit();
            }
            gst::MessageView::Buffering(buffering) => {
                if self.is_live {
                    return glib::ControlFlow::Continue;
                }
                let percent = buffering.percent();
                self.events.emit(EventKind::Buffering, percent, "");
                let target = if percent < 100 {
                    gst::State::Paused
                } else {
                    gst::State::Playing
                };
                gst::debug!(CAT, obj = &pipeline, "Buffering {}%, going to {:?}", percent, target);
                let _ = pipeline.set_state(target);
            }
            gst::MessageView::ClockLost(..) => {
                gst::info!(CAT, obj = &pipeline, "Clock lost, selecting a new one");
                self.events.emit(EventKind::ClockLost, 0, "");
                let _ = pipeline.set_state(gst::State::Paused);
                let _ = pipeline.set_state(gst::State::Playing);
            }
            gst::MessageView::StateChanged(changed) => {
                if changed.src() == Some(pipeline.upcast_ref::<gst::Object>()) {
                    let current = changed.current();
                    gst::debug!(
                        CAT,
                        obj = &pipeline,
                        "State changed from {:?} to {:?}",
                        changed.old(),
                        current
                    );
                    self.events
                        .emit(EventKind::StateChanged, current.into_glib(), state_name(current));
                    pipeline.debug_to_dot_file(gst::DebugGraphDetails::MEDIA_TYPE, "playing");
                }
            }
            _ => (),
        }
        glib::ControlFlow::Continue
    }
}

fn state_name(state: gst::State) -> &'static str {
    match state {
        gst::State::VoidPending => "VoidPending",
        gst::State::Null => "Null",
        gst::State::Ready => "Ready",
        gst::State::Paused => "Paused",
        gst::State::Playing => "Playing",
        _ => "Unknown",
    }
}
