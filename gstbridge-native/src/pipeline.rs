// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline construction.
//!
//! Every configured pipeline has the same output chain:
//!
//! ```text
//! output_converter ! x264enc ! flvmux ! rtmpsink
//! ```
//!
//! and one input branch per source:
//!
//! ```text
//! rtmpsrc ! decodebin ~> head [! videobox] ! videoconvert ! capsfilter ! compositor
//! ```
//!
//! `decodebin` exposes its pads only once the stream is known, so the link from
//! the decoder to the branch head (`~>`) is made from its `pad-added` signal.
//! The single layout has no compositor; its head is linked straight to the
//! output converter through AYUV caps.

use std::sync::{Arc, LazyLock};

use gst::prelude::*;
use gstreamer as gst;

use crate::config::{EncoderSettings, MuxerSettings, PipelineConfig};
use crate::error::{BridgeError, Result};
use crate::events::{EventDispatcher, EventKind};
use crate::layout::Tile;

/// GStreamer debug category for pipeline construction and bus handling.
pub(crate) static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "gstbridge",
        gst::DebugColorFlags::empty(),
        Some("GStreamer bridge native library"),
    )
});

/// Raw video format every source is converted to before mixing.
const MIX_FORMAT: &str = "AYUV";

fn make(factory: &str, name: &str) -> Result<gst::Element> {
    gst::ElementFactory::make(factory)
        .name(name)
        .build()
        .map_err(|source| BridgeError::ElementCreation {
            factory: factory.to_owned(),
            source,
        })
}

fn link(from: &gst::Element, to: &gst::Element) -> Result<()> {
    from.link(to).map_err(|_| BridgeError::Link {
        from: from.name().to_string(),
        to: to.name().to_string(),
    })
}

fn link_filtered(from: &gst::Element, to: &gst::Element, caps: &gst::Caps) -> Result<()> {
    from.link_filtered(to, caps).map_err(|_| BridgeError::Link {
        from: from.name().to_string(),
        to: to.name().to_string(),
    })
}

fn mix_caps(size: Option<(i32, i32)>) -> gst::Caps {
    let builder = gst::Caps::builder("video/x-raw").field("format", MIX_FORMAT);
    match size {
        Some((width, height)) => builder
            .field("width", width)
            .field("height", height)
            .build(),
        None => builder.build(),
    }
}

/// Builds `output_converter ! x264enc ! flvmux ! rtmpsink` and returns its head.
fn output_chain(
    pipeline: &gst::Pipeline,
    sink_location: &str,
    encoder: &EncoderSettings,
    muxer: &MuxerSettings,
) -> Result<gst::Element> {
    let converter = make("videoconvert", "output_converter")?;
    let h264 = make("x264enc", "encoder")?;
    let flv = make("flvmux", "muxer")?;
    let sink = make("rtmpsink", "sink")?;

    h264.set_property("bframes", encoder.bframes);
    flv.set_property("streamable", muxer.streamable);
    sink.set_property("location", sink_location);

    pipeline.add_many([&converter, &h264, &flv, &sink])?;
    link(&converter, &h264)?;
    link(&h264, &flv)?;
    link(&flv, &sink)?;

    Ok(converter)
}

/// Links a freshly exposed decoder pad to `head` if it carries raw video.
fn link_decoded_pad(
    decoder: &gst::Element,
    pad: &gst::Pad,
    head: &gst::Element,
    events: &EventDispatcher,
) {
    gst::info!(
        CAT,
        obj = decoder,
        "Received new pad '{}' from '{}'",
        pad.name(),
        decoder.name()
    );
    let Some(sink_pad) = head.static_pad("sink") else {
        gst::error!(CAT, obj = head, "Branch head has no sink pad");
        return;
    };
    if sink_pad.is_linked() {
        gst::debug!(CAT, obj = decoder, "Video pad linked already");
        return;
    }

    let caps = pad.current_caps().unwrap_or_else(|| pad.query_caps(None));
    let Some(media_type) = caps.structure(0).map(|s| s.name().to_string()) else {
        gst::warning!(CAT, obj = decoder, "Pad '{}' has empty caps", pad.name());
        return;
    };
    if !media_type.starts_with("video/x-raw") {
        gst::debug!(CAT, obj = decoder, "Ignoring pad of type '{}'", media_type);
        return;
    }

    match pad.link(&sink_pad) {
        Ok(_) => {
            gst::info!(CAT, obj = decoder, "Link succeeded with type '{}'", media_type);
            events.emit(EventKind::PadLinked, 0, &media_type);
        }
        Err(err) => {
            gst::warning!(
                CAT,
                obj = decoder,
                "Type is '{}', but linking failed: {:?}",
                media_type,
                err
            );
        }
    }
}

/// Builds `rtmpsrc ! decodebin ~> head [! videobox]` and returns the branch tail.
fn input_branch(
    pipeline: &gst::Pipeline,
    index: usize,
    location: &str,
    tile: &Tile,
    events: &Arc<EventDispatcher>,
) -> Result<gst::Element> {
    let source = make("rtmpsrc", &format!("source{index}"))?;
    source.set_property("location", location);
    let decoder = make("decodebin", &format!("decoder{index}"))?;
    let head = match tile.size {
        Some(_) => make("videoscale", &format!("scaler{index}"))?,
        None => make("videoconvert", &format!("converter{index}"))?,
    };

    pipeline.add_many([&source, &decoder, &head])?;
    link(&source, &decoder)?;

    let head_weak = head.downgrade();
    let events = events.clone();
    decoder.connect_pad_added(move |decoder, pad| {
        let Some(head) = head_weak.upgrade() else {
            return;
        };
        link_decoded_pad(decoder, pad, &head, &events);
    });

    let Some(crop) = tile.crop else {
        return Ok(head);
    };
    let videobox = make("videobox", &format!("videobox{index}"))?;
    videobox.set_property("left", crop.left);
    videobox.set_property("right", crop.right);
    videobox.set_property("top", crop.top);
    videobox.set_property("bottom", crop.bottom);
    pipeline.add(&videobox)?;
    link(&head, &videobox)?;
    Ok(videobox)
}

/// Converts a branch to the mixing format and places it on the compositor.
fn attach_to_mixer(
    pipeline: &gst::Pipeline,
    index: usize,
    tail: &gst::Element,
    mixer: &gst::Element,
    tile: &Tile,
) -> Result<()> {
    let converter = make("videoconvert", &format!("stream{index}_converter"))?;
    let filter = make("capsfilter", &format!("stream{index}_caps"))?;
    filter.set_property("caps", mix_caps(tile.size));
    pipeline.add_many([&converter, &filter])?;
    link(tail, &converter)?;
    link(&converter, &filter)?;

    let link_error = || BridgeError::Link {
        from: filter.name().to_string(),
        to: mixer.name().to_string(),
    };
    let mixer_pad = mixer.request_pad_simple("sink_%u").ok_or_else(link_error)?;
    mixer_pad.set_property("xpos", tile.xpos);
    mixer_pad.set_property("ypos", tile.ypos);
    mixer_pad.set_property("zorder", tile.zorder);
    let src_pad = filter.static_pad("src").ok_or_else(link_error)?;
    src_pad.link(&mixer_pad).map_err(|_| link_error())?;

    gst::debug!(
        CAT,
        obj = mixer,
        "Placed source {} at ({}, {}) z={}",
        index,
        tile.xpos,
        tile.ypos,
        tile.zorder
    );
    Ok(())
}

/// Builds the pipeline described by `config`.
///
/// Events for linked decoder pads are reported through `events`.
pub fn build(
    name: &str,
    config: &PipelineConfig,
    events: &Arc<EventDispatcher>,
) -> Result<gst::Pipeline> {
    config.validate()?;
    let pipeline = gst::Pipeline::with_name(name);
    let output = output_chain(&pipeline, &config.sink, &config.encoder, &config.muxer)?;

    let mixer = if config.layout.is_composed() {
        let mixer = make("compositor", "mixer")?;
        pipeline.add(&mixer)?;
        link(&mixer, &output)?;
        Some(mixer)
    } else {
        None
    };

    let tiles = config.layout.tiles();
    for (index, (location, tile)) in config.sources.iter().zip(tiles.iter()).enumerate() {
        let tail = input_branch(&pipeline, index, location, tile, events)?;
        match &mixer {
            Some(mixer) => attach_to_mixer(&pipeline, index, &tail, mixer, tile)?,
            None => link_filtered(&tail, &output, &mix_caps(None))?,
        }
    }

    gst::info!(
        CAT,
        obj = &pipeline,
        "Built '{}' pipeline with {} source(s)",
        config.layout,
        config.sources.len()
    );
    Ok(pipeline)
}

/// Builds a pipeline from a `gst-launch` style description.
pub fn launch(name: &str, description: &str) -> Result<gst::Pipeline> {
    let element = gst::parse::launch(description)
        .map_err(|err| BridgeError::InvalidConfig(err.to_string()))?;
    match element.downcast::<gst::Pipeline>() {
        Ok(pipeline) => Ok(pipeline),
        Err(element) => {
            let pipeline = gst::Pipeline::with_name(name);
            pipeline.add(&element)?;
            Ok(pipeline)
        }
    }
}

/// Builds `videotestsrc ! videoconvert ! x264enc ! flvmux ! rtmpsink`.
pub fn video_test_source(sink_location: &str) -> Result<gst::Pipeline> {
    let pipeline = gst::Pipeline::with_name("testsource");
    let source = make("videotestsrc", "source")?;
    pipeline.add(&source)?;
    let output = output_chain(
        &pipeline,
        sink_location,
        &EncoderSettings::default(),
        &MuxerSettings::default(),
    )?;
    link(&source, &output)?;
    Ok(pipeline)
}

/// Plays `pipeline` until it posts an error or reaches end of stream.
///
/// The pipeline is always returned to `NULL` before this function returns.
pub fn run_to_completion(pipeline: &gst::Pipeline) -> Result<()> {
    let result = play_and_wait(pipeline);
    if pipeline.set_state(gst::State::Null).is_err() {
        gst::warning!(CAT, obj = pipeline, "Failed to set the pipeline to NULL");
    }
    result
}

fn play_and_wait(pipeline: &gst::Pipeline) -> Result<()> {
    let bus = pipeline
        .bus()
        .ok_or_else(|| glib::bool_error!("Pipeline without a bus"))?;
    pipeline
        .set_state(gst::State::Playing)
        .map_err(|_| BridgeError::StateChange(gst::State::Playing))?;

    let message = bus.timed_pop_filtered(
        gst::ClockTime::NONE,
        &[gst::MessageType::Error, gst::MessageType::Eos],
    );
    let Some(message) = message else {
        return Ok(());
    };
    match message.view() {
        gst::MessageView::Error(err) => {
            let source_name = err
                .src()
                .map(|s| s.name().to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            let debug_info = err
                .debug()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string());
            gst::error!(CAT, obj = pipeline, "Debug info: {}", debug_info);
            Err(BridgeError::Stream {
                source_name,
                message: err.error().to_string(),
            })
        }
        gst::MessageView::Eos(..) => {
            gst::info!(CAT, obj = pipeline, "End of stream reached.");
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    fn init() {
        gst::init().unwrap();
    }

    #[test]
    fn mix_caps_carry_the_tile_size() {
        init();
        let caps = mix_caps(Some((320, 180)));
        let structure = caps.structure(0).unwrap();
        assert_eq!(structure.name().as_str(), "video/x-raw");
        assert_eq!(structure.get::<&str>("format").unwrap(), MIX_FORMAT);
        assert_eq!(structure.get::<i32>("width").unwrap(), 320);
        assert_eq!(structure.get::<i32>("height").unwrap(), 180);
        assert!(!mix_caps(None).structure(0).unwrap().has_field("width"));
    }

    #[test]
    fn missing_factory_names_the_element() {
        init();
        let error = make("no-such-factory", "broken").unwrap_err();
        assert_eq!(error.to_string(), "Could not create element 'no-such-factory'.");
        assert_eq!(error.status_code(), gstbridge_sys::STATUS_INTERNAL_ERROR);
    }

    #[test]
    fn launch_wraps_core_elements() {
        init();
        let pipeline = launch("launched", "fakesrc num-buffers=1 ! fakesink").unwrap();
        assert_eq!(pipeline.children().len(), 2);
    }

    #[test]
    fn launch_wraps_a_lone_element_in_a_pipeline() {
        init();
        let pipeline = launch("lonely", "fakesink").unwrap();
        assert_eq!(pipeline.name().as_str(), "lonely");
        assert_eq!(pipeline.children().len(), 1);
    }

    #[test]
    fn launch_rejects_unknown_elements() {
        init();
        let error = launch("bad", "no-such-element ! fakesink").unwrap_err();
        assert_eq!(error.status_code(), gstbridge_sys::STATUS_BAD_REQUEST);
    }

    const LAYOUT_FACTORIES: [&str; 10] = [
        "rtmpsrc",
        "rtmpsink",
        "decodebin",
        "videoconvert",
        "videoscale",
        "videobox",
        "capsfilter",
        "compositor",
        "x264enc",
        "flvmux",
    ];

    /// Builds `layout` with generated locations, or `None` when a plugin is missing.
    fn build_layout(layout: Layout) -> Option<gst::Pipeline> {
        init();
        let missing: Vec<&str> = LAYOUT_FACTORIES
            .into_iter()
            .filter(|factory| gst::ElementFactory::find(factory).is_none())
            .collect();
        if !missing.is_empty() {
            eprintln!("Skipping the {layout} layout, missing elements: {missing:?}");
            return None;
        }
        let config = PipelineConfig {
            layout,
            sources: (0..layout.source_count())
                .map(|index| format!("rtmp://localhost/live/in{index}"))
                .collect(),
            ..PipelineConfig::relay("rtmp://localhost/live/in", "rtmp://localhost/live/out")
        };
        let events = Arc::new(EventDispatcher::default());
        Some(build(&format!("{layout}-test"), &config, &events).unwrap())
    }

    fn element(pipeline: &gst::Pipeline, name: &str) -> gst::Element {
        pipeline
            .by_name(name)
            .unwrap_or_else(|| panic!("no element named '{name}'"))
    }

    fn placement(pipeline: &gst::Pipeline, index: usize) -> (i32, i32, u32) {
        let pad = element(pipeline, "mixer")
            .static_pad(&format!("sink_{index}"))
            .unwrap();
        (
            pad.property::<i32>("xpos"),
            pad.property::<i32>("ypos"),
            pad.property::<u32>("zorder"),
        )
    }

    fn caps_size(pipeline: &gst::Pipeline, index: usize) -> (i32, i32) {
        let caps = element(pipeline, &format!("stream{index}_caps")).property::<gst::Caps>("caps");
        let structure = caps.structure(0).unwrap();
        assert_eq!(structure.get::<&str>("format").unwrap(), MIX_FORMAT);
        (
            structure.get::<i32>("width").unwrap(),
            structure.get::<i32>("height").unwrap(),
        )
    }

    fn assert_center_crop(pipeline: &gst::Pipeline, index: usize) {
        let videobox = element(pipeline, &format!("videobox{index}"));
        assert_eq!(videobox.property::<i32>("left"), 160);
        assert_eq!(videobox.property::<i32>("right"), 160);
        assert_eq!(videobox.property::<i32>("top"), 0);
        assert_eq!(videobox.property::<i32>("bottom"), 0);
    }

    #[test]
    fn output_chain_carries_the_settings() {
        let Some(pipeline) = build_layout(Layout::Single) else {
            return;
        };
        assert_eq!(element(&pipeline, "encoder").property::<u32>("bframes"), 0);
        assert!(element(&pipeline, "muxer").property::<bool>("streamable"));
        assert_eq!(
            element(&pipeline, "source0").property::<Option<String>>("location"),
            Some("rtmp://localhost/live/in0".to_string())
        );
    }

    #[test]
    fn single_layout_links_without_a_mixer() {
        let Some(pipeline) = build_layout(Layout::Single) else {
            return;
        };
        assert!(pipeline.by_name("mixer").is_none());
        // Output chain, source branch and the capsfilter added by the filtered link.
        assert_eq!(pipeline.children().len(), 8);
        let output_sink = element(&pipeline, "output_converter").static_pad("sink").unwrap();
        assert!(output_sink.is_linked());
        let converter_src = element(&pipeline, "converter0").static_pad("src").unwrap();
        assert!(converter_src.is_linked());
    }

    #[test]
    fn picture_in_picture_places_the_inset() {
        let Some(pipeline) = build_layout(Layout::PictureInPicture) else {
            return;
        };
        assert_eq!(pipeline.children().len(), 15);
        assert_eq!(placement(&pipeline, 0), (0, 0, 0));
        assert_eq!(placement(&pipeline, 1), (438, 210, 100));
        assert_eq!(caps_size(&pipeline, 1), (200, 150));
        assert!(pipeline.by_name("scaler1").is_some());
        assert!(pipeline.by_name("videobox1").is_none());
    }

    #[test]
    fn split_layout_crops_both_sources() {
        let Some(pipeline) = build_layout(Layout::Split) else {
            return;
        };
        assert_eq!(pipeline.children().len(), 17);
        assert_center_crop(&pipeline, 0);
        assert_center_crop(&pipeline, 1);
        assert_eq!(placement(&pipeline, 0), (0, 0, 0));
        assert_eq!(placement(&pipeline, 1), (320, 0, 0));
    }

    #[test]
    fn quad_layout_fills_the_grid() {
        let Some(pipeline) = build_layout(Layout::Quad) else {
            return;
        };
        assert_eq!(pipeline.children().len(), 25);
        let corners = [(0, 0), (320, 0), (0, 180), (320, 180)];
        for (index, (xpos, ypos)) in corners.into_iter().enumerate() {
            assert_eq!(placement(&pipeline, index), (xpos, ypos, 0));
            assert_eq!(caps_size(&pipeline, index), (320, 180));
        }
    }

    #[test]
    fn judge_layout_stacks_the_judges() {
        let Some(pipeline) = build_layout(Layout::Judge) else {
            return;
        };
        assert_eq!(pipeline.children().len(), 26);
        assert_center_crop(&pipeline, 0);
        assert_eq!(placement(&pipeline, 0), (0, 0, 0));
        for (index, ypos) in [(1, 0), (2, 120), (3, 240)] {
            assert_eq!(placement(&pipeline, index), (320, ypos, 0));
            assert_eq!(caps_size(&pipeline, index), (213, 120));
        }
    }

    #[test]
    fn finite_pipeline_runs_to_end_of_stream() {
        init();
        let pipeline = launch("finite", "fakesrc num-buffers=5 ! fakesink").unwrap();
        run_to_completion(&pipeline).unwrap();
        assert_eq!(pipeline.current_state(), gst::State::Null);
    }
}
