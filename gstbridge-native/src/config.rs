// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline configuration received as JSON text.
//!
//! ```json
//! {"layout": "quad", "sources": ["rtmp://a", "rtmp://b", "rtmp://c", "rtmp://d"],
//!  "sink": "rtmp://out", "encoder": {"bframes": 0}, "muxer": {"streamable": true}}
//! ```

use serde::Deserialize;

use crate::error::{BridgeError, Result};
use crate::layout::Layout;

/// `x264enc` settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub bframes: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        // RTMP/FLV consumers choke on B-frames.
        EncoderSettings { bframes: 0 }
    }
}

/// `flvmux` settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MuxerSettings {
    pub streamable: bool,
}

impl Default for MuxerSettings {
    fn default() -> Self {
        MuxerSettings { streamable: true }
    }
}

/// Everything needed to build a context's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub layout: Layout,
    pub sources: Vec<String>,
    pub sink: String,
    #[serde(default)]
    pub encoder: EncoderSettings,
    #[serde(default)]
    pub muxer: MuxerSettings,
}

impl PipelineConfig {
    /// Relays one source to one sink.
    pub fn relay(source: &str, sink: &str) -> Self {
        PipelineConfig {
            layout: Layout::Single,
            sources: vec![source.to_owned()],
            sink: sink.to_owned(),
            encoder: EncoderSettings::default(),
            muxer: MuxerSettings::default(),
        }
    }

    /// Decodes and validates a configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the source count against the layout and rejects empty locations.
    pub fn validate(&self) -> Result<()> {
        let expected = self.layout.source_count();
        if self.sources.len() != expected {
            return Err(BridgeError::InvalidConfig(format!(
                "layout '{}' takes {} source(s), got {}",
                self.layout,
                expected,
                self.sources.len()
            )));
        }
        if let Some(index) = self.sources.iter().position(|s| s.trim().is_empty()) {
            return Err(BridgeError::InvalidConfig(format!(
                "source {index} has an empty location"
            )));
        }
        if self.sink.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "sink has an empty location".to_string(),
            ));
        }
        Ok(())
    }
}
