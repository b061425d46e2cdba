// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline configurations sent to [`crate::BridgeContext::setup_config`].
//!
//! The types serialise to the JSON text the native library expects:
//!
//! ```json
//! {"layout": "split", "sources": ["rtmp://a", "rtmp://b"], "sink": "rtmp://out",
//!  "encoder": {"bframes": 0}, "muxer": {"streamable": true}}
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Arrangement of the sources in the output picture.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One source relayed as is.
    #[default]
    Single,
    /// A main source with a small inset.
    PictureInPicture,
    /// Two sources side by side.
    Split,
    /// Four sources in a 2x2 grid.
    Quad,
    /// A main source with three small judges on the right.
    Judge,
}

impl Layout {
    pub const ALL: [Layout; 5] = [
        Layout::Single,
        Layout::PictureInPicture,
        Layout::Split,
        Layout::Quad,
        Layout::Judge,
    ];

    /// Number of sources the layout consumes.
    pub fn source_count(self) -> usize {
        match self {
            Layout::Single => 1,
            Layout::PictureInPicture | Layout::Split => 2,
            Layout::Quad | Layout::Judge => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layout::Single => "single",
            Layout::PictureInPicture => "picture_in_picture",
            Layout::Split => "split",
            Layout::Quad => "quad",
            Layout::Judge => "judge",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.name() == s)
            .ok_or_else(|| Error::Other(format!("Unknown layout '{s}'")))
    }
}

/// `x264enc` settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub bframes: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        EncoderSettings { bframes: 0 }
    }
}

/// `flvmux` settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxerSettings {
    pub streamable: bool,
}

impl Default for MuxerSettings {
    fn default() -> Self {
        MuxerSettings { streamable: true }
    }
}

/// Description of a context's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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
    /// One source relayed to one sink.
    pub fn relay(source: impl Into<String>, sink: impl Into<String>) -> Self {
        Self::new(Layout::Single, vec![source.into()], sink)
    }

    pub fn new(layout: Layout, sources: Vec<String>, sink: impl Into<String>) -> Self {
        PipelineConfig {
            layout,
            sources,
            sink: sink.into(),
            encoder: EncoderSettings::default(),
            muxer: MuxerSettings::default(),
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Encodes the configuration as the JSON text sent across the boundary.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_encodes_with_defaults() {
        let json = PipelineConfig::relay("rtmp://in", "rtmp://out")
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["layout"], "single");
        assert_eq!(value["sources"][0], "rtmp://in");
        assert_eq!(value["encoder"]["bframes"], 0);
        assert_eq!(value["muxer"]["streamable"], true);
    }

    #[test]
    fn layouts_parse_from_their_names() {
        for layout in Layout::ALL {
            assert_eq!(layout.name().parse::<Layout>().unwrap(), layout);
        }
        assert!("mosaic".parse::<Layout>().is_err());
        assert_eq!(Layout::Judge.source_count(), 4);
    }

    #[test]
    fn configuration_files_are_loaded() {
        let path = std::env::temp_dir().join(format!(
            "gstbridge_config_test_{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"layout": "picture_in_picture", "sources": ["rtmp://a", "rtmp://b"], "sink": "rtmp://out"}"#,
        )
        .unwrap();
        let config = PipelineConfig::from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.layout, Layout::PictureInPicture);
        assert_eq!(config.sources.len(), 2);
        assert!(config.muxer.streamable);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = PipelineConfig::from_file("/nonexistent/pipeline.json").unwrap_err();
        assert!(matches!(error, Error::Io(_)));
    }
}
