// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Output layouts.
//!
//! A layout decides how many sources a pipeline takes and where each decoded
//! source lands on the 640x360 output canvas. The geometry here is pure data;
//! [`crate::pipeline`] turns it into `videobox`, `videoscale`, `capsfilter` and
//! `compositor` pad settings.

use serde::Deserialize;

/// Pixels cropped from each edge of a source before it is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crop {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// Placement of one source on the output canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub xpos: i32,
    pub ypos: i32,
    /// Scaled size, `None` keeps the decoded size.
    pub size: Option<(i32, i32)>,
    pub crop: Option<Crop>,
    pub zorder: u32,
}

impl Tile {
    const fn at(xpos: i32, ypos: i32) -> Self {
        Tile {
            xpos,
            ypos,
            size: None,
            crop: None,
            zorder: 0,
        }
    }

    const fn scaled(self, width: i32, height: i32) -> Self {
        Tile {
            size: Some((width, height)),
            ..self
        }
    }

    const fn cropped(self, crop: Crop) -> Self {
        Tile {
            crop: Some(crop),
            ..self
        }
    }

    const fn above(self, zorder: u32) -> Self {
        Tile { zorder, ..self }
    }
}

/// Trims a 640 wide source down to its central 320 columns.
const CENTER_HALF: Crop = Crop {
    left: 160,
    right: 160,
    top: 0,
    bottom: 0,
};

/// How the sources of a pipeline are arranged in the output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One source relayed as is.
    #[default]
    Single,
    /// A main source with a small inset in the lower right corner.
    PictureInPicture,
    /// Two sources side by side, each cropped to its central half.
    Split,
    /// Four sources in a 2x2 grid.
    Quad,
    /// A cropped main source with three small judges stacked on the right.
    Judge,
}

impl Layout {
    /// Number of sources the layout consumes.
    pub fn source_count(self) -> usize {
        self.tiles().len()
    }

    /// Whether the sources need a mixer to be combined.
    pub fn is_composed(self) -> bool {
        self != Layout::Single
    }

    /// Tile of every source, in source order.
    pub fn tiles(self) -> Vec<Tile> {
        match self {
            Layout::Single => vec![Tile::at(0, 0)],
            Layout::PictureInPicture => vec![
                Tile::at(0, 0),
                Tile::at(438, 210).scaled(200, 150).above(100),
            ],
            Layout::Split => vec![
                Tile::at(0, 0).cropped(CENTER_HALF),
                Tile::at(320, 0).cropped(CENTER_HALF),
            ],
            Layout::Quad => vec![
                Tile::at(0, 0).scaled(320, 180),
                Tile::at(320, 0).scaled(320, 180),
                Tile::at(0, 180).scaled(320, 180),
                Tile::at(320, 180).scaled(320, 180),
            ],
            Layout::Judge => vec![
                Tile::at(0, 0).cropped(CENTER_HALF),
                Tile::at(320, 0).scaled(213, 120),
                Tile::at(320, 120).scaled(213, 120),
                Tile::at(320, 240).scaled(213, 120),
            ],
        }
    }

    /// Name used in configurations and logs.
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

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
