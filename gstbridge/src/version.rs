// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Kind of GStreamer build, encoded in the nano version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// A regular release (any nano other than 1 or 2).
    Release,
    /// A build from version control (nano 1).
    Cvs,
    /// A prerelease (nano 2).
    Prerelease,
}

/// Version of the GStreamer library the native side is linked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GstVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub nano: u32,
}

impl GstVersion {
    pub fn release(&self) -> Release {
        match self.nano {
            1 => Release::Cvs,
            2 => Release::Prerelease,
            _ => Release::Release,
        }
    }
}

impl From<gstbridge_sys::Version> for GstVersion {
    fn from(version: gstbridge_sys::Version) -> Self {
        GstVersion {
            major: version.major,
            minor: version.minor,
            micro: version.micro,
            nano: version.nano,
        }
    }
}

impl fmt::Display for GstVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        match self.release() {
            Release::Release => Ok(()),
            Release::Cvs => f.write_str(" (CVS)"),
            Release::Prerelease => f.write_str(" (Prerelease)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(nano: u32) -> GstVersion {
        GstVersion {
            major: 1,
            minor: 24,
            micro: 2,
            nano,
        }
    }

    #[test]
    fn display_matches_the_native_log() {
        assert_eq!(version(0).to_string(), "1.24.2");
        assert_eq!(version(1).to_string(), "1.24.2 (CVS)");
        assert_eq!(version(2).to_string(), "1.24.2 (Prerelease)");
        assert_eq!(version(3).to_string(), "1.24.2");
    }

    #[test]
    fn nano_classifies_the_release() {
        assert_eq!(version(0).release(), Release::Release);
        assert_eq!(version(1).release(), Release::Cvs);
        assert_eq!(version(2).release(), Release::Prerelease);
        assert_eq!(version(3).release(), Release::Release);
    }
}
