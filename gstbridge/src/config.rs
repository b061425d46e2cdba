// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Locating the native library at runtime.

use std::path::PathBuf;

// Build script generates constants.rs with GSTBRIDGE_BUILD_DIR
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

/// Environment variable overriding the library location.
pub const LIBRARY_ENV: &str = "GSTBRIDGE_LIBRARY";

/// Returns the path of the native shared library.
///
/// `GSTBRIDGE_LIBRARY` wins when set. Otherwise the library is expected in the
/// target directory of the build that produced this crate, under its platform
/// specific file name (`libgstbridge_native.so` on Linux).
///
/// # Examples
///
/// ```no_run
/// use gstbridge::config::get_library_path;
/// use gstbridge::load_api;
///
/// # fn main() -> Result<(), gstbridge::Error> {
/// let api = load_api(get_library_path())?;
/// # Ok(())
/// # }
/// ```
pub fn get_library_path() -> PathBuf {
    if let Some(path) = std::env::var_os(LIBRARY_ENV) {
        return path.into();
    }
    PathBuf::from(GSTBRIDGE_BUILD_DIR).join(libloading::library_filename("gstbridge_native"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_names_the_native_library() {
        if std::env::var_os(LIBRARY_ENV).is_some() {
            return;
        }
        let path = get_library_path();
        let file_name = path.file_name().unwrap().to_string_lossy();
        assert!(file_name.contains("gstbridge_native"));
        assert!(path.starts_with(GSTBRIDGE_BUILD_DIR));
    }
}
