// SPDX-FileCopyrightText: 2025 Contributors to the gstbridge project.
// SPDX-License-Identifier: Apache-2.0

//! Build script for the `gstbridge` crate.
//!
//! Generates `constants.rs` with the target directory of the current build
//! profile, which is where cargo places `libgstbridge_native` when the whole
//! workspace is built. The configuration module uses it as the default
//! library location.

use std::env;
use std::path::PathBuf;

fn main() {
    // OUT_DIR is <target>/<profile>/build/<package>-<hash>/out
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("failed to get output directory"));
    let profile_dir = out_dir
        .ancestors()
        .nth(3)
        .expect("unexpected OUT_DIR layout")
        .to_path_buf();

    let data = format!(
        "pub const GSTBRIDGE_BUILD_DIR: &str = {:?};\n",
        profile_dir.to_string_lossy()
    );
    std::fs::write(out_dir.join("constants.rs"), data).expect("Unable to write file");
    println!("cargo:rerun-if-changed=build.rs");
}
