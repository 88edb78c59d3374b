//! Point Windows builds at a vcpkg FFmpeg install when `FFMPEG_DIR` is unset.

use std::env;
use std::path::PathBuf;

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

fn vcpkg_install_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let building_for_windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !building_for_windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_install_dir() {
        None => println!(
            "cargo:warning=retime links FFmpeg through ffmpeg-sys-next; set FFMPEG_DIR (or VCPKG_ROOT with an FFmpeg install) on Windows."
        ),
        Some(directory) if directory.exists() => {
            println!(
                "cargo:warning=Found vcpkg FFmpeg at {0}; export FFMPEG_DIR={0} to silence this warning.",
                directory.display()
            );
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                println!("cargo:warning=Set VCPKGRS_DYNAMIC=1 if that FFmpeg build is dynamic.");
            }
        }
        Some(directory) => println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist.",
            directory.display()
        ),
    }
}
