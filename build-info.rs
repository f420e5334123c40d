//! Build identification shared by the myp-train and myp-api binaries
//!
//! Both crates point `build =` at this file. It exports, as compile-time
//! environment variables:
//! - `GIT_HASH`: short commit hash, with `-dirty` when the tree has local edits
//! - `BUILD_TIMESTAMP`: ISO 8601 with local offset (e.g. 2025-10-26T14:30:45-05:00)
//! - `BUILD_PROFILE`: debug or release
//!
//! Each binary prints these in its startup banner.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    let git_hash = match git(&["rev-parse", "--short=8", "HEAD"]) {
        Some(hash) => {
            let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                .map_or(false, |status| !status.is_empty());
            if dirty {
                format!("{}-dirty", hash)
            } else {
                hash
            }
        }
        None => "unknown".to_string(),
    };

    let build_timestamp =
        chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // No rerun-if-changed directives: Cargo reruns this script on every build,
    // so the timestamp and hash always describe the binary being produced
}
