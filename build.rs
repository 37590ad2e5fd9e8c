//! Build script stamping the dashboard host with a version and commit.
//!
//! - DHD_VERSION overrides CARGO_PKG_VERSION
//! - DHD_GIT_SHA overrides GITHUB_SHA, which overrides `git rev-parse`

use std::process::Command;

fn main() {
    let version = std::env::var("DHD_VERSION").unwrap_or_else(|_| {
        std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".into())
    });
    println!("cargo:rustc-env=DHD_VERSION={}", version);

    let git_sha = std::env::var("DHD_GIT_SHA")
        .ok()
        .or_else(|| {
            std::env::var("GITHUB_SHA")
                .ok()
                .map(|s| s.get(..7).unwrap_or(&s).to_string())
        })
        .unwrap_or_else(commit_from_git);
    println!("cargo:rustc-env=DHD_GIT_SHA={}", git_sha);

    println!("cargo:rerun-if-env-changed=DHD_VERSION");
    println!("cargo:rerun-if-env-changed=DHD_GIT_SHA");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
}

fn commit_from_git() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".into())
}
