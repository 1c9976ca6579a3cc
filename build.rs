// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=PHOTO_JOURNAL_VERSION");

    // Packaged builds set the version explicitly
    let version = match std::env::var("PHOTO_JOURNAL_VERSION") {
        Ok(v) => v,
        Err(_) => git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version from `git describe`, formatted as `0.1.0-abcdef1` on a tag
/// and `0.1.0-dirty-abcdef1` for commits after it.
fn git_version() -> Option<String> {
    let described = run_git(&["describe", "--tags", "--always", "--match", "v*"])?;
    let described = described.strip_prefix('v').unwrap_or(&described).to_string();
    let commit_hash = run_git(&["rev-parse", "--short", "HEAD"])?;

    if !described.contains('-') {
        // Either an exact tag or a bare hash (no tags yet)
        if described == commit_hash {
            return Some(format!("{}-{}", env!("CARGO_PKG_VERSION"), commit_hash));
        }
        return Some(format!("{}-{}", described, commit_hash));
    }

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() >= 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        Some(format!("{}-dirty-{}", parts[2], hash))
    } else {
        Some(described)
    }
}

fn run_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;

    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
