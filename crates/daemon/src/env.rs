// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Config file path when `--config` is not given.
pub fn config_path() -> Option<PathBuf> {
    non_empty("NT_CONFIG").map(PathBuf::from)
}

/// Hub URL override.
pub fn hub_url() -> Option<String> {
    non_empty("NT_HUB_URL")
}

/// Log directory override.
pub fn log_dir() -> Option<PathBuf> {
    non_empty("NT_LOG_DIR").map(PathBuf::from)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
