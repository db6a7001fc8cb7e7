// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upgrade helpers: version filtering, image normalization, node history.

const KUBEEDGE_MARKER: &str = "-kubeedge-";
const DEFAULT_DOMAIN: &str = "docker.io";
const OFFICIAL_PREFIX: &str = "library";
const HISTORY_SEPARATOR: char = ';';
const HISTORY_LIMIT: usize = 3;

/// Default installation package repository.
pub const DEFAULT_IMAGE: &str = "kubeedge/installation-package";

/// Default edge upgrade tool.
pub const DEFAULT_UPGRADE_TOOL: &str = "keadm";

/// Whether a node should be skipped for an upgrade to `expected`.
///
/// Kubelet versions look like `v1.22.6-kubeedge-v1.10.0-beta.0+abc`. Nodes
/// already running `expected` are skipped, as are nodes whose version string
/// has no kubeedge component.
pub fn filter_version(kubelet_version: &str, expected: &str) -> bool {
    let Some(idx) = kubelet_version.find(KUBEEDGE_MARKER) else {
        return true;
    };
    let edge = &kubelet_version[idx + KUBEEDGE_MARKER.len()..];
    match edge.strip_prefix(expected) {
        Some(rest) => rest.is_empty() || rest.starts_with(['-', '+']),
        None => false,
    }
}

/// Normalize an image reference to its repository, dropping tag and digest.
///
/// `name` becomes `docker.io/library/name`, `org/name` becomes
/// `docker.io/org/name`, and explicit registries are kept.
pub fn image_repo(image: &str) -> Option<String> {
    let image = image.trim();
    let without_digest = image.split_once('@').map_or(image, |(name, _)| name);
    let (domain, remainder) = split_domain(without_digest);
    let path = match remainder.rfind(':') {
        Some(idx) => &remainder[..idx],
        None => remainder.as_str(),
    };
    if path.is_empty() || !path.split('/').all(valid_path_component) {
        return None;
    }
    Some(format!("{domain}/{path}"))
}

fn split_domain(name: &str) -> (String, String) {
    match name.split_once('/') {
        Some((first, rest))
            if first.contains('.') || first.contains(':') || first == "localhost" =>
        {
            (first.to_string(), rest.to_string())
        }
        Some(_) => (DEFAULT_DOMAIN.to_string(), name.to_string()),
        None => (DEFAULT_DOMAIN.to_string(), format!("{OFFICIAL_PREFIX}/{name}")),
    }
}

fn valid_path_component(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}

/// Append `from->to` to a `;`-joined history, keeping the latest entries.
pub fn merge_upgrade_history(existing: Option<&str>, from: &str, to: &str) -> String {
    let mut records: Vec<&str> = existing
        .unwrap_or_default()
        .split(HISTORY_SEPARATOR)
        .filter(|r| !r.is_empty())
        .collect();
    let latest = format!("{from}->{to}");
    records.push(&latest);
    let skip = records.len().saturating_sub(HISTORY_LIMIT);
    records[skip..].join(&HISTORY_SEPARATOR.to_string())
}

#[cfg(test)]
#[path = "upgrade_tests.rs"]
mod tests;
