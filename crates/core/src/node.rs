// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node inspection helpers.

use k8s_openapi::api::core::v1::Node;
use std::collections::BTreeMap;

/// Label marking a node as an edge node; its value must be empty.
pub const EDGE_ROLE_LABEL: &str = "node-role.kubernetes.io/edge";

/// Label set on a node while an upgrade is in flight.
pub const UPGRADE_STATUS_LABEL: &str = "nodeupgradejob.operations.kubeedge.io/status";

/// Value of [`UPGRADE_STATUS_LABEL`] during an upgrade.
pub const UPGRADE_STATUS_UPGRADING: &str = "upgrading";

/// Annotation carrying the last few `from->to` upgrade records.
pub const UPGRADE_HISTORY_ANNOTATION: &str = "nodeupgradejob.operations.kubeedge.io/history";

static NO_LABELS: BTreeMap<String, String> = BTreeMap::new();

pub fn labels(node: &Node) -> &BTreeMap<String, String> {
    node.metadata.labels.as_ref().unwrap_or(&NO_LABELS)
}

pub fn name(node: &Node) -> &str {
    node.metadata.name.as_deref().unwrap_or_default()
}

pub fn is_edge_node(node: &Node) -> bool {
    labels(node).get(EDGE_ROLE_LABEL).is_some_and(|v| v.is_empty())
}

pub fn is_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conds| conds.iter().find(|c| c.type_ == "Ready"))
        .is_some_and(|c| c.status == "True")
}

pub fn kubelet_version(node: &Node) -> Option<&str> {
    node.status.as_ref()?.node_info.as_ref().map(|i| i.kubelet_version.as_str())
}

pub fn annotation<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.metadata.annotations.as_ref()?.get(key).map(String::as_str)
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
