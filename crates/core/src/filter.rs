// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node filter: resolve a job's selector to ready edge nodes.

use crate::node;
use crate::selector::{self, Selector};
use crate::task::{JobError, TaskJob};
use k8s_openapi::api::core::v1::Node;
use std::collections::HashSet;
use std::sync::Arc;

/// Read-only view of the cluster's nodes.
pub trait NodeLister: Send + Sync {
    fn get(&self, name: &str) -> Option<Arc<Node>>;

    fn list(&self) -> Vec<Arc<Node>>;
}

/// Resolve the nodes a job should be dispatched to.
///
/// Explicit names keep their order; selector matches are sorted by name.
/// Missing or ineligible nodes are skipped. Only a missing, ambiguous or
/// invalid selector fails the job.
pub fn resolve_nodes<J: TaskJob>(job: &J, nodes: &dyn NodeLister) -> Result<Vec<String>, JobError> {
    let sel = job.selector();
    let by_name = !sel.node_names.is_empty();
    let by_label = sel.label_selector.filter(|s| !selector::is_empty(s));

    let candidates: Vec<Arc<Node>> = match (by_name, by_label) {
        (true, Some(_)) => return Err(JobError::AmbiguousSelector),
        (false, None) => return Err(JobError::NoSelector),
        (true, None) => sel
            .node_names
            .iter()
            .filter_map(|name| {
                let found = nodes.get(name);
                if found.is_none() {
                    tracing::warn!(job = %job.job_name(), node = %name, "node not found, skipping");
                }
                found
            })
            .collect(),
        (false, Some(label_selector)) => {
            let compiled = Selector::compile(label_selector)?;
            let mut matched: Vec<Arc<Node>> =
                nodes.list().into_iter().filter(|n| compiled.matches(node::labels(n))).collect();
            matched.sort_by(|a, b| node::name(a).cmp(node::name(b)));
            matched
        }
    };

    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    for candidate in candidates {
        let name = node::name(&candidate);
        if name.is_empty() || !seen.insert(name.to_string()) {
            continue;
        }
        if !node::is_edge_node(&candidate) {
            tracing::warn!(job = %job.job_name(), node = name, "not an edge node, skipping");
            continue;
        }
        if !node::is_ready(&candidate) {
            tracing::warn!(job = %job.job_name(), node = name, "node not ready, skipping");
            continue;
        }
        if !job.accepts_node(&candidate) {
            continue;
        }
        resolved.push(name.to_string());
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
