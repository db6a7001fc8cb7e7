// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders and strategies shared by tests across the workspace.

use crate::crd::{ImagePrePullJob, ImagePrePullJobSpec, JobStatus, NodeUpgradeJob, NodeUpgradeJobSpec};
use crate::filter::NodeLister;
use crate::node::{self, EDGE_ROLE_LABEL};
use k8s_openapi::api::core::v1::{Node, NodeCondition, NodeStatus, NodeSystemInfo};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::Resource;
use parking_lot::RwLock;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Node builder; defaults to a ready edge node.
pub struct NodeBuilder {
    name: String,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    ready: bool,
    kubelet_version: Option<String>,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::from([(EDGE_ROLE_LABEL.to_string(), String::new())]),
            annotations: BTreeMap::new(),
            ready: true,
            kubelet_version: None,
        }
    }

    /// Drop the edge-role label.
    pub fn cloud(mut self) -> Self {
        self.labels.remove(EDGE_ROLE_LABEL);
        self
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn kubelet_version(mut self, version: impl Into<String>) -> Self {
        self.kubelet_version = Some(version.into());
        self
    }

    pub fn build(self) -> Node {
        let condition = NodeCondition {
            type_: "Ready".into(),
            status: if self.ready { "True" } else { "False" }.into(),
            ..Default::default()
        };
        let node_info = self.kubelet_version.map(|v| NodeSystemInfo {
            kubelet_version: v,
            ..Default::default()
        });
        Node {
            metadata: ObjectMeta {
                name: Some(self.name),
                labels: Some(self.labels),
                annotations: (!self.annotations.is_empty()).then_some(self.annotations),
                ..Default::default()
            },
            spec: None,
            status: Some(NodeStatus {
                conditions: Some(vec![condition]),
                node_info,
                ..Default::default()
            }),
        }
    }
}

/// Upgrade job targeting explicit nodes, at `initial`.
pub fn upgrade_job(name: &str, nodes: &[&str], version: &str) -> NodeUpgradeJob {
    let mut job = NodeUpgradeJob::new(
        name,
        NodeUpgradeJobSpec {
            node_names: nodes.iter().map(|n| n.to_string()).collect(),
            version: version.to_string(),
            ..Default::default()
        },
    );
    job.meta_mut().resource_version = Some("1".into());
    job.meta_mut().uid = Some(uuid::Uuid::new_v4().to_string());
    job
}

/// Prepull job targeting explicit nodes, at `initial`.
pub fn prepull_job(name: &str, nodes: &[&str], images: &[&str]) -> ImagePrePullJob {
    let mut job = ImagePrePullJob::new(
        name,
        ImagePrePullJobSpec {
            node_names: nodes.iter().map(|n| n.to_string()).collect(),
            images: images.iter().map(|i| i.to_string()).collect(),
            ..Default::default()
        },
    );
    job.meta_mut().resource_version = Some("1".into());
    job.meta_mut().uid = Some(uuid::Uuid::new_v4().to_string());
    job
}

/// Selector matching `key=value` labels.
pub fn label_selector(key: &str, value: &str) -> LabelSelector {
    LabelSelector {
        match_labels: Some(BTreeMap::from([(key.to_string(), value.to_string())])),
        match_expressions: None,
    }
}

/// Convenience for tests that need a job with a preset status.
pub fn with_status<J: crate::TaskJob>(mut job: J, status: JobStatus) -> J {
    *job.status_mut() = status;
    job
}

/// DNS-1123 label, as used for job and node names.
pub fn dns_label() -> impl Strategy<Value = String> {
    "[a-z0-9]([-a-z0-9]{0,30}[a-z0-9])?"
}

/// In-memory node list that tests can mutate while a pipeline runs.
#[derive(Clone, Default)]
pub struct FakeNodes {
    nodes: Arc<RwLock<Vec<Arc<Node>>>>,
}

impl FakeNodes {
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        let fake = Self::default();
        for n in nodes {
            fake.upsert(n);
        }
        fake
    }

    /// Ready edge nodes with the given names.
    pub fn edge(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| NodeBuilder::new(*n).build()))
    }

    pub fn upsert(&self, n: Node) {
        let mut nodes = self.nodes.write();
        nodes.retain(|existing| node::name(existing) != node::name(&n));
        nodes.push(Arc::new(n));
    }
}

impl NodeLister for FakeNodes {
    fn get(&self, name: &str) -> Option<Arc<Node>> {
        self.nodes.read().iter().find(|n| node::name(n) == name).cloned()
    }

    fn list(&self) -> Vec<Arc<Node>> {
        self.nodes.read().clone()
    }
}
