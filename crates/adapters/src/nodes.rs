// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use k8s_openapi::api::core::v1::Node;
use kube::runtime::reflector::{ObjectRef, Store};
use nt_core::NodeLister;
use std::sync::Arc;

/// [`NodeLister`] over a node reflector store.
#[derive(Clone)]
pub struct ReflectorNodes {
    store: Store<Node>,
}

impl ReflectorNodes {
    pub fn new(store: Store<Node>) -> Self {
        Self { store }
    }
}

impl NodeLister for ReflectorNodes {
    fn get(&self, name: &str) -> Option<Arc<Node>> {
        self.store.get(&ObjectRef::new(name))
    }

    fn list(&self) -> Vec<Arc<Node>> {
        self.store.state()
    }
}

#[cfg(test)]
#[path = "nodes_tests.rs"]
mod tests;
