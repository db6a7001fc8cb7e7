// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::dns_label;
use proptest::prelude::*;
use yare::parameterized;

#[test]
fn encodes_downstream_shape() {
    let key = ResourceKey::new(JobKind::NodeUpgrade, "job-1", "edge-a");
    assert_eq!(key.to_string(), "upgrade/job-1/node/edge-a");
}

#[test]
fn parses_job_and_node_positions() {
    let key = ResourceKey::parse("prepull/pull-7/node/edge-b").unwrap();
    assert_eq!(key.kind, JobKind::ImagePrePull);
    assert_eq!(key.job_name, "pull-7");
    assert_eq!(key.node_name, "edge-b");
}

#[test]
fn tolerates_trailing_segments() {
    let key: ResourceKey = "upgrade/job-1/node/edge-a/extra".parse().unwrap();
    assert_eq!(key.node_name, "edge-a");
}

#[parameterized(
    empty = { "", 1 },
    two = { "upgrade/J", 2 },
    three = { "upgrade/J/node", 3 },
)]
fn rejects_short_keys(raw: &str, found: usize) {
    assert_eq!(
        ResourceKey::parse(raw),
        Err(KeyError::TooFewSegments { key: raw.to_string(), found })
    );
}

#[test]
fn rejects_unknown_kind() {
    assert_eq!(
        ResourceKey::parse("reboot/J/node/A"),
        Err(KeyError::UnknownKind("reboot".into()))
    );
}

#[parameterized(
    job = { "upgrade//node/A", "job name" },
    node = { "upgrade/J/node/", "node name" },
)]
fn rejects_empty_fields(raw: &str, field: &str) {
    match ResourceKey::parse(raw) {
        Err(KeyError::EmptyField { field: f, .. }) => assert_eq!(f, field),
        other => panic!("expected empty field error, got {other:?}"),
    }
}

fn job_kind() -> impl Strategy<Value = JobKind> {
    prop_oneof![Just(JobKind::NodeUpgrade), Just(JobKind::ImagePrePull)]
}

proptest! {
    #[test]
    fn parse_inverts_encode(kind in job_kind(), job in dns_label(), node in dns_label()) {
        let key = ResourceKey::new(kind, job, node);
        prop_assert_eq!(ResourceKey::parse(&key.to_string()), Ok(key));
    }
}
