// SPDX-License-Identifier: MIT

use super::*;
use std::collections::{HashMap, HashSet};

fn empty_node() -> ServerNode {
    ServerNode {
        node_id: NodeId::new("srv"),
        name: "srv".into(),
        role: "generic".into(),
        status: NodeStatus::Online,
        reason: NodeReason::Ok,
        interfaces: vec![],
        subnet_membership: HashSet::new(),
        exposed_by_net: HashMap::new(),
        users: HashMap::new(),
        sessions: HashMap::new(),
        lan_neighbors: HashMap::new(),
        ports: HashMap::new(),
        process_ids: HashSet::new(),
        daemons: HashMap::new(),
        logs: LogRing::new(4),
    }
}

#[test]
fn primary_ip_picks_first_internet_interface() {
    let mut node = empty_node();
    node.interfaces.push(Interface { net_id: NetId::new("lan1"), ip: "10.0.0.5".into() });
    node.interfaces.push(Interface { net_id: NetId::new("internet"), ip: "1.2.3.4".into() });
    node.interfaces.push(Interface { net_id: NetId::new("internet"), ip: "1.2.3.5".into() });
    assert_eq!(node.primary_ip(), Some("1.2.3.4"));
}

#[test]
fn primary_ip_none_without_internet_interface() {
    let node = empty_node();
    assert_eq!(node.primary_ip(), None);
}

#[test]
fn log_ring_evicts_oldest_beyond_capacity() {
    let mut ring = LogRing::new(2);
    ring.push(1, "a");
    ring.push(2, "b");
    ring.push(3, "c");
    let texts: Vec<&str> = ring.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["b", "c"]);
}

#[test]
fn log_entry_edit_snapshots_original_once() {
    let mut entry = LogEntry::new(1, 100, "first");
    entry.edit("second");
    assert!(entry.dirty);
    assert_eq!(entry.original.as_ref().unwrap().text, "first");
    entry.edit("third");
    // original stays pinned to the first edit, not re-snapshotted.
    assert_eq!(entry.original.as_ref().unwrap().text, "first");
    assert_eq!(entry.text, "third");
}

#[test]
fn is_exposed_on_defaults_false_for_unknown_net() {
    let node = empty_node();
    assert!(!node.is_exposed_on(&NetId::new("internet")));
}
