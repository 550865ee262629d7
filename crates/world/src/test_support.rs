// SPDX-License-Identifier: MIT

//! Shared test fixtures, kept out of `#[cfg(test)]` module files so
//! every sibling `_tests.rs` can import a consistent minimal world.

#![cfg(test)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use vt_core::{
    AuthMode, Exposure, FileKind, LogRing, NodeId, NodeReason, NodeStatus, Port, Privilege,
    PortType, ServerNode, User,
};
use vt_storage::{BaseImage, BlobStore};

use crate::config::WorldConfig;
use crate::world::WorldRuntime;

fn server(node_id: &str) -> ServerNode {
    ServerNode {
        node_id: NodeId::new(node_id),
        name: node_id.to_string(),
        role: "generic".to_string(),
        status: NodeStatus::Online,
        reason: NodeReason::Ok,
        interfaces: Vec::new(),
        subnet_membership: HashSet::new(),
        exposed_by_net: HashMap::new(),
        users: HashMap::from([(
            "player".to_string(),
            User {
                user_id: "player".to_string(),
                passwd: Some("pw".to_string()),
                auth_mode: AuthMode::Static,
                privilege: Privilege::FULL,
            },
        )]),
        sessions: HashMap::new(),
        lan_neighbors: HashMap::new(),
        ports: HashMap::from([(22, Port { port_type: PortType::Ssh, service_id: None, exposure: Exposure::Private })]),
        process_ids: HashSet::new(),
        daemons: HashMap::new(),
        logs: LogRing::new(16),
    }
}

/// A two-node world (`srv`, `workstation`) with empty overlays over a
/// base image that has `/home/player` and `/etc/motd` materialized.
pub(crate) fn minimal_world() -> WorldRuntime {
    let mut base = BaseImage::new();
    let mut store = BlobStore::new();
    base.add_dir("/home/player");
    base.add_dir("/opt/data");
    base.add_file(&mut store, "/etc/motd", b"welcome", FileKind::Text, true);
    base.add_file(&mut store, "/opt/data/report.txt", b"findings", FileKind::Text, true);

    let mut servers = HashMap::new();
    let mut overlays = HashMap::new();
    for id in ["srv", "workstation"] {
        servers.insert(NodeId::new(id), server(id));
        overlays.insert(NodeId::new(id), vt_storage::OverlayFs::new());
    }

    let config = WorldConfig {
        world_seed: 1,
        base_image: Arc::new(base),
        blob_store: Arc::new(Mutex::new(store)),
        id_gen: Arc::new(vt_core::SequentialIdGen::new("test")),
    };

    WorldRuntime {
        servers,
        overlays,
        ip_index: HashMap::new(),
        process_list: HashMap::new(),
        scenario_flags: indexmap::IndexMap::new(),
        known_nodes_by_net: HashMap::new(),
        terminal_stacks: HashMap::new(),
        next_pid: 1,
        world_tick: 0,
        event_seq: 0,
        fired_handler_ids: HashSet::new(),
        event_queue: std::collections::VecDeque::new(),
        deferred_front: None,
        handlers: Vec::new(),
        scripts: HashMap::new(),
        pending_effects: HashMap::new(),
        terminal_lines: HashMap::new(),
        base_image: config.base_image,
        blob_store: config.blob_store,
        world_seed: config.world_seed,
        id_gen: config.id_gen,
    }
}
