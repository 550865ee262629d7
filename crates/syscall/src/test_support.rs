// SPDX-License-Identifier: MIT

//! Shared test fixtures for syscall handler tests.

#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use vt_blueprint::{BuiltServer, BuiltWorld};
use vt_core::{
    AuthMode, Exposure, FileKind, LogRing, NodeId, NodeReason, NodeStatus, Port, Privilege,
    PortType, ServerNode, User,
};
use vt_storage::{BaseImage, BlobStore, OverlayFs};
use vt_world::{WorldConfig, WorldRuntime};

fn server(node_id: &str) -> ServerNode {
    ServerNode {
        node_id: NodeId::new(node_id),
        name: node_id.to_string(),
        role: "generic".to_string(),
        status: NodeStatus::Online,
        reason: NodeReason::Ok,
        interfaces: Vec::new(),
        subnet_membership: Default::default(),
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
        process_ids: Default::default(),
        daemons: HashMap::new(),
        logs: LogRing::new(16),
    }
}

/// A two-node world (`srv`, `workstation`) with `/home/player`, `/etc/motd`,
/// and an executable under `/opt/bin` materialized in the base image.
pub(crate) fn minimal_world() -> WorldRuntime {
    let mut base = BaseImage::new();
    let mut store = BlobStore::new();
    base.add_dir("/home/player");
    base.add_dir("/opt/bin");
    base.add_file(&mut store, "/etc/motd", b"welcome", FileKind::Text, true);
    base.add_file(&mut store, "/home/player/report.txt", b"findings", FileKind::Text, true);
    base.add_file(&mut store, "/opt/bin/inspect.rhai", b"// @name inspect\n", FileKind::ExecutableScript, true);

    let mut servers = HashMap::new();
    for id in ["srv", "workstation"] {
        servers.insert(NodeId::new(id), BuiltServer { node: server(id), overlay: OverlayFs::new() });
    }
    let built = BuiltWorld { servers, ip_index: HashMap::new(), handlers: Vec::new(), scripts: HashMap::new() };

    let config = WorldConfig {
        world_seed: 1,
        base_image: Arc::new(base),
        blob_store: Arc::new(Mutex::new(store)),
        id_gen: Arc::new(vt_core::SequentialIdGen::new("test")),
    };

    WorldRuntime::from_built_world(built, config)
}
