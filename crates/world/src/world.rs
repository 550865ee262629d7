// SPDX-License-Identifier: MIT

//! `WorldRuntime`: the single explicit value threaded through every API
//! (`§3 World runtime`, `§9` "global mutable state" design note).

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use vt_core::{
    Event, EventId, EventPayload, HandlerDescriptor, NetId, NodeId, Pid, Process, ScenarioId,
    SessionId, UserKey,
};
use vt_storage::{BaseImage, BlobStore, OverlayFs};

use crate::config::WorldConfig;

/// A server plus its overlay and connection stacks: everything produced
/// by `vt-blueprint` that `vt-world` owns going forward.
pub struct WorldRuntime {
    pub servers: HashMap<NodeId, vt_core::ServerNode>,
    pub overlays: HashMap<NodeId, OverlayFs>,
    pub ip_index: HashMap<String, NodeId>,
    pub process_list: HashMap<Pid, Process>,
    /// `IndexMap` rather than `HashMap` so flag iteration order is
    /// stable across a save/restore round trip (Open Question c).
    pub scenario_flags: IndexMap<String, serde_json::Value>,
    pub known_nodes_by_net: HashMap<NetId, HashSet<NodeId>>,
    pub terminal_stacks: HashMap<SessionId, Vec<vt_core::ConnectionFrame>>,
    pub next_pid: Pid,
    pub world_tick: u64,
    pub event_seq: u64,
    pub fired_handler_ids: HashSet<(ScenarioId, EventId)>,
    pub event_queue: VecDeque<Event>,
    pub deferred_front: Option<Event>,
    pub handlers: Vec<HandlerDescriptor>,
    pub scripts: HashMap<String, String>,
    pub(crate) pending_effects: HashMap<Pid, crate::process_effects::PendingEffect>,
    pub(crate) terminal_lines: HashMap<(NodeId, UserKey), VecDeque<String>>,
    pub(crate) base_image: Arc<BaseImage>,
    pub(crate) blob_store: Arc<Mutex<BlobStore>>,
    pub(crate) world_seed: u64,
    pub(crate) id_gen: Arc<dyn vt_core::IdGen>,
}

impl WorldRuntime {
    /// Assemble a `WorldRuntime` from a freshly applied blueprint
    /// (`vt_blueprint::BuiltWorld`).
    pub fn from_built_world(built: vt_blueprint::BuiltWorld, config: WorldConfig) -> Self {
        let mut servers = HashMap::new();
        let mut overlays = HashMap::new();
        for (node_id, built_server) in built.servers {
            servers.insert(node_id.clone(), built_server.node);
            overlays.insert(node_id, built_server.overlay);
        }

        Self {
            servers,
            overlays,
            ip_index: built.ip_index,
            process_list: HashMap::new(),
            scenario_flags: IndexMap::new(),
            known_nodes_by_net: HashMap::new(),
            terminal_stacks: HashMap::new(),
            next_pid: 1,
            world_tick: 0,
            event_seq: 0,
            fired_handler_ids: HashSet::new(),
            event_queue: VecDeque::new(),
            deferred_front: None,
            handlers: built.handlers,
            scripts: built.scripts,
            pending_effects: HashMap::new(),
            terminal_lines: HashMap::new(),
            base_image: config.base_image,
            blob_store: config.blob_store,
            world_seed: config.world_seed,
            id_gen: config.id_gen,
        }
    }

    pub fn base_image(&self) -> &BaseImage {
        &self.base_image
    }

    pub fn blob_store(&self) -> &Mutex<BlobStore> {
        &self.blob_store
    }

    /// Cloned handles for callers (syscall handlers) that need to hold a
    /// mutable borrow of `self.overlays` and the base image/blob store at
    /// the same time — a plain `&self` accessor would conflict with that
    /// borrow.
    pub fn base_image_arc(&self) -> Arc<BaseImage> {
        self.base_image.clone()
    }

    pub fn blob_store_arc(&self) -> Arc<Mutex<BlobStore>> {
        self.blob_store.clone()
    }

    /// Allocate the next pid, recording `process` into `process_list`
    /// and the host server's `process_ids` (`§3` invariant: `nextPid`
    /// strictly increases).
    pub fn spawn_process(&mut self, mut process: Process) -> Option<Pid> {
        let host = self.servers.get_mut(&process.host_node_id)?;
        let pid = self.next_pid;
        self.next_pid += 1;
        process.pid = pid;
        crate::server_runtime::add_process_id(host, pid);
        self.process_list.insert(pid, process);
        Some(pid)
    }

    /// Append an event to the tail of the queue, stamping it with the
    /// current tick and a strictly increasing sequence number (`§3`,
    /// `§5` ordering guarantees).
    pub fn emit_event(&mut self, payload: EventPayload) {
        let seq = self.event_seq;
        self.event_seq += 1;
        self.event_queue.push_back(Event {
            time_ms: self.world_tick,
            seq,
            payload,
        });
    }

    /// Queue a print line addressed to a specific terminal, read by
    /// `drainTerminalEventLines` (`§4.5`).
    pub fn enqueue_terminal_line(&mut self, node_id: NodeId, user_key: UserKey, line: impl Into<String>) {
        self.terminal_lines.entry((node_id, user_key)).or_default().push_back(line.into());
    }

    /// `drainTerminalEventLines(nodeId, userKey)` (`§4.5`).
    pub fn drain_terminal_event_lines(&mut self, node_id: &NodeId, user_key: &UserKey) -> Vec<String> {
        self.terminal_lines
            .get_mut(&(node_id.clone(), user_key.clone()))
            .map(|q| q.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn next_session_id(&self) -> SessionId {
        SessionId::new(self.id_gen.next())
    }
}

#[cfg(test)]
#[path = "world_tests.rs"]
mod tests;
