// SPDX-License-Identifier: MIT

//! Save/restore: `(capture() → snapshot, restore(snapshot))` over a
//! structured tree opaque to callers (`§6 Save snapshot`). Encoding,
//! compression, and integrity framing are left to an external codec —
//! this module only produces/consumes the in-memory tree.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vt_core::{Event, EventId, NetId, NodeId, Pid, Process, ScenarioId};
use vt_storage::{BlobRecordSnapshot, OverlayFs};

use crate::world::WorldRuntime;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldMetaSnapshot {
    pub schema_version: u32,
    pub active_scenario_id: Option<ScenarioId>,
    pub world_seed: u64,
    pub saved_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldStateSnapshot {
    pub world_tick: u64,
    pub event_seq: u64,
    pub next_pid: Pid,
    pub known_nodes_by_net: HashMap<NetId, HashSet<NodeId>>,
    pub scenario_flags: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStateSnapshot {
    pub fired_handler_ids: HashSet<(ScenarioId, EventId)>,
    pub event_queue: VecDeque<Event>,
    pub deferred_front: Option<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSnapshot {
    pub node: vt_core::ServerNode,
    pub overlay: OverlayFs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub meta: WorldMetaSnapshot,
    pub world: WorldStateSnapshot,
    pub events: EventStateSnapshot,
    pub processes: HashMap<Pid, Process>,
    pub servers: HashMap<NodeId, ServerSnapshot>,
    pub blobs: Vec<BlobRecordSnapshot>,
}

impl WorldRuntime {
    /// Capture a full, round-trippable snapshot (`§6`). `active_scenario_id`
    /// is supplied by the caller since `WorldRuntime` itself does not track
    /// which scenario produced it (`§9` design note: the core stays
    /// agnostic of campaign/scenario bookkeeping once built).
    pub fn capture(&self, active_scenario_id: Option<ScenarioId>, saved_at_ms: u64) -> WorldSnapshot {
        let servers = self
            .servers
            .iter()
            .map(|(node_id, node)| {
                let overlay = self.overlays.get(node_id).cloned().unwrap_or_default();
                (node_id.clone(), ServerSnapshot { node: node.clone(), overlay })
            })
            .collect::<HashMap<_, _>>();

        let content_ids = servers.values().flat_map(|s| s.overlay.referenced_content_ids());
        let blobs = self.blob_store.lock().capture(content_ids);

        WorldSnapshot {
            meta: WorldMetaSnapshot {
                schema_version: SNAPSHOT_SCHEMA_VERSION,
                active_scenario_id,
                world_seed: self.world_seed,
                saved_at_ms,
            },
            world: WorldStateSnapshot {
                world_tick: self.world_tick,
                event_seq: self.event_seq,
                next_pid: self.next_pid,
                known_nodes_by_net: self.known_nodes_by_net.clone(),
                scenario_flags: self.scenario_flags.clone(),
            },
            events: EventStateSnapshot {
                fired_handler_ids: self.fired_handler_ids.clone(),
                event_queue: self.event_queue.clone(),
                deferred_front: self.deferred_front.clone(),
            },
            processes: self.process_list.clone(),
            servers,
            blobs,
        }
    }

    /// Restore world-owned state from a snapshot. `self` must already be
    /// wired to the same `base_image`/`blob_store`/`id_gen`/`handlers`
    /// produced by applying the snapshot's originating blueprint; this
    /// method only replaces the mutable runtime state (`§6`).
    pub fn restore(&mut self, snapshot: WorldSnapshot) {
        self.blob_store.lock().restore(snapshot.blobs);

        self.servers = snapshot.servers.iter().map(|(id, s)| (id.clone(), s.node.clone())).collect();
        self.overlays = snapshot.servers.into_iter().map(|(id, s)| (id, s.overlay)).collect();
        self.process_list = snapshot.processes;
        self.world_tick = snapshot.world.world_tick;
        self.event_seq = snapshot.world.event_seq;
        self.next_pid = snapshot.world.next_pid;
        self.known_nodes_by_net = snapshot.world.known_nodes_by_net;
        self.scenario_flags = snapshot.world.scenario_flags;
        self.fired_handler_ids = snapshot.events.fired_handler_ids;
        self.event_queue = snapshot.events.event_queue;
        self.deferred_front = snapshot.events.deferred_front;

        // Not itself part of the snapshot tree (`§6` lists no `ipIndex`
        // entry); rebuilt since it is a pure function of `interfaces`.
        self.ip_index = self
            .servers
            .values()
            .filter_map(|s| s.primary_ip().map(|ip| (ip.to_string(), s.node_id.clone())))
            .collect();
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
