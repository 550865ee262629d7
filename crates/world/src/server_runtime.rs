// SPDX-License-Identifier: MIT

//! Server node mutation surface used by syscall handlers and the event
//! layer (`§4.4 Server runtime`).

use std::collections::HashMap;

use vt_core::{Interface, NodeReason, NodeStatus, SessionRecord, ServerNode};

use crate::error::WorldError;

/// Insert or replace a session record (`§4.4`).
pub fn upsert_session(node: &mut ServerNode, session_id: impl Into<String>, record: SessionRecord) {
    node.sessions.insert(session_id.into(), record);
}

pub fn remove_session(node: &mut ServerNode, session_id: &str) -> Option<SessionRecord> {
    node.sessions.remove(session_id)
}

pub fn add_process_id(node: &mut ServerNode, pid: u64) {
    node.process_ids.insert(pid);
}

pub fn remove_process_id(node: &mut ServerNode, pid: u64) {
    node.process_ids.remove(&pid);
}

/// Append a log line, evicting the oldest entry once the ring is full.
pub fn append_log(node: &mut ServerNode, created_at_ms: u64, text: impl Into<String>) -> u64 {
    node.logs.push(created_at_ms, text)
}

/// Edit an existing log line. First edit snapshots the pre-edit entry
/// (`§4.4` "dirty" mutation). Returns `false` if the id is unknown.
pub fn edit_log(node: &mut ServerNode, log_id: u64, new_text: impl Into<String>) -> bool {
    match node.logs.get_mut(log_id) {
        Some(entry) => {
            entry.edit(new_text);
            true
        }
        None => false,
    }
}

/// Status/reason setter enforcing `offline ⇒ reason≠Ok` (`§3`).
pub fn set_status(node: &mut ServerNode, status: NodeStatus, reason: NodeReason) -> Result<(), WorldError> {
    if status == NodeStatus::Offline && reason == NodeReason::Ok {
        return Err(WorldError::InvalidArgs(
            "offline status requires a non-Ok reason".to_string(),
        ));
    }
    node.status = status;
    node.reason = reason;
    Ok(())
}

/// Rebuild `subnetMembership`/`exposedByNet` for a new interface set,
/// preserving prior exposure flags for net ids that survive the reset
/// (`§4.4`). `primaryIp` is not stored; it is derived on read by
/// [`ServerNode::primary_ip`].
pub fn reset_interfaces(node: &mut ServerNode, new_interfaces: Vec<Interface>) {
    let prior_exposure = node.exposed_by_net.clone();
    node.subnet_membership = new_interfaces.iter().map(|i| i.net_id.clone()).collect();
    let mut exposed = HashMap::new();
    for iface in &new_interfaces {
        let was_exposed = prior_exposure.get(&iface.net_id).copied().unwrap_or(false);
        exposed.insert(iface.net_id.clone(), was_exposed);
    }
    node.exposed_by_net = exposed;
    node.interfaces = new_interfaces;
}

#[cfg(test)]
#[path = "server_runtime_tests.rs"]
mod tests;
