// SPDX-License-Identifier: MIT

//! Server node data model (`§3 Server node`).
//!
//! `ServerNode` holds everything addressable purely by value: users,
//! ports, daemons, interfaces, sessions, and logs. It deliberately does
//! not embed the overlay filesystem (that lives in `vt-storage`, which
//! this crate does not depend on) or the process table (processes are
//! referenced by id, see the "cyclic structures" design note in
//! `spec.md` §9: parent/child relations are stored by key, not pointer).

use crate::id::{NetId, NodeId, UserKey};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Server reachability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Online,
    Offline,
    Booting,
}

/// Reason code accompanying a non-`Ok` status transition. The invariant
/// `status = Offline ⇒ reason ≠ Ok` (`§3`) is enforced by
/// `ServerRuntime::set_status` in `vt-world`, not here: this type only
/// carries the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeReason {
    Ok,
    PoweredOff,
    Unreachable,
    Compromised,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub net_id: NetId,
    pub ip: String,
}

/// Port exposure class (`§4.9` exposure rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    Ssh,
    Ftp,
    Http,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub port_type: PortType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub exposure: Exposure,
}

/// Authentication mode for a user account (`§4.9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Unconditional success.
    None,
    /// Exact password match.
    Static,
    /// Time-based OTP over `passwd` as a base32 secret.
    Otp,
    /// Reserved for future auth schemes; always denies for now.
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privilege {
    pub r: bool,
    pub w: bool,
    pub x: bool,
}

impl Privilege {
    pub const NONE: Privilege = Privilege { r: false, w: false, x: false };
    pub const FULL: Privilege = Privilege { r: true, w: true, x: true };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passwd: Option<String>,
    pub auth_mode: AuthMode,
    pub privilege: Privilege,
}

/// An authenticated endpoint opened by `connect` (`§GLOSSARY Session`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_key: UserKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ip: Option<String>,
    pub cwd: String,
}

/// A single immutable-at-creation log line. "Dirty" mutation (used by
/// trace/alert gameplay, `§4.4`) captures the pre-edit snapshot the first
/// time the entry is modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub created_at_ms: u64,
    pub text: String,
    #[serde(default)]
    pub dirty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Box<LogEntry>>,
}

impl LogEntry {
    pub fn new(id: u64, created_at_ms: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            created_at_ms,
            text: text.into(),
            dirty: false,
            original: None,
        }
    }

    /// Edit this entry's text, snapshotting the original on first edit.
    pub fn edit(&mut self, new_text: impl Into<String>) {
        if !self.dirty {
            self.original = Some(Box::new(self.clone()));
            self.dirty = true;
        }
        self.text = new_text.into();
    }
}

/// Fixed-capacity ring buffer of log entries with oldest-wins eviction
/// (`§4.4`, capacity ≥ 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRing {
    capacity: usize,
    entries: VecDeque<LogEntry>,
    next_id: u64,
}

impl LogRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, created_at_ms: u64, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry::new(id, created_at_ms, text));
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut LogEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-node state: users, ports, daemons, interfaces, sessions, logs.
/// Processes are referenced by id in `process_ids`; the process records
/// themselves live in the world's `processList` (`§3 World runtime`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerNode {
    pub node_id: NodeId,
    pub name: String,
    pub role: String,
    pub status: NodeStatus,
    pub reason: NodeReason,
    pub interfaces: Vec<Interface>,
    pub subnet_membership: HashSet<NetId>,
    pub exposed_by_net: HashMap<NetId, bool>,
    pub users: HashMap<UserKey, User>,
    pub sessions: HashMap<String, SessionRecord>,
    pub lan_neighbors: HashMap<NetId, Vec<NodeId>>,
    pub ports: HashMap<u16, Port>,
    pub process_ids: HashSet<u64>,
    pub daemons: HashMap<String, Vec<String>>,
    pub logs: LogRing,
}

impl ServerNode {
    /// The first interface on the "internet" net, if any (`§3` invariant:
    /// `primaryIp = first interface whose netId="internet"`).
    pub fn primary_ip(&self) -> Option<&str> {
        self.interfaces
            .iter()
            .find(|i| i.net_id.as_str() == "internet")
            .map(|i| i.ip.as_str())
    }

    pub fn is_exposed_on(&self, net_id: &NetId) -> bool {
        self.exposed_by_net.get(net_id).copied().unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
