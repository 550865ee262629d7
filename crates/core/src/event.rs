// SPDX-License-Identifier: MIT

//! Scenario event model (`§3 Event`, `§4.13 Event bus + dispatcher`).

use crate::id::{EventId, NetId, NodeId, ScenarioId, UserKey};
use crate::process::Pid;
use serde::{Deserialize, Serialize};

/// Sentinel value used for an unbound handler-index key (`§4.6` step 4:
/// "an absent field is represented by the sentinel 'any'").
pub const ANY_KEY: &str = "__ANY__";

/// The payload carried by an event. Only `PrivilegeAcquire` and
/// `FileAcquire` are scenario triggers (`§4.13` step 2); `ProcessFinished`
/// only drives the pre-dispatch hook (terminal line pump, etc).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventPayload {
    ProcessFinished { pid: Pid },
    PrivilegeAcquire {
        node_id: NodeId,
        user_key: UserKey,
        privilege: String,
        via: String,
        unlocked_net_ids: Vec<NetId>,
        acquired_at_ms: u64,
    },
    FileAcquire {
        from_node_id: NodeId,
        user_key: UserKey,
        file_name: String,
        remote_path: String,
        local_path: String,
        size_bytes: u64,
        content_id: String,
        transfer_method: String,
        acquired_at_ms: u64,
    },
}

impl EventPayload {
    /// Whether this payload type participates in scenario handler
    /// dispatch (`§4.13` step 2).
    pub fn is_scenario_trigger(&self) -> bool {
        matches!(self, EventPayload::PrivilegeAcquire { .. } | EventPayload::FileAcquire { .. })
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            EventPayload::ProcessFinished { .. } => None,
            EventPayload::PrivilegeAcquire { node_id, .. } => Some(node_id),
            EventPayload::FileAcquire { from_node_id, .. } => Some(from_node_id),
        }
    }

    pub fn user_key(&self) -> Option<&UserKey> {
        match self {
            EventPayload::ProcessFinished { .. } => None,
            EventPayload::PrivilegeAcquire { user_key, .. } => Some(user_key),
            EventPayload::FileAcquire { user_key, .. } => Some(user_key),
        }
    }

    pub fn privilege(&self) -> Option<&str> {
        match self {
            EventPayload::PrivilegeAcquire { privilege, .. } => Some(privilege),
            _ => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            EventPayload::FileAcquire { file_name, .. } => Some(file_name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time_ms: u64,
    pub seq: u64,
    pub payload: EventPayload,
}

/// Which slot of the expanded key cross-product a handler binds on
/// (`§4.6` step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    PrivilegeAcquire,
    FileAcquire,
}

/// An action a fired handler executes (`§4.13`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Print { text: String },
    SetFlag { key: String, value: serde_json::Value },
}

/// A scenario-declared responder (`§3 Handler descriptor`).
///
/// `guard` holds the raw guard source text; compiling it into an
/// executable form is the engine's concern (`vt-engine` depends on a
/// scripting crate this data model crate does not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    pub scenario_id: ScenarioId,
    pub event_id: EventId,
    pub condition_type: ConditionType,
    /// `"__ANY__"` when the blueprint left this field unbound.
    pub node_id_key: String,
    pub user_key: String,
    pub privilege_key: String,
    pub file_name_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    pub actions: Vec<Action>,
}

impl HandlerDescriptor {
    /// Stable identity used for once-only firing bookkeeping
    /// (`firedHandlerIds`, `§8` invariant 7).
    pub fn fired_key(&self) -> (ScenarioId, EventId) {
        (self.scenario_id.clone(), self.event_id.clone())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
