// SPDX-License-Identifier: MIT

//! Blueprint build errors (`§4.6`: "validation aggregates every error
//! found rather than stopping at the first; the build is all-or-nothing").

use thiserror::Error;
use vt_core::{NetId, NodeId, SpecId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlueprintError {
    #[error("scenario {0} not found in catalog or campaign tree")]
    ScenarioNotFound(String),
    #[error("server spawn {node_id} references unknown spec {spec_id}")]
    MissingSpec { node_id: NodeId, spec_id: SpecId },
    #[error("duplicate node id {0} in scenario")]
    DuplicateNodeId(NodeId),
    #[error("duplicate ip address {ip} assigned to {first} and {second}")]
    DuplicateIp { ip: String, first: NodeId, second: NodeId },
    #[error("interface on {node_id} references unknown net {net_id}")]
    UnknownNet { node_id: NodeId, net_id: NetId },
    #[error("malformed address plan {0:?} for subnet {1}")]
    MalformedAddressPlan(String, NetId),
    #[error("host suffix {host_suffix} on {node_id}/{net_id} is outside the subnet's address plan")]
    HostSuffixOutOfRange { node_id: NodeId, net_id: NetId, host_suffix: u32 },
    #[error("overlay entry {path} in spec {spec_id} could not be applied: {reason}")]
    InvalidOverlayEntry { spec_id: SpecId, path: String, reason: String },
    #[error("event {0} has no condition_type")]
    MissingConditionType(String),
}
