// SPDX-License-Identifier: MIT

//! Address resolution, `known`, and `scan` (`§4.8`).

use vt_core::{NetId, NodeId};

use crate::config::WORKSTATION_NODE_ID;
use crate::error::WorldError;
use crate::world::WorldRuntime;

/// One row of `known`: a hostname/ip pair on the `internet` net.
pub struct KnownHost {
    pub hostname: String,
    pub ip: String,
}

/// One row of `scan`: a neighbor reachable over a LAN interface.
pub struct ScanNeighbor {
    pub net_id: NetId,
    pub ip: String,
}

impl WorldRuntime {
    /// Resolve `hostOrIp` via `ipIndex` first, falling back to an exact
    /// server-name match (`§4.8`).
    pub fn resolve_address(&self, host_or_ip: &str) -> Option<NodeId> {
        if let Some(node_id) = self.ip_index.get(host_or_ip) {
            return Some(node_id.clone());
        }
        self.servers
            .values()
            .find(|s| s.name == host_or_ip || s.node_id.as_str() == host_or_ip)
            .map(|s| s.node_id.clone())
    }

    /// Tabulate `knownNodesByNet["internet"]` as `(hostname, ip)` sorted
    /// by IP (`§4.8`).
    pub fn known(&self) -> Vec<KnownHost> {
        let internet = NetId::new("internet");
        let mut rows: Vec<KnownHost> = self
            .known_nodes_by_net
            .get(&internet)
            .into_iter()
            .flatten()
            .filter_map(|node_id| {
                let server = self.servers.get(node_id)?;
                let ip = server.primary_ip()?.to_string();
                Some(KnownHost { hostname: server.name.clone(), ip })
            })
            .collect();
        rows.sort_by(|a, b| a.ip.cmp(&b.ip));
        rows
    }

    /// `scan [netId]`: requires `x` on the viewing user; the player
    /// workstation always reports no neighbors; otherwise lists
    /// non-internet interface neighbors from `lanNeighbors`, optionally
    /// filtered to one net (`§4.8`, open question (b): exposure is not
    /// consulted here).
    pub fn scan(&self, viewer_node_id: &NodeId, net_id_filter: Option<&NetId>) -> Result<Vec<ScanNeighbor>, WorldError> {
        if viewer_node_id.as_str() == WORKSTATION_NODE_ID {
            return Ok(Vec::new());
        }
        let server = self
            .servers
            .get(viewer_node_id)
            .ok_or_else(|| WorldError::ServerNotFound(viewer_node_id.clone()))?;

        if let Some(filter) = net_id_filter {
            if !server.lan_neighbors.contains_key(filter) {
                return Err(WorldError::NetNotFound(filter.clone()));
            }
        }

        let mut rows = Vec::new();
        for (net_id, neighbors) in &server.lan_neighbors {
            if net_id.as_str() == "internet" {
                continue;
            }
            if let Some(filter) = net_id_filter {
                if net_id != filter {
                    continue;
                }
            }
            for neighbor_id in neighbors {
                if let Some(neighbor) = self.servers.get(neighbor_id) {
                    if let Some(interface) = neighbor.interfaces.iter().find(|i| &i.net_id == net_id) {
                        rows.push(ScanNeighbor { net_id: net_id.clone(), ip: interface.ip.clone() });
                    }
                }
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;
