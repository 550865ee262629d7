// SPDX-License-Identifier: MIT

//! Deterministic IPv4 assignment (`§4.6` step 2: interfaces with a
//! `hostSuffix` get a CIDR-relative address; the rest get an address
//! derived from `worldSeed`, `nodeId`, and `netId`).

use vt_core::{ContentId, NetId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    network: u32,
    prefix: u8,
}

impl Cidr {
    pub fn parse(s: &str) -> Option<Self> {
        let (addr, prefix) = s.split_once('/')?;
        let prefix: u8 = prefix.parse().ok()?;
        if prefix > 32 {
            return None;
        }
        let network = parse_ipv4(addr)?;
        let mask = if prefix == 0 { 0 } else { !0u32 << (32 - prefix) };
        Some(Self { network: network & mask, prefix })
    }

    fn host_count(&self) -> u32 {
        if self.prefix >= 32 {
            1
        } else {
            1u32 << (32 - self.prefix)
        }
    }

    /// Place `offset` inside the host range, skipping the network and
    /// broadcast addresses when the range is large enough to spare them.
    fn address_at(&self, offset: u32) -> u32 {
        let count = self.host_count();
        if count <= 2 {
            self.network.wrapping_add(offset % count.max(1))
        } else {
            let usable = count - 2;
            self.network + 1 + (offset % usable)
        }
    }
}

fn parse_ipv4(s: &str) -> Option<u32> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for slot in octets.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(u32::from_be_bytes(octets))
}

fn format_ipv4(addr: u32) -> String {
    let b = addr.to_be_bytes();
    format!("{}.{}.{}.{}", b[0], b[1], b[2], b[3])
}

fn seed_hash(world_seed: u64, node_id: &NodeId, net_id: &NetId) -> u32 {
    let mut bytes = Vec::with_capacity(8 + node_id.as_str().len() + net_id.as_str().len() + 2);
    bytes.extend_from_slice(&world_seed.to_le_bytes());
    bytes.extend_from_slice(node_id.as_str().as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(net_id.as_str().as_bytes());
    let digest = ContentId::of(&bytes);
    let hex = digest.as_str();
    u32::from_str_radix(&hex[..8], 16).unwrap_or(0)
}

/// An address within `cidr`, placed by a `hostSuffix` the blueprint
/// pinned explicitly.
pub fn address_for_host_suffix(cidr: &Cidr, host_suffix: u32) -> String {
    format_ipv4(cidr.address_at(host_suffix))
}

/// A deterministic address for an interface the blueprint left
/// unpinned: inside `cidr` when the net has a declared subnet plan,
/// otherwise a stable pseudo-public address in the documentation range
/// `203.0.113.0/24` (`§9 Non-goals`: no real networking is modeled).
pub fn derive_address(world_seed: u64, node_id: &NodeId, net_id: &NetId, cidr: Option<&Cidr>) -> String {
    let hash = seed_hash(world_seed, node_id, net_id);
    match cidr {
        Some(cidr) => format_ipv4(cidr.address_at(hash)),
        None => {
            let doc_net = Cidr::parse("203.0.113.0/24").expect("literal CIDR");
            format_ipv4(doc_net.address_at(hash))
        }
    }
}

#[cfg(test)]
#[path = "ip_tests.rs"]
mod tests;
