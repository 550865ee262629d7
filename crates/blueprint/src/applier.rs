// SPDX-License-Identifier: MIT

//! Blueprint applier: builds a world from a catalog + scenario
//! (`§4.6 Blueprint applier`).

use std::collections::{HashMap, HashSet};

use vt_core::{
    Exposure, HandlerDescriptor, Interface, LogRing, NetId, NodeId, Port, ServerNode, ANY_KEY,
};
use vt_storage::{BaseImage, BlobStore, OverlayFs};

use crate::dto::{
    BlueprintCatalog, DiskOverlaySpec, OverlayContent, OverlayEntryMeta, Scenario, ServerSpec,
    ServerSpawn,
};
use crate::error::BlueprintError;
use crate::ip::{address_for_host_suffix, derive_address, Cidr};

/// A server plus its private overlay, ready to be handed to `vt-world`.
pub struct BuiltServer {
    pub node: ServerNode,
    pub overlay: OverlayFs,
}

/// The full output of applying one scenario (`§4.6` steps 1-5).
pub struct BuiltWorld {
    pub servers: HashMap<NodeId, BuiltServer>,
    pub ip_index: HashMap<String, NodeId>,
    pub handlers: Vec<HandlerDescriptor>,
    pub scripts: HashMap<String, String>,
}

/// Find `scenario_id` directly in the catalog, or by walking its
/// campaign trees.
pub fn resolve_scenario<'a>(catalog: &'a BlueprintCatalog, scenario_id: &str) -> Option<&'a Scenario> {
    if let Some(s) = catalog.scenarios.get(scenario_id) {
        return Some(s);
    }
    catalog
        .campaigns
        .values()
        .find_map(|c| crate::dto::find_scenario_in_campaign(c, &scenario_id.into()))
}

pub fn apply_scenario(
    catalog: &BlueprintCatalog,
    scenario_id: &str,
    base: &BaseImage,
    store: &mut BlobStore,
    world_seed: u64,
) -> Result<BuiltWorld, Vec<BlueprintError>> {
    let scenario = resolve_scenario(catalog, scenario_id)
        .ok_or_else(|| vec![BlueprintError::ScenarioNotFound(scenario_id.to_string())])?;

    let mut errors = Vec::new();
    let mut seen_node_ids = HashSet::new();
    let mut servers: HashMap<NodeId, BuiltServer> = HashMap::new();

    for spawn in &scenario.servers {
        if !seen_node_ids.insert(spawn.node_id.clone()) {
            errors.push(BlueprintError::DuplicateNodeId(spawn.node_id.clone()));
            continue;
        }
        let Some(spec) = catalog.server_specs.get(spawn.spec_id.as_str()) else {
            errors.push(BlueprintError::MissingSpec {
                node_id: spawn.node_id.clone(),
                spec_id: spawn.spec_id.clone(),
            });
            continue;
        };
        match build_server(spec, spawn, base, store) {
            Ok(built) => {
                servers.insert(spawn.node_id.clone(), built);
            }
            Err(e) => errors.push(e),
        }
    }

    let mut ip_index: HashMap<String, NodeId> = HashMap::new();
    for spawn in &scenario.servers {
        let Some(built) = servers.get_mut(&spawn.node_id) else { continue };
        for iface in &spawn.interfaces {
            let cidr = scenario
                .subnet_topology
                .get(&iface.net_id)
                .and_then(|t| Cidr::parse(&t.address_plan));
            let has_topology = scenario.subnet_topology.contains_key(&iface.net_id);

            let ip = match iface.host_suffix {
                Some(suffix) => match cidr {
                    Some(cidr) => address_for_host_suffix(&cidr, suffix),
                    None if has_topology => {
                        let plan = scenario
                            .subnet_topology
                            .get(&iface.net_id)
                            .map(|t| t.address_plan.clone())
                            .unwrap_or_default();
                        errors.push(BlueprintError::MalformedAddressPlan(plan, iface.net_id.clone()));
                        continue;
                    }
                    None => {
                        errors.push(BlueprintError::UnknownNet {
                            node_id: spawn.node_id.clone(),
                            net_id: iface.net_id.clone(),
                        });
                        continue;
                    }
                },
                None => derive_address(world_seed, &spawn.node_id, &iface.net_id, cidr.as_ref()),
            };

            if let Some(existing) = ip_index.get(&ip) {
                if existing != &spawn.node_id {
                    errors.push(BlueprintError::DuplicateIp {
                        ip: ip.clone(),
                        first: existing.clone(),
                        second: spawn.node_id.clone(),
                    });
                    continue;
                }
            }
            ip_index.insert(ip.clone(), spawn.node_id.clone());

            built.node.interfaces.push(Interface { net_id: iface.net_id.clone(), ip });
            built.node.subnet_membership.insert(iface.net_id.clone());
            built.node.exposed_by_net.insert(iface.net_id.clone(), iface.initially_exposed);
        }
    }

    for (net_id, topology) in &scenario.subnet_topology {
        for hub in topology.hubs.values() {
            for a in &hub.members {
                for b in &hub.members {
                    if a != b {
                        add_lan_neighbor(&mut servers, a, net_id, b.clone());
                    }
                }
            }
        }
        for (a, b) in &topology.links {
            add_lan_neighbor(&mut servers, a, net_id, b.clone());
            add_lan_neighbor(&mut servers, b, net_id, a.clone());
        }
    }

    let mut handlers = Vec::new();
    for (event_id, blueprint) in &scenario.events {
        let Some(condition_type) = blueprint.condition_type else {
            errors.push(BlueprintError::MissingConditionType(event_id.to_string()));
            continue;
        };
        handlers.push(HandlerDescriptor {
            scenario_id: scenario.scenario_id.clone(),
            event_id: event_id.clone(),
            condition_type,
            node_id_key: blueprint.node_id_key.as_ref().map(|n| n.as_str().to_string()).unwrap_or_else(|| ANY_KEY.to_string()),
            user_key: blueprint.user_key.clone().unwrap_or_else(|| ANY_KEY.to_string()),
            privilege_key: blueprint.privilege_key.clone().unwrap_or_else(|| ANY_KEY.to_string()),
            file_name_key: blueprint.file_name_key.clone().unwrap_or_else(|| ANY_KEY.to_string()),
            guard: blueprint.guard_content.clone(),
            actions: blueprint.actions.clone(),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(BuiltWorld {
        servers,
        ip_index,
        handlers,
        scripts: scenario.scripts.clone(),
    })
}

fn add_lan_neighbor(servers: &mut HashMap<NodeId, BuiltServer>, node_id: &NodeId, net_id: &NetId, neighbor: NodeId) {
    if let Some(built) = servers.get_mut(node_id) {
        let list = built.node.lan_neighbors.entry(net_id.clone()).or_default();
        if !list.contains(&neighbor) {
            list.push(neighbor);
        }
    }
}

fn build_server(
    spec: &ServerSpec,
    spawn: &ServerSpawn,
    base: &BaseImage,
    store: &mut BlobStore,
) -> Result<BuiltServer, BlueprintError> {
    let mut ports: HashMap<u16, Port> = spec.ports.clone();
    for (num, port) in &spawn.port_adds {
        ports.insert(*num, port.clone());
    }
    for num in &spawn.port_removes {
        ports.remove(num);
    }

    let mut daemons = spec.daemons.clone();
    for (kind, args) in &spawn.daemon_adds {
        daemons.insert(kind.clone(), args.clone());
    }
    for kind in &spawn.daemon_removes {
        daemons.remove(kind);
    }

    let node = ServerNode {
        node_id: spawn.node_id.clone(),
        name: spawn.hostname_override.clone().unwrap_or_else(|| spec.hostname.clone()),
        role: spawn.role.clone(),
        status: spawn.initial_status_override.unwrap_or(spec.initial_status),
        reason: spawn.initial_reason_override.unwrap_or(spec.initial_reason),
        interfaces: Vec::new(),
        subnet_membership: HashSet::new(),
        exposed_by_net: HashMap::new(),
        users: spec.users.clone(),
        sessions: HashMap::new(),
        lan_neighbors: HashMap::new(),
        ports,
        process_ids: HashSet::new(),
        daemons,
        logs: LogRing::new(spec.log_capacity),
    };

    let mut overlay = OverlayFs::new();
    apply_disk_overlay(&mut overlay, base, store, &spec.spec_id, &spec.disk_overlay)?;
    apply_overlay_entries(&mut overlay, base, store, &spec.spec_id, &spawn.overlay_adds)?;
    for path in &spawn.overlay_removes {
        overlay
            .delete_subtree(base, store, path)
            .map_err(|e| BlueprintError::InvalidOverlayEntry {
                spec_id: spec.spec_id.clone(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
    }

    Ok(BuiltServer { node, overlay })
}

fn apply_disk_overlay(
    overlay: &mut OverlayFs,
    base: &BaseImage,
    store: &mut BlobStore,
    spec_id: &vt_core::SpecId,
    disk: &DiskOverlaySpec,
) -> Result<(), BlueprintError> {
    apply_overlay_entries(overlay, base, store, spec_id, &disk.entries)?;
    for path in &disk.tombstones {
        overlay
            .delete_subtree(base, store, path)
            .map_err(|e| BlueprintError::InvalidOverlayEntry {
                spec_id: spec_id.clone(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
    }
    Ok(())
}

/// Apply a path → entry map, materializing directories before files so
/// that deeper paths never race their own ancestors.
fn apply_overlay_entries(
    overlay: &mut OverlayFs,
    base: &BaseImage,
    store: &mut BlobStore,
    spec_id: &vt_core::SpecId,
    entries: &HashMap<String, OverlayEntryMeta>,
) -> Result<(), BlueprintError> {
    let mut paths: Vec<&String> = entries.keys().collect();
    paths.sort_by_key(|p| p.matches('/').count());

    for path in paths {
        let meta = &entries[path];
        let result = match &meta.content {
            OverlayContent::Dir => overlay.add_dir(base, path).or_else(|e| {
                if e == vt_storage::OverlayError::AlreadyExists {
                    Ok(())
                } else {
                    Err(e)
                }
            }),
            OverlayContent::Text(text) => overlay.write_file(base, store, path, text.as_bytes(), meta.file_kind),
            OverlayContent::Binary(bytes) => overlay.write_file(base, store, path, bytes, meta.file_kind),
            OverlayContent::Hardcode(id) => {
                let token = format!("exec:{id}");
                overlay.write_file(base, store, path, token.as_bytes(), meta.file_kind)
            }
        };
        result.map_err(|e| BlueprintError::InvalidOverlayEntry {
            spec_id: spec_id.clone(),
            path: path.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "applier_tests.rs"]
mod tests;
