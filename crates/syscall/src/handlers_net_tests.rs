// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use vt_core::{Exposure, Interface, NetId, NodeId, PortType, Port, ResultCode, SessionId};

use super::*;
use crate::context::build_context;
use crate::result::Transition;
use crate::test_support::minimal_world;

fn ctx(world: &vt_world::WorldRuntime, node_id: &str) -> ExecutionContext {
    build_context(world, NodeId::new(node_id), "player".to_string(), "/home/player".to_string(), SessionId::new("t1")).unwrap()
}

fn link(world: &mut vt_world::WorldRuntime, net_id: &str) {
    let net = NetId::new(net_id);
    for id in ["srv", "workstation"] {
        let server = world.servers.get_mut(&NodeId::new(id)).unwrap();
        server.subnet_membership.insert(net.clone());
        server.exposed_by_net.insert(net.clone(), true);
    }
    world.servers.get_mut(&NodeId::new("srv")).unwrap().ports.insert(21, Port { port_type: PortType::Ftp, service_id: None, exposure: Exposure::Private });
}

#[test]
fn known_lists_hosts_from_internet_net() {
    let mut world = minimal_world();
    world.servers.get_mut(&NodeId::new("srv")).unwrap().interfaces.push(Interface { net_id: NetId::new("internet"), ip: "10.0.0.5".to_string() });
    world.known_nodes_by_net.insert(NetId::new("internet"), HashSet::from([NodeId::new("srv")]));
    let c = ctx(&world, "workstation");
    let result = known(&mut world, &c, &[]);
    assert!(result.ok);
    assert_eq!(result.lines, vec!["srv 10.0.0.5".to_string()]);
}

#[test]
fn scan_on_workstation_reports_no_neighbors() {
    let mut world = minimal_world();
    let c = ctx(&world, "workstation");
    let result = scan(&mut world, &c, &[]);
    assert_eq!(result.lines, vec!["no neighbors".to_string()]);
}

#[test]
fn scan_with_unknown_net_is_not_found() {
    let mut world = minimal_world();
    let c = ctx(&world, "srv");
    let result = scan(&mut world, &c, &["ghost-net".to_string()]);
    assert_eq!(result.code, ResultCode::NotFound);
}

#[test]
fn connect_with_bad_password_is_permission_denied() {
    let mut world = minimal_world();
    link(&mut world, "lan0");
    world.ip_index.insert("10.0.0.9".to_string(), NodeId::new("srv"));
    let c = ctx(&world, "workstation");
    let result = connect(&mut world, &c, &["10.0.0.9".to_string(), "player".to_string(), "wrong".to_string()], 0);
    assert_eq!(result.code, ResultCode::PermissionDenied);
}

#[test]
fn connect_then_disconnect_round_trips_position() {
    let mut world = minimal_world();
    link(&mut world, "lan0");
    world.ip_index.insert("10.0.0.9".to_string(), NodeId::new("srv"));
    let c = ctx(&world, "workstation");
    let result = connect(&mut world, &c, &["10.0.0.9".to_string(), "player".to_string(), "pw".to_string()], 0);
    assert!(result.ok);
    match result.data {
        Some(Transition::Connection { next_node_id, .. }) => assert_eq!(next_node_id, "srv"),
        other => panic!("unexpected transition: {other:?}"),
    }

    let result = disconnect(&mut world, &c, &[]);
    assert!(result.ok);
    match result.data {
        Some(Transition::Disconnection { next_node_id, .. }) => assert_eq!(next_node_id, "workstation"),
        other => panic!("unexpected transition: {other:?}"),
    }
}

#[test]
fn ftp_get_writes_local_file_and_emits_file_acquire() {
    let mut world = minimal_world();
    link(&mut world, "lan0");
    let c = ctx(&world, "workstation");
    let result = ftp(&mut world, &c, &["get".to_string(), "/home/player/report.txt".to_string()], &NodeId::new("srv"), &"player".to_string(), 0);
    assert!(result.ok, "{result:?}");
    let overlay = &world.overlays[&NodeId::new("workstation")];
    assert!(overlay.stat(world.base_image(), "/home/player/report.txt").is_some());
    assert_eq!(world.event_queue.len(), 1);
}

#[test]
fn ftp_put_does_not_emit_file_acquire() {
    let mut world = minimal_world();
    link(&mut world, "lan0");
    let c = ctx(&world, "workstation");
    let result = ftp(&mut world, &c, &["put".to_string(), "/home/player/report.txt".to_string()], &NodeId::new("srv"), &"player".to_string(), 0);
    assert!(result.ok, "{result:?}");
    let overlay = &world.overlays[&NodeId::new("srv")];
    assert!(overlay.stat(world.base_image(), "/home/player/report.txt").is_some());
    assert!(world.event_queue.is_empty());
}

#[test]
fn ftp_on_closed_port_is_port_closed() {
    let mut world = minimal_world();
    let c = ctx(&world, "workstation");
    let result = ftp(&mut world, &c, &["get".to_string(), "/home/player/report.txt".to_string()], &NodeId::new("srv"), &"player".to_string(), 0);
    assert_eq!(result.code, ResultCode::PortClosed);
}
