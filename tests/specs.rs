// SPDX-License-Identifier: MIT

//! End-to-end scenarios exercising the full `vt-core`/`vt-storage`/
//! `vt-blueprint`/`vt-world`/`vt-syscall`/`vt-engine` stack together.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use vt_blueprint::{
    apply_scenario, BlueprintCatalog, DiskOverlaySpec, InterfaceSpawn, OverlayContent, OverlayEntryMeta,
    Scenario, ServerSpawn, ServerSpec, SubnetTopology,
};
use vt_core::{
    Action, AuthMode, ConditionType, Event, EventId, EventPayload, Exposure, FileKind, HandlerDescriptor, LogRing,
    NodeId, NodeReason, NodeStatus, Pid, Port, PortType, Privilege, Process, ProcessState, ProcessType, ScenarioId,
    SequentialIdGen, ServerNode, SessionId, User, ANY_KEY,
};
use vt_engine::{dispatcher, handler_index::HandlerIndex, scheduler::Scheduler, Engine};
use vt_storage::{BaseImage, BlobStore, OverlayFs};
use vt_syscall::{build_context, default_registry, execute_terminal_command, TerminalRequest};
use vt_script::ScriptHost;
use vt_world::{WorldConfig, WorldRuntime};

fn config(base: BaseImage, store: BlobStore) -> WorldConfig {
    WorldConfig {
        world_seed: 1,
        base_image: Arc::new(base),
        blob_store: Arc::new(Mutex::new(store)),
        id_gen: Arc::new(SequentialIdGen::new("test")),
    }
}

fn player_server(node_id: &str) -> ServerNode {
    ServerNode {
        node_id: NodeId::new(node_id),
        name: node_id.to_string(),
        role: "generic".to_string(),
        status: NodeStatus::Online,
        reason: NodeReason::Ok,
        interfaces: Vec::new(),
        subnet_membership: Default::default(),
        exposed_by_net: HashMap::new(),
        users: HashMap::from([(
            "player".to_string(),
            User { user_id: "player".to_string(), passwd: Some("pw".to_string()), auth_mode: AuthMode::Static, privilege: Privilege::FULL },
        )]),
        sessions: HashMap::new(),
        lan_neighbors: HashMap::new(),
        ports: HashMap::new(),
        process_ids: Default::default(),
        daemons: HashMap::new(),
        logs: LogRing::new(16),
    }
}

/// S1 — `ls` on a tombstoned base file: a deleted base entry is absent
/// from both `ls` output and `resolve`.
#[test]
fn ls_excludes_a_tombstoned_base_file() {
    let mut base = BaseImage::new();
    let mut store = BlobStore::new();
    base.add_dir("/etc");
    base.add_file(&mut store, "/etc/motd", b"welcome", FileKind::Text, true);

    let mut overlay = OverlayFs::new();
    overlay.delete(&base, &mut store, "/etc/motd").unwrap();

    assert!(overlay.resolve(&base, "/etc/motd").is_none());

    let mut servers = HashMap::new();
    servers.insert(NodeId::new("x"), vt_blueprint::BuiltServer { node: player_server("x"), overlay });
    let built = vt_blueprint::BuiltWorld { servers, ip_index: HashMap::new(), handlers: Vec::new(), scripts: HashMap::new() };
    let mut world = WorldRuntime::from_built_world(built, config(base, store));

    let registry = default_registry().unwrap();
    let mut scripts = ScriptHost::new();
    let req = TerminalRequest {
        node_id: NodeId::new("x"),
        user_key: "player".to_string(),
        cwd: "/home/player".to_string(),
        terminal_session_id: SessionId::new("t1"),
        line: "ls /etc".to_string(),
    };
    let result = execute_terminal_command(&mut world, &registry, &mut scripts, &req, 0);
    assert!(result.ok);
    assert!(!result.lines.iter().any(|l| l.contains("motd")));
}

/// S2 — deterministic `cp` via blob retain: both paths resolve to the
/// same content id, whose refcount reflects both references.
#[test]
fn cp_shares_content_id_and_bumps_refcount() {
    let mut base = BaseImage::new();
    let mut store = BlobStore::new();
    base.add_dir("/home");
    base.add_file(&mut store, "/home/a.txt", b"same bytes", FileKind::Text, false);
    let content_id = base.resolve("/home/a.txt").unwrap().content_id.clone().unwrap();

    let mut servers = HashMap::new();
    servers.insert(NodeId::new("x"), vt_blueprint::BuiltServer { node: player_server("x"), overlay: OverlayFs::new() });
    let built = vt_blueprint::BuiltWorld { servers, ip_index: HashMap::new(), handlers: Vec::new(), scripts: HashMap::new() };
    let mut world = WorldRuntime::from_built_world(built, config(base, store));

    let registry = default_registry().unwrap();
    let mut scripts = ScriptHost::new();
    let req = TerminalRequest {
        node_id: NodeId::new("x"),
        user_key: "player".to_string(),
        cwd: "/home".to_string(),
        terminal_session_id: SessionId::new("t1"),
        line: "cp a.txt b.txt".to_string(),
    };
    let result = execute_terminal_command(&mut world, &registry, &mut scripts, &req, 0);
    assert!(result.ok, "{result:?}");

    let overlay = &world.overlays[&NodeId::new("x")];
    let a_id = overlay.resolve(world.base_image(), "/home/a.txt").unwrap().content_id.unwrap();
    let b_id = overlay.resolve(world.base_image(), "/home/b.txt").unwrap().content_id.unwrap();
    assert_eq!(a_id, content_id);
    assert_eq!(b_id, content_id);
    assert!(world.blob_store().lock().refcount(&content_id) >= 2);
}

fn two_node_lan_world() -> WorldRuntime {
    let mut base = BaseImage::new();
    let store = BlobStore::new();
    base.add_dir("/home/player");

    let mut catalog = BlueprintCatalog::default();
    catalog.server_specs.insert(
        "workstation-spec".into(),
        ServerSpec {
            spec_id: "workstation-spec".into(),
            initial_status: NodeStatus::Online,
            initial_reason: NodeReason::Ok,
            hostname: "workstation".to_string(),
            users: HashMap::from([(
                "player".to_string(),
                User { user_id: "player".to_string(), passwd: None, auth_mode: AuthMode::None, privilege: Privilege::FULL },
            )]),
            ports: HashMap::new(),
            daemons: HashMap::new(),
            disk_overlay: DiskOverlaySpec::default(),
            log_capacity: 16,
        },
    );
    catalog.server_specs.insert(
        "srv-spec".into(),
        ServerSpec {
            spec_id: "srv-spec".into(),
            initial_status: NodeStatus::Online,
            initial_reason: NodeReason::Ok,
            hostname: "srv".to_string(),
            users: HashMap::from([(
                "ops".to_string(),
                User { user_id: "ops".to_string(), passwd: Some("pw2".to_string()), auth_mode: AuthMode::Static, privilege: Privilege::FULL },
            )]),
            ports: HashMap::from([
                (22, Port { port_type: PortType::Ssh, service_id: None, exposure: Exposure::Private }),
                (21, Port { port_type: PortType::Ftp, service_id: None, exposure: Exposure::Private }),
            ]),
            daemons: HashMap::new(),
            disk_overlay: DiskOverlaySpec {
                entries: HashMap::from([
                    (
                        "/etc/motd".to_string(),
                        OverlayEntryMeta { file_kind: FileKind::Text, content: OverlayContent::Text("welcome to srv".to_string()) },
                    ),
                    (
                        "/etc/banner.txt".to_string(),
                        OverlayEntryMeta { file_kind: FileKind::Text, content: OverlayContent::Text("big banner".to_string()) },
                    ),
                    (
                        "/opt/data/report.txt".to_string(),
                        OverlayEntryMeta { file_kind: FileKind::Text, content: OverlayContent::Text("findings".to_string()) },
                    ),
                ]),
                tombstones: Vec::new(),
            },
            log_capacity: 16,
        },
    );

    let mut scenario = Scenario { scenario_id: "s1".into(), ..Default::default() };
    scenario.servers.push(ServerSpawn {
        node_id: "workstation".into(),
        spec_id: "workstation-spec".into(),
        role: "generic".to_string(),
        interfaces: vec![InterfaceSpawn { net_id: "lan".into(), host_suffix: Some(5), initially_exposed: false }],
        ..Default::default()
    });
    scenario.servers.push(ServerSpawn {
        node_id: "srv".into(),
        spec_id: "srv-spec".into(),
        role: "generic".to_string(),
        interfaces: vec![InterfaceSpawn { net_id: "lan".into(), host_suffix: Some(9), initially_exposed: true }],
        ..Default::default()
    });
    scenario.subnet_topology.insert(
        "lan".into(),
        SubnetTopology { address_plan: "10.0.20.0/24".to_string(), hubs: HashMap::new(), links: Vec::new() },
    );
    catalog.scenarios.insert("s1".into(), scenario);

    let mut store_mut = store;
    let built = apply_scenario(&catalog, "s1", &base, &mut store_mut, 1).unwrap();
    WorldRuntime::from_built_world(built, config(base, store_mut))
}

/// S3 — connect, read a remote file, disconnect restores the prior
/// position.
#[test]
fn connect_then_remote_cat_then_disconnect_restores_cwd() {
    let mut world = two_node_lan_world();
    let registry = default_registry().unwrap();
    let mut scripts = ScriptHost::new();
    let session = SessionId::new("t1");

    let connect_req = TerminalRequest {
        node_id: NodeId::new("workstation"),
        user_key: "player".to_string(),
        cwd: "/home/player".to_string(),
        terminal_session_id: session.clone(),
        line: "connect 10.0.20.9 ops pw2".to_string(),
    };
    let connected = execute_terminal_command(&mut world, &registry, &mut scripts, &connect_req, 0);
    assert!(connected.ok, "{connected:?}");
    assert_eq!(connected.next_cwd.as_deref(), Some("/"));
    assert!(connected.lines.iter().any(|l| l.contains("welcome to srv")));

    let cat_req = TerminalRequest {
        node_id: NodeId::new("srv"),
        user_key: "ops".to_string(),
        cwd: "/".to_string(),
        terminal_session_id: session.clone(),
        line: "cat /etc/banner.txt".to_string(),
    };
    let cat_result = execute_terminal_command(&mut world, &registry, &mut scripts, &cat_req, 0);
    assert_eq!(cat_result.lines, vec!["big banner".to_string()]);

    let disconnect_req = TerminalRequest {
        node_id: NodeId::new("srv"),
        user_key: "ops".to_string(),
        cwd: "/".to_string(),
        terminal_session_id: session,
        line: "disconnect".to_string(),
    };
    let disconnected = execute_terminal_command(&mut world, &registry, &mut scripts, &disconnect_req, 0);
    assert!(disconnected.ok, "{disconnected:?}");
    assert_eq!(disconnected.next_cwd.as_deref(), Some("/home/player"));
    match disconnected.data {
        Some(vt_syscall::Transition::Disconnection { next_node_id, .. }) => assert_eq!(next_node_id, "workstation"),
        other => panic!("unexpected transition: {other:?}"),
    }
}

/// S4 — `ftp get` writes the file locally and emits a `fileAcquire`
/// event, dispatched on the next tick.
#[test]
fn ftp_get_emits_a_file_acquire_event_dispatched_next_tick() {
    let mut world = two_node_lan_world();
    let ctx = build_context(&world, NodeId::new("workstation"), "player".to_string(), "/home/player".to_string(), SessionId::new("t1")).unwrap();

    let result = vt_syscall::handlers_net::ftp(
        &mut world,
        &ctx,
        &["get".to_string(), "/opt/data/report.txt".to_string(), "/home/player/report.txt".to_string()],
        &NodeId::new("srv"),
        &"ops".to_string(),
        0,
    );
    assert!(result.ok, "{result:?}");
    assert_eq!(world.event_queue.len(), 1);
    match &world.event_queue[0].payload {
        EventPayload::FileAcquire { from_node_id, file_name, transfer_method, .. } => {
            assert_eq!(from_node_id, &NodeId::new("srv"));
            assert_eq!(file_name, "report.txt");
            assert_eq!(transfer_method, "ftp");
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    let index = HandlerIndex::build(&world.handlers);
    dispatcher::drain(&mut world, &index);
    assert!(world.event_queue.is_empty());

    let overlay = &world.overlays[&NodeId::new("workstation")];
    assert!(overlay.resolve(world.base_image(), "/home/player/report.txt").is_some());
}

/// S5 — a booting process transitions its host `Online` and emits
/// `processFinished` exactly at its scheduled end time.
#[test]
fn booting_process_finishes_and_brings_its_host_online_at_end_time() {
    let base = BaseImage::new();
    let store = BlobStore::new();
    let mut server = player_server("srv");
    server.status = NodeStatus::Offline;
    server.reason = NodeReason::PoweredOff;

    let mut servers = HashMap::new();
    servers.insert(NodeId::new("srv"), vt_blueprint::BuiltServer { node: server, overlay: OverlayFs::new() });
    let built = vt_blueprint::BuiltWorld { servers, ip_index: HashMap::new(), handlers: Vec::new(), scripts: HashMap::new() };
    let mut world = WorldRuntime::from_built_world(built, config(base, store));

    let pid = world
        .spawn_process(Process {
            pid: 0,
            name: "boot".to_string(),
            host_node_id: NodeId::new("srv"),
            user_key: "player".to_string(),
            state: ProcessState::Running,
            path: "<boot>".to_string(),
            process_type: ProcessType::Booting,
            process_args: Vec::new(),
            end_at_ms: 10_000,
        })
        .unwrap();

    let mut engine = Engine::new(&world);
    engine.schedule_process(pid, 10_000);

    engine.run_tick(&mut world, 9_999);
    assert_eq!(world.servers[&NodeId::new("srv")].status, NodeStatus::Offline);

    engine.run_tick(&mut world, 10_000);
    assert_eq!(world.servers[&NodeId::new("srv")].status, NodeStatus::Online);
    assert_eq!(world.process_list[&pid].state, ProcessState::Finished);
}

fn privilege_acquire_handler(key: &str) -> HandlerDescriptor {
    HandlerDescriptor {
        scenario_id: ScenarioId::new("s1"),
        event_id: EventId::new(key),
        condition_type: ConditionType::PrivilegeAcquire,
        node_id_key: ANY_KEY.to_string(),
        user_key: ANY_KEY.to_string(),
        privilege_key: ANY_KEY.to_string(),
        file_name_key: ANY_KEY.to_string(),
        guard: None,
        actions: vec![Action::SetFlag { key: key.to_string(), value: serde_json::json!(true) }],
    }
}

fn privilege_acquire_event() -> Event {
    Event {
        time_ms: 0,
        seq: 0,
        payload: EventPayload::PrivilegeAcquire {
            node_id: NodeId::new("srv"),
            user_key: "player".to_string(),
            privilege: "w".to_string(),
            via: "connect".to_string(),
            unlocked_net_ids: Vec::new(),
            acquired_at_ms: 0,
        },
    }
}

/// S6 — a tick whose budget runs out mid-drain defers the rest of the
/// queue to the next drain instead of dropping it.
#[test]
fn a_budget_exhausted_mid_tick_defers_work_without_losing_it() {
    let base = BaseImage::new();
    let store = BlobStore::new();
    let mut servers = HashMap::new();
    servers.insert(NodeId::new("srv"), vt_blueprint::BuiltServer { node: player_server("srv"), overlay: OverlayFs::new() });
    let built = vt_blueprint::BuiltWorld { servers, ip_index: HashMap::new(), handlers: Vec::new(), scripts: HashMap::new() };
    let mut world = WorldRuntime::from_built_world(built, config(base, store));

    world.handlers = vec![privilege_acquire_handler("e1"), privilege_acquire_handler("e2"), privilege_acquire_handler("e3")];
    for _ in 0..3 {
        world.event_queue.push_back(privilege_acquire_event());
    }
    let index = HandlerIndex::build(&world.handlers);

    dispatcher::drain_with_budget(&mut world, &index, Duration::ZERO);
    assert_eq!(world.event_queue.len(), 3, "an exhausted budget must not drop queued events");
    assert!(world.fired_handler_ids.is_empty());

    dispatcher::drain(&mut world, &index);
    assert!(world.event_queue.is_empty());
    assert_eq!(world.fired_handler_ids.len(), 3);
    for key in ["e1", "e2", "e3"] {
        assert_eq!(world.scenario_flags.get(key), Some(&serde_json::json!(true)));
    }
}

/// Sanity check that the scheduler component `vt-engine` wraps survives
/// a direct `rebuild_from_snapshot` round trip, covering invariant 6
/// (`§8`: the process table partitions cleanly across servers).
#[test]
fn scheduler_rebuild_from_snapshot_recovers_running_processes() {
    let base = BaseImage::new();
    let store = BlobStore::new();
    let mut servers = HashMap::new();
    servers.insert(NodeId::new("srv"), vt_blueprint::BuiltServer { node: player_server("srv"), overlay: OverlayFs::new() });
    let built = vt_blueprint::BuiltWorld { servers, ip_index: HashMap::new(), handlers: Vec::new(), scripts: HashMap::new() };
    let mut world = WorldRuntime::from_built_world(built, config(base, store));

    let pid: Pid = world
        .spawn_process(Process {
            pid: 0,
            name: "job".to_string(),
            host_node_id: NodeId::new("srv"),
            user_key: "player".to_string(),
            state: ProcessState::Running,
            path: "/opt/bin/job".to_string(),
            process_type: ProcessType::Generic,
            process_args: Vec::new(),
            end_at_ms: 5_000,
        })
        .unwrap();

    let mut scheduler = Scheduler::new();
    scheduler.rebuild_from_snapshot(&world.process_list);
    assert!(scheduler.pop_due(4_999, &world.process_list).is_empty());
    assert_eq!(scheduler.pop_due(5_000, &world.process_list), vec![pid]);
}
