// SPDX-License-Identifier: MIT

use std::sync::Arc;

use parking_lot::Mutex;
use rhai::Engine;
use vt_core::NodeId;

use super::*;
use crate::import::ImportCache;
use crate::snapshot::FsSnapshot;
use crate::test_support::minimal_world;

fn engine_with_state(world: &vt_world::WorldRuntime, node_id: &NodeId) -> (Engine, Arc<Mutex<RunState>>) {
    let snapshot = FsSnapshot::capture(world, node_id).unwrap();
    let state = Arc::new(Mutex::new(RunState {
        snapshot,
        write_allowed: true,
        lines: Vec::new(),
        now_ms: 1_000,
        known_hosts: vec![("srv".to_string(), "10.0.0.5".to_string())],
        scan_neighbors: Default::default(),
        node_id: node_id.clone(),
        import_cache: ImportCache::default(),
        import_stack: Vec::new(),
    }));
    let mut engine = Engine::new();
    register_all(&mut engine, state.clone());
    (engine, state)
}

#[test]
fn term_print_appends_to_the_line_buffer() {
    let world = minimal_world();
    let (engine, state) = engine_with_state(&world, &NodeId::new("workstation"));
    engine.eval::<()>(r#"term::print("hello")"#).unwrap();
    assert_eq!(state.lock().lines, vec!["hello".to_string()]);
}

#[test]
fn fs_read_returns_the_file_contents() {
    let world = minimal_world();
    let (engine, _state) = engine_with_state(&world, &NodeId::new("workstation"));
    let result: rhai::Map = engine.eval(r#"fs::read("/home/player/report.txt")"#).unwrap();
    assert_eq!(result["ok"].clone().as_int().unwrap(), 1);
    assert_eq!(result["text"].clone().into_string().unwrap(), "findings");
}

#[test]
fn fs_read_on_missing_path_reports_not_found() {
    let world = minimal_world();
    let (engine, _state) = engine_with_state(&world, &NodeId::new("workstation"));
    let result: rhai::Map = engine.eval(r#"fs::read("/ghost")"#).unwrap();
    assert_eq!(result["ok"].clone().as_int().unwrap(), 0);
    assert_eq!(result["code"].clone().into_string().unwrap(), "ERR_NOT_FOUND");
}

#[test]
fn fs_write_then_read_round_trips_within_the_same_run() {
    let world = minimal_world();
    let (engine, state) = engine_with_state(&world, &NodeId::new("workstation"));
    engine.eval::<rhai::Map>(r#"fs::write("/home/player/notes.txt", "draft")"#).unwrap();
    let result: rhai::Map = engine.eval(r#"fs::read("/home/player/notes.txt")"#).unwrap();
    assert_eq!(result["text"].clone().into_string().unwrap(), "draft");
    assert_eq!(state.lock().snapshot.effects.len(), 1);
}

#[test]
fn crypto_sha256_matches_the_content_id_hash() {
    let world = minimal_world();
    let (engine, _state) = engine_with_state(&world, &NodeId::new("workstation"));
    let digest: String = engine.eval(r#"crypto::sha256("findings")"#).unwrap();
    assert_eq!(digest, vt_core::ContentId::of(b"findings").as_str());
}

#[test]
fn ssh_connect_reports_not_available_from_a_script() {
    let world = minimal_world();
    let (engine, _state) = engine_with_state(&world, &NodeId::new("workstation"));
    let result: rhai::Map = engine.eval(r#"ssh::connect("host", "user", "pw")"#).unwrap();
    assert_eq!(result["ok"].clone().as_int().unwrap(), 0);
}
