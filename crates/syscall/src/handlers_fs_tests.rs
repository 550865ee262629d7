// SPDX-License-Identifier: MIT

use vt_core::{NodeId, ResultCode, SessionId};

use super::*;
use crate::context::build_context;
use crate::test_support::minimal_world;
use crate::result::Transition;

fn ctx(world: &vt_world::WorldRuntime) -> ExecutionContext {
    build_context(world, NodeId::new("workstation"), "player".to_string(), "/home/player".to_string(), SessionId::new("t1")).unwrap()
}

#[test]
fn pwd_prints_cwd() {
    let mut world = minimal_world();
    let c = ctx(&world);
    assert_eq!(pwd(&mut world, &c, &[]).lines, vec!["/home/player".to_string()]);
}

#[test]
fn ls_lists_sorted_children() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = ls(&mut world, &c, &[]);
    assert!(result.ok);
    assert_eq!(result.lines, vec!["report.txt".to_string()]);
}

#[test]
fn ls_on_missing_path_is_not_found() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = ls(&mut world, &c, &["ghost".to_string()]);
    assert_eq!(result.code, ResultCode::NotFound);
}

#[test]
fn cd_updates_next_cwd_on_success() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = cd(&mut world, &c, &["/".to_string()]);
    assert_eq!(result.next_cwd, Some("/".to_string()));
}

#[test]
fn cat_reads_text_file() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = cat(&mut world, &c, &["report.txt".to_string()]);
    assert_eq!(result.lines, vec!["findings".to_string()]);
}

#[test]
fn cat_on_directory_is_is_directory() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = cat(&mut world, &c, &["/home".to_string()]);
    assert_eq!(result.code, ResultCode::IsDirectory);
}

#[test]
fn mkdir_creates_directory() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = mkdir(&mut world, &c, &["notes".to_string()]);
    assert!(result.ok);
    let overlay = &world.overlays[&NodeId::new("workstation")];
    assert!(overlay.stat(world.base_image(), "/home/player/notes").unwrap().is_dir());
}

#[test]
fn mkdir_dash_p_creates_missing_parents() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = mkdir(&mut world, &c, &["-p".to_string(), "a/b/c".to_string()]);
    assert!(result.ok);
    let overlay = &world.overlays[&NodeId::new("workstation")];
    assert!(overlay.stat(world.base_image(), "/home/player/a/b/c").unwrap().is_dir());
}

#[test]
fn rm_deletes_file() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = rm(&mut world, &c, &["report.txt".to_string()]);
    assert!(result.ok);
    let overlay = &world.overlays[&NodeId::new("workstation")];
    assert!(overlay.stat(world.base_image(), "/home/player/report.txt").is_none());
}

#[test]
fn rm_without_dash_r_on_nonempty_dir_is_not_directory() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = rm(&mut world, &c, &["/home".to_string()]);
    assert_eq!(result.code, ResultCode::NotDirectory);
}

#[test]
fn cp_duplicates_content_and_mv_also_removes_source() {
    let mut world = minimal_world();
    let c = ctx(&world);
    assert!(cp(&mut world, &c, &["report.txt".to_string(), "copy.txt".to_string()]).ok);
    let overlay = &world.overlays[&NodeId::new("workstation")];
    assert!(overlay.stat(world.base_image(), "/home/player/copy.txt").is_some());
    assert!(overlay.stat(world.base_image(), "/home/player/report.txt").is_some());

    assert!(mv(&mut world, &c, &["copy.txt".to_string(), "moved.txt".to_string()]).ok);
    let overlay = &world.overlays[&NodeId::new("workstation")];
    assert!(overlay.stat(world.base_image(), "/home/player/moved.txt").is_some());
    assert!(overlay.stat(world.base_image(), "/home/player/copy.txt").is_none());
}

#[test]
fn edit_returns_editor_transition_with_current_text() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = edit(&mut world, &c, &["report.txt".to_string()]);
    match result.data {
        Some(Transition::Editor { text, binary_hex: None, .. }) => assert_eq!(text, "findings"),
        other => panic!("unexpected transition: {other:?}"),
    }
}

#[test]
fn edit_on_new_path_returns_empty_text() {
    let mut world = minimal_world();
    let c = ctx(&world);
    let result = edit(&mut world, &c, &["new.txt".to_string()]);
    match result.data {
        Some(Transition::Editor { text, .. }) => assert_eq!(text, ""),
        other => panic!("unexpected transition: {other:?}"),
    }
}
