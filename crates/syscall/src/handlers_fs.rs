// SPDX-License-Identifier: MIT

//! Filesystem built-in handlers (`§4.8`).

use vt_core::{path, FileKind, ResultCode};
use vt_world::WorldRuntime;

use crate::context::{acting_privilege, ExecutionContext};
use crate::result::{CommandResult, Transition};

pub fn pwd(_world: &mut WorldRuntime, ctx: &ExecutionContext, _args: &[String]) -> CommandResult {
    CommandResult::ok(vec![ctx.cwd.clone()])
}

pub fn ls(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    let target = args.first().map(|p| path::normalize(p, &ctx.cwd)).unwrap_or_else(|| ctx.cwd.clone());
    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.r {
        return CommandResult::err(ResultCode::PermissionDenied, "read access denied");
    }
    let overlay = &world.overlays[&ctx.node_id];
    match overlay.stat(world.base_image(), &target) {
        None => CommandResult::err(ResultCode::NotFound, "no such path"),
        Some(e) if !e.is_dir() => CommandResult::err(ResultCode::NotDirectory, "not a directory"),
        Some(_) => CommandResult::ok(overlay.list_children(world.base_image(), &target)),
    }
}

pub fn cd(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    let target = args.first().map(|p| path::normalize(p, &ctx.cwd)).unwrap_or_else(|| ctx.cwd.clone());
    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.r {
        return CommandResult::err(ResultCode::PermissionDenied, "read access denied");
    }
    let overlay = &world.overlays[&ctx.node_id];
    match overlay.stat(world.base_image(), &target) {
        None => CommandResult::err(ResultCode::NotFound, "no such path"),
        Some(e) if !e.is_dir() => CommandResult::err(ResultCode::NotDirectory, "not a directory"),
        Some(_) => CommandResult::ok_with_cwd(Vec::new(), target),
    }
}

pub fn cat(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    let Some(rel) = args.first() else {
        return CommandResult::err(ResultCode::InvalidArgs, "path is required");
    };
    let target = path::normalize(rel, &ctx.cwd);
    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.r {
        return CommandResult::err(ResultCode::PermissionDenied, "read access denied");
    }
    let overlay = &world.overlays[&ctx.node_id];
    let store = world.blob_store().lock();
    match overlay.read_text(world.base_image(), &store, &target) {
        Ok(text) => CommandResult::ok(text.lines().map(str::to_string).collect()),
        Err(e) => CommandResult::err(overlay_code(e), &e.to_string()),
    }
}

pub fn mkdir(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    let Some(rel) = args.iter().find(|a| !a.starts_with('-')) else {
        return CommandResult::err(ResultCode::InvalidArgs, "path is required");
    };
    let parents = args.iter().any(|a| a == "-p");
    let target = path::normalize(rel, &ctx.cwd);
    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.w {
        return CommandResult::err(ResultCode::PermissionDenied, "write access denied");
    }
    let base_image = world.base_image_arc();
    let overlay = match world.overlays.get_mut(&ctx.node_id) {
        Some(o) => o,
        None => return CommandResult::err(ResultCode::NotFound, "server not found"),
    };

    if parents {
        let mut built = String::new();
        for segment in target.split('/').filter(|s| !s.is_empty()) {
            built.push('/');
            built.push_str(segment);
            if overlay.stat(&base_image, &built).is_none() {
                if let Err(e) = overlay.add_dir(&base_image, &built) {
                    return CommandResult::err(overlay_code(e), &e.to_string());
                }
            }
        }
        return CommandResult::ok(Vec::new());
    }

    match overlay.add_dir(&base_image, &target) {
        Ok(()) => CommandResult::ok(Vec::new()),
        Err(e) => CommandResult::err(overlay_code(e), &e.to_string()),
    }
}

pub fn rm(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    let Some(rel) = args.iter().find(|a| !a.starts_with('-')) else {
        return CommandResult::err(ResultCode::InvalidArgs, "path is required");
    };
    let recursive = args.iter().any(|a| a == "-r");
    let target = path::normalize(rel, &ctx.cwd);
    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.w {
        return CommandResult::err(ResultCode::PermissionDenied, "write access denied");
    }
    let base_image = world.base_image_arc();
    let blob_store = world.blob_store_arc();
    let overlay = match world.overlays.get_mut(&ctx.node_id) {
        Some(o) => o,
        None => return CommandResult::err(ResultCode::NotFound, "server not found"),
    };
    let mut store = blob_store.lock();

    let outcome = if recursive {
        overlay.delete_subtree(&base_image, &mut store, &target)
    } else {
        overlay.delete(&base_image, &mut store, &target)
    };
    match outcome {
        Ok(()) => CommandResult::ok(Vec::new()),
        Err(e) => CommandResult::err(overlay_code(e), &e.to_string()),
    }
}

/// `cp`/`mv`: read the source, write it at the resolved destination
/// (content-addressing gives the "retain then install" semantics for
/// free), `mv` additionally deletes the source (`§4.8`).
fn copy_or_move(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String], delete_source: bool) -> CommandResult {
    if args.len() < 2 {
        return CommandResult::err(ResultCode::InvalidArgs, "source and destination are required");
    }
    let src = path::normalize(&args[0], &ctx.cwd);
    let mut dest = path::normalize(&args[1], &ctx.cwd);

    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.r || !priv_.w {
        return CommandResult::err(ResultCode::PermissionDenied, "read and write access required");
    }

    let base_image = world.base_image_arc();
    let blob_store = world.blob_store_arc();
    let overlay = match world.overlays.get_mut(&ctx.node_id) {
        Some(o) => o,
        None => return CommandResult::err(ResultCode::NotFound, "server not found"),
    };

    let (bytes, kind) = {
        let store = blob_store.lock();
        let entry = match overlay.stat(&base_image, &src) {
            Some(e) => e,
            None => return CommandResult::err(ResultCode::NotFound, "no such file"),
        };
        if entry.is_dir() {
            return CommandResult::err(ResultCode::IsDirectory, "source is a directory");
        }
        let bytes = match overlay.read_bytes(&base_image, &store, &src) {
            Ok(b) => b.to_vec(),
            Err(e) => return CommandResult::err(overlay_code(e), &e.to_string()),
        };
        (bytes, entry.file_kind.unwrap_or(FileKind::Binary))
    };

    if matches!(overlay.stat(&base_image, &dest), Some(e) if e.is_dir()) {
        dest = path::join(&dest, path::name(&src));
    }

    let mut store = blob_store.lock();
    if let Err(e) = overlay.write_file(&base_image, &mut store, &dest, &bytes, kind) {
        return CommandResult::err(overlay_code(e), &e.to_string());
    }
    if delete_source {
        if let Err(e) = overlay.delete(&base_image, &mut store, &src) {
            return CommandResult::err(overlay_code(e), &e.to_string());
        }
    }
    CommandResult::ok(Vec::new())
}

pub fn cp(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    copy_or_move(world, ctx, args, false)
}

pub fn mv(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    copy_or_move(world, ctx, args, true)
}

pub fn edit(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    let Some(rel) = args.first() else {
        return CommandResult::err(ResultCode::InvalidArgs, "path is required");
    };
    let target = path::normalize(rel, &ctx.cwd);
    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.r {
        return CommandResult::err(ResultCode::PermissionDenied, "read access denied");
    }
    let overlay = &world.overlays[&ctx.node_id];
    let store = world.blob_store().lock();
    match overlay.stat(world.base_image(), &target) {
        Some(e) if e.is_dir() => CommandResult::err(ResultCode::IsDirectory, "path is a directory"),
        Some(e) if e.file_kind.map(FileKind::is_text_like).unwrap_or(false) => {
            let text = overlay.read_text(world.base_image(), &store, &target).unwrap_or_default();
            CommandResult::ok_with_data(Transition::Editor { path: target, text, binary_hex: None })
        }
        Some(_) => {
            let bytes = overlay.read_bytes(world.base_image(), &store, &target).unwrap_or(&[]);
            let hex = bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ");
            CommandResult::ok_with_data(Transition::Editor { path: target, text: String::new(), binary_hex: Some(hex) })
        }
        None => CommandResult::ok_with_data(Transition::Editor { path: target, text: String::new(), binary_hex: None }),
    }
}

fn overlay_code(e: vt_storage::OverlayError) -> ResultCode {
    vt_world::WorldError::from(e).as_result_code()
}

#[cfg(test)]
#[path = "handlers_fs_tests.rs"]
mod tests;
