// SPDX-License-Identifier: MIT

//! Network built-in handlers: `known`, `scan`, `connect`, `disconnect`,
//! `ftp` (`§4.8`-`§4.10`).

use vt_core::{path, FileKind, NetId, NodeId, ResultCode, UserKey};
use vt_world::{ConnectRequest, WorldRuntime};

use crate::context::{acting_privilege, ExecutionContext};
use crate::result::{CommandResult, Transition};

pub fn known(world: &mut WorldRuntime, _ctx: &ExecutionContext, _args: &[String]) -> CommandResult {
    let rows = world.known();
    CommandResult::ok(rows.into_iter().map(|r| format!("{} {}", r.hostname, r.ip)).collect())
}

pub fn scan(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String]) -> CommandResult {
    let priv_ = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !priv_.x {
        return CommandResult::err(ResultCode::PermissionDenied, "execute access denied");
    }
    let filter = args.first().map(|s| NetId::new(s.as_str()));
    match world.scan(&ctx.node_id, filter.as_ref()) {
        Ok(rows) if rows.is_empty() => CommandResult::ok(vec!["no neighbors".to_string()]),
        Ok(rows) => CommandResult::ok(rows.into_iter().map(|r| format!("{} {}", r.net_id, r.ip)).collect()),
        Err(e) => CommandResult::from_world_error(&e),
    }
}

/// `connect [-p port] <host|ip> <user> <passwd>` (`§4.8`, `§4.9`).
pub fn connect(world: &mut WorldRuntime, ctx: &ExecutionContext, args: &[String], now_ms: u64) -> CommandResult {
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
    let port = args
        .iter()
        .position(|a| a == "-p")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u16>().ok());

    let [host_or_ip, user, passwd] = positional.as_slice() else {
        return CommandResult::err(ResultCode::InvalidArgs, "usage: connect [-p port] <host|ip> <user> <passwd>");
    };

    let req = ConnectRequest {
        terminal_session_id: ctx.terminal_session_id.clone(),
        source_node_id: ctx.node_id.clone(),
        prev_user_key: ctx.user_key.clone(),
        prev_cwd: ctx.cwd.clone(),
        prev_prompt_user: ctx.user_key.clone(),
        prev_prompt_host: ctx.node_id.as_str().to_string(),
        host_or_ip: (*host_or_ip).clone(),
        port,
        target_user_key: (*user).clone(),
        passwd_attempt: (*passwd).clone(),
        now_ms,
    };

    match world.connect(req) {
        Ok(outcome) => CommandResult {
            ok: true,
            code: ResultCode::None,
            lines: outcome.motd_lines.clone(),
            next_cwd: Some(outcome.next_cwd.clone()),
            data: Some(Transition::Connection {
                next_node_id: outcome.next_node_id.as_str().to_string(),
                next_user_key: outcome.next_user_key,
                next_cwd: outcome.next_cwd,
                motd_lines: outcome.motd_lines,
            }),
        },
        Err(e) => CommandResult::from_world_error(&e),
    }
}

pub fn disconnect(world: &mut WorldRuntime, ctx: &ExecutionContext, _args: &[String]) -> CommandResult {
    match world.disconnect(&ctx.terminal_session_id) {
        Ok(outcome) => CommandResult {
            ok: true,
            code: ResultCode::None,
            lines: Vec::new(),
            next_cwd: Some(outcome.next_cwd.clone()),
            data: Some(Transition::Disconnection {
                next_node_id: outcome.next_node_id.as_str().to_string(),
                next_user_key: outcome.next_user_key,
                next_cwd: outcome.next_cwd,
                next_prompt_user: outcome.next_prompt_user,
                next_prompt_host: outcome.next_prompt_host,
            }),
        },
        Err(e) => CommandResult::from_world_error(&e),
    }
}

const FTP_PORT: u16 = 21;

/// `ftp <get|put> [-p port] <pathA> [pathB]` (`§4.10`). No host argument:
/// `remote_node_id`/`remote_user_key` are the caller's current
/// connection target and its authenticated session user, resolved by
/// the facade from the connection stack (`§4.9`) rather than parsed out
/// of `args`. This syscall models the transfer as instantaneous;
/// `vt-engine` is free to wrap it in a scheduled `FtpSend`/`FileWrite`
/// process for gameplay pacing, but the handler itself performs the
/// overlay write directly.
pub fn ftp(
    world: &mut WorldRuntime,
    ctx: &ExecutionContext,
    args: &[String],
    remote_node_id: &NodeId,
    remote_user_key: &UserKey,
    acquired_at_ms: u64,
) -> CommandResult {
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
    let Some(direction) = positional.first() else {
        return CommandResult::err(ResultCode::InvalidArgs, "usage: ftp <get|put> [-p port] <pathA> [pathB]");
    };
    let Some(path_a) = positional.get(1) else {
        return CommandResult::err(ResultCode::InvalidArgs, "source path is required");
    };
    let path_b = positional.get(2).map(|s| s.as_str());

    let port = args
        .iter()
        .position(|a| a == "-p")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(FTP_PORT);

    let remote = match world.servers.get(remote_node_id) {
        Some(s) => s,
        None => return CommandResult::err(ResultCode::NotFound, "remote server not found"),
    };
    if !matches!(remote.ports.get(&port), Some(p) if p.port_type == vt_core::PortType::Ftp) {
        return CommandResult::err(ResultCode::PortClosed, "ftp port closed");
    }

    match direction.as_str() {
        "get" => ftp_get(world, ctx, remote_node_id, remote_user_key, path_a, path_b, acquired_at_ms),
        "put" => ftp_put(world, ctx, remote_node_id, remote_user_key, path_a, path_b),
        _ => CommandResult::err(ResultCode::InvalidArgs, "direction must be get or put"),
    }
}

fn resolve_dest(world: &WorldRuntime, node_id: &NodeId, dest: Option<&str>, src_cwd: &str, src_path: &str) -> String {
    match dest {
        Some(d) => {
            let joined = path::normalize(d, src_cwd);
            let overlay = &world.overlays[node_id];
            if matches!(overlay.stat(world.base_image(), &joined), Some(e) if e.is_dir()) {
                path::join(&joined, path::name(src_path))
            } else {
                joined
            }
        }
        None => path::join(src_cwd, path::name(src_path)),
    }
}

#[allow(clippy::too_many_arguments)]
fn ftp_get(
    world: &mut WorldRuntime,
    ctx: &ExecutionContext,
    remote_node_id: &NodeId,
    remote_user_key: &UserKey,
    remote_rel: &str,
    local_dest: Option<&str>,
    acquired_at_ms: u64,
) -> CommandResult {
    let remote_path = path::normalize(remote_rel, "/");
    let Some(remote_user) = world.servers.get(remote_node_id).and_then(|s| s.users.get(remote_user_key)) else {
        return CommandResult::err(ResultCode::NotFound, "remote user not found");
    };
    if !remote_user.privilege.r {
        return CommandResult::err(ResultCode::PermissionDenied, "remote read access denied");
    }
    let local_priv = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !local_priv.w {
        return CommandResult::err(ResultCode::PermissionDenied, "local write access denied");
    }

    let base_image = world.base_image_arc();
    let (bytes, kind) = {
        let remote_overlay = &world.overlays[remote_node_id];
        let store = world.blob_store().lock();
        let entry = match remote_overlay.stat(&base_image, &remote_path) {
            Some(e) if !e.is_dir() => e,
            Some(_) => return CommandResult::err(ResultCode::IsDirectory, "source is a directory"),
            None => return CommandResult::err(ResultCode::NotFound, "no such remote file"),
        };
        let bytes = match remote_overlay.read_bytes(&base_image, &store, &remote_path) {
            Ok(b) => b.to_vec(),
            Err(e) => return CommandResult::err(vt_world::WorldError::from(e).as_result_code(), "read failed"),
        };
        (bytes, entry.file_kind.unwrap_or(FileKind::Binary))
    };

    let local_dest_path = resolve_dest(world, &ctx.node_id, local_dest, &ctx.cwd, &remote_path);
    let blob_store = world.blob_store_arc();
    let local_overlay = match world.overlays.get_mut(&ctx.node_id) {
        Some(o) => o,
        None => return CommandResult::err(ResultCode::NotFound, "local server not found"),
    };
    let mut store = blob_store.lock();
    if let Err(e) = local_overlay.write_file(&base_image, &mut store, &local_dest_path, &bytes, kind) {
        return CommandResult::err(vt_world::WorldError::from(e).as_result_code(), "write failed");
    }
    let content_id = local_overlay.overlay_entry_content_id(&local_dest_path).map(|id| id.as_str().to_string()).unwrap_or_default();
    drop(store);

    world.emit_event(vt_core::EventPayload::FileAcquire {
        from_node_id: remote_node_id.clone(),
        user_key: ctx.user_key.clone(),
        file_name: path::name(&remote_path).to_string(),
        remote_path: remote_path.clone(),
        local_path: local_dest_path,
        size_bytes: bytes.len() as u64,
        content_id,
        transfer_method: "ftp".to_string(),
        acquired_at_ms,
    });

    CommandResult::ok(Vec::new())
}

/// `ftp put`: the mirror direction. Does **not** emit `fileAcquire` (`§4.10`).
fn ftp_put(world: &mut WorldRuntime, ctx: &ExecutionContext, remote_node_id: &NodeId, remote_user_key: &UserKey, local_rel: &str, remote_dest: Option<&str>) -> CommandResult {
    let local_path = path::normalize(local_rel, &ctx.cwd);
    let local_priv = match acting_privilege(world, ctx) {
        Ok(p) => p,
        Err(e) => return CommandResult::from_world_error(&e),
    };
    if !local_priv.r {
        return CommandResult::err(ResultCode::PermissionDenied, "local read access denied");
    }
    let Some(remote_user) = world.servers.get(remote_node_id).and_then(|s| s.users.get(remote_user_key)) else {
        return CommandResult::err(ResultCode::NotFound, "remote user not found");
    };
    if !remote_user.privilege.w {
        return CommandResult::err(ResultCode::PermissionDenied, "remote write access denied");
    }

    let base_image = world.base_image_arc();
    let (bytes, kind) = {
        let local_overlay = &world.overlays[&ctx.node_id];
        let store = world.blob_store().lock();
        let entry = match local_overlay.stat(&base_image, &local_path) {
            Some(e) if !e.is_dir() => e,
            Some(_) => return CommandResult::err(ResultCode::IsDirectory, "source is a directory"),
            None => return CommandResult::err(ResultCode::NotFound, "no such local file"),
        };
        let bytes = match local_overlay.read_bytes(&base_image, &store, &local_path) {
            Ok(b) => b.to_vec(),
            Err(e) => return CommandResult::err(vt_world::WorldError::from(e).as_result_code(), "read failed"),
        };
        (bytes, entry.file_kind.unwrap_or(FileKind::Binary))
    };

    let remote_dest_path = resolve_dest(world, remote_node_id, remote_dest, "/", &local_path);
    let blob_store = world.blob_store_arc();
    let remote_overlay = match world.overlays.get_mut(remote_node_id) {
        Some(o) => o,
        None => return CommandResult::err(ResultCode::NotFound, "remote server not found"),
    };
    let mut store = blob_store.lock();
    if let Err(e) = remote_overlay.write_file(&base_image, &mut store, &remote_dest_path, &bytes, kind) {
        return CommandResult::err(vt_world::WorldError::from(e).as_result_code(), "write failed");
    }

    CommandResult::ok(Vec::new())
}

#[cfg(test)]
#[path = "handlers_net_tests.rs"]
mod tests;
