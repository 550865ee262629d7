// SPDX-License-Identifier: MIT

//! PATH-based program resolution (`§4.8 (P)`).

use vt_core::{path, FileKind, NodeId, ResultCode};
use vt_world::{WorldRuntime, PATH_DIRS, WORKSTATION_NODE_ID};

use crate::context::{acting_privilege, ExecutionContext};
use crate::result::CommandResult;

/// A resolved executable: which server's overlay holds it, its
/// resolved path, and how to run it.
#[derive(Debug)]
pub struct ResolvedProgram {
    pub node_id: NodeId,
    pub path: String,
    pub kind: ProgramKind,
}

#[derive(Debug)]
pub enum ProgramKind {
    Script(String),
    Hardcode(String),
}

/// Build the ordered candidate paths for `command` against `cwd`: the
/// cwd-joined form first, then each static PATH directory (`§4.8 (P)`
/// step 1).
fn candidate_paths(command: &str, cwd: &str) -> Vec<String> {
    let mut candidates = vec![path::normalize(command, cwd)];
    for dir in PATH_DIRS {
        candidates.push(format!("{dir}/{command}"));
    }
    candidates
}

/// Resolve `command` on the current server first, then on the player
/// workstation overlay (`§4.8 (P)` steps 2-4).
pub fn resolve(world: &WorldRuntime, ctx: &ExecutionContext, command: &str) -> Result<ResolvedProgram, CommandResult> {
    let priv_ = acting_privilege(world, ctx).map_err(|e| CommandResult::from_world_error(&e))?;

    let search_nodes = [ctx.node_id.clone(), NodeId::new(WORKSTATION_NODE_ID)];
    for node_id in &search_nodes {
        let Some(overlay) = world.overlays.get(node_id) else {
            continue;
        };
        for candidate in candidate_paths(command, &ctx.cwd) {
            let Some(entry) = overlay.stat(world.base_image(), &candidate) else {
                continue;
            };
            if entry.is_dir() || !entry.file_kind.map(FileKind::is_executable).unwrap_or(false) {
                continue;
            }
            if !priv_.r || !priv_.x {
                return Err(CommandResult::err(ResultCode::PermissionDenied, "execute access denied"));
            }
            let kind = match entry.file_kind {
                Some(FileKind::ExecutableScript) => {
                    let store = world.blob_store().lock();
                    match overlay.read_text(world.base_image(), &store, &candidate) {
                        Ok(text) => ProgramKind::Script(text),
                        Err(e) => return Err(CommandResult::err(vt_world::WorldError::from(e).as_result_code(), "read failed")),
                    }
                }
                Some(FileKind::ExecutableHardcode) => {
                    let store = world.blob_store().lock();
                    let payload = overlay.read_text(world.base_image(), &store, &candidate).unwrap_or_default();
                    let id = payload.trim().strip_prefix("exec:").unwrap_or(payload.trim()).to_string();
                    ProgramKind::Hardcode(id)
                }
                _ => unreachable!("filtered to executable kinds above"),
            };
            return Ok(ResolvedProgram { node_id: node_id.clone(), path: candidate, kind });
        }
    }
    Err(CommandResult::err(ResultCode::UnknownCommand, &format!("unknown command: {command}")))
}

/// Dispatch an `executableHardcode` payload id (`§4.8 (P)` step 6).
/// Unrecognized ids are `UnknownCommand`, same as an unresolved
/// command name.
pub fn dispatch_hardcode(world: &mut WorldRuntime, ctx: &ExecutionContext, id: &str, args: &[String]) -> CommandResult {
    match id {
        "noop" => CommandResult::ok(Vec::new()),
        "miniscript" => {
            let Some(path) = args.first() else {
                return CommandResult::err(ResultCode::InvalidArgs, "miniscript requires a path argument");
            };
            CommandResult::ok(vec![format!("miniscript: scheduled {path}")])
        }
        "inspect" => crate::handlers_fs::cat(world, ctx, args),
        _ => CommandResult::err(ResultCode::UnknownCommand, &format!("unknown executable: {id}")),
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
