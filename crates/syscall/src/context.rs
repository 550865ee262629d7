// SPDX-License-Identifier: MIT

//! Execution context construction (`§4.7`).

use vt_core::{NodeId, Privilege, SessionId, UserKey};
use vt_world::{WorldError, WorldRuntime};

/// Everything a handler needs: the acting user's current position.
/// `cwd`/`node_id` reflect the top of the connection stack when the
/// terminal is mid-`connect`; the caller (facade) resolves which one
/// applies before building this.
pub struct ExecutionContext {
    pub node_id: NodeId,
    pub user_key: UserKey,
    pub cwd: String,
    pub terminal_session_id: SessionId,
}

/// Build a context, failing with `NotFound` (server/user/cwd) or
/// `InvalidArgs` (empty required field) or `NotDirectory` (cwd is a
/// file) (`§4.7`).
pub fn build_context(
    world: &WorldRuntime,
    node_id: NodeId,
    user_key: UserKey,
    cwd: String,
    terminal_session_id: SessionId,
) -> Result<ExecutionContext, WorldError> {
    if user_key.is_empty() || cwd.is_empty() {
        return Err(WorldError::InvalidArgs("user and cwd are required".to_string()));
    }
    let server = world.servers.get(&node_id).ok_or_else(|| WorldError::ServerNotFound(node_id.clone()))?;
    if !server.users.contains_key(&user_key) {
        return Err(WorldError::UserNotFound(user_key));
    }
    let overlay = world.overlays.get(&node_id).ok_or_else(|| WorldError::ServerNotFound(node_id.clone()))?;
    match overlay.stat(world.base_image(), &cwd) {
        Some(e) if e.is_dir() => {}
        Some(_) => return Err(WorldError::Overlay(vt_storage::OverlayError::NotDirectory)),
        None => return Err(WorldError::Overlay(vt_storage::OverlayError::NotFound)),
    }
    Ok(ExecutionContext { node_id, user_key, cwd, terminal_session_id })
}

/// Look up the acting user's privilege on the current target server.
pub fn acting_privilege(world: &WorldRuntime, ctx: &ExecutionContext) -> Result<Privilege, WorldError> {
    world
        .servers
        .get(&ctx.node_id)
        .and_then(|s| s.users.get(&ctx.user_key))
        .map(|u| u.privilege)
        .ok_or_else(|| WorldError::UserNotFound(ctx.user_key.clone()))
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
