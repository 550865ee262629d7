// SPDX-License-Identifier: MIT

//! Editor/terminal-context helpers that don't belong to any one syscall
//! handler (`§4.5`, `§4.8 edit`).

use vt_core::{path, NodeId, UserKey};

use crate::error::WorldError;
use crate::world::WorldRuntime;

/// The terminal's starting position before any `connect`: the player
/// workstation, logged in as `player`, at `/`.
pub struct TerminalContext {
    pub node_id: NodeId,
    pub user_key: UserKey,
    pub cwd: String,
}

impl WorldRuntime {
    pub fn get_default_terminal_context(&self, user_key: &str) -> TerminalContext {
        TerminalContext {
            node_id: NodeId::new(crate::config::WORKSTATION_NODE_ID),
            user_key: user_key.to_string(),
            cwd: "/".to_string(),
        }
    }

    /// `saveEditorContent`: write `text` to `path` (resolved against
    /// `cwd` if relative) on `nodeId`'s overlay as the acting user,
    /// gated on `w` (`§4.5`).
    pub fn save_editor_content(
        &mut self,
        node_id: &NodeId,
        user_key: &str,
        cwd: &str,
        path: &str,
        text: &str,
    ) -> Result<(), WorldError> {
        let server = self.servers.get(node_id).ok_or_else(|| WorldError::ServerNotFound(node_id.clone()))?;
        let user = server.users.get(user_key).ok_or_else(|| WorldError::UserNotFound(user_key.to_string()))?;
        if !user.privilege.w {
            return Err(WorldError::PermissionDenied);
        }
        let resolved = path::normalize(path, cwd);
        let overlay = self.overlays.get_mut(node_id).ok_or_else(|| WorldError::ServerNotFound(node_id.clone()))?;
        let mut store = self.blob_store.lock();
        overlay
            .write_file(&self.base_image, &mut store, &resolved, text.as_bytes(), vt_core::FileKind::Text)
            .map_err(WorldError::from)
    }
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
