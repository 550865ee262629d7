// SPDX-License-Identifier: MIT

//! Process completion effects, applied when the scheduler (owned by
//! `vt-engine`) determines a process is due (`§4.5`, `§3 Process`).

use vt_core::{EventPayload, FileKind, NodeId, Pid, ProcessState, ProcessType, UserKey};

use crate::error::WorldError;
use crate::world::WorldRuntime;

/// Payload a scheduled process carries forward to its completion
/// effect. `Booting`/`Generic` need none; `§3 Process.processArgs` is
/// kept as plain strings for blueprint-authored processes, so
/// engine-scheduled transfers stash their payload here instead.
pub enum PendingEffect {
    FtpSend {
        dest_node_id: NodeId,
        dest_path: String,
        bytes: Vec<u8>,
        file_kind: FileKind,
        user_key: UserKey,
        file_name: String,
        remote_path: String,
        local_path: String,
    },
    FileWrite {
        node_id: NodeId,
        path: String,
        bytes: Vec<u8>,
        file_kind: FileKind,
    },
}

impl WorldRuntime {
    /// Attach a completion payload to a previously scheduled pid
    /// (`FtpSend`/`FileWrite` process types only).
    pub fn set_pending_effect(&mut self, pid: Pid, effect: PendingEffect) {
        self.pending_effects.insert(pid, effect);
    }

    /// Apply the completion effect for `pid`, transition it to
    /// `Finished`, and emit `processFinished` (`§4.5`). Called by
    /// `vt-engine`'s scheduler once `tick ≥ endAt`.
    pub fn complete_process(&mut self, pid: Pid, acquired_at_ms: u64) -> Result<(), WorldError> {
        let process_type = {
            let process = self
                .process_list
                .get(&pid)
                .ok_or_else(|| WorldError::InvalidArgs(format!("unknown pid {pid}")))?;
            process.process_type
        };

        match process_type {
            ProcessType::Booting => {
                let host_node_id = self.process_list[&pid].host_node_id.clone();
                let server = self
                    .servers
                    .get_mut(&host_node_id)
                    .ok_or_else(|| WorldError::ServerNotFound(host_node_id.clone()))?;
                crate::server_runtime::set_status(server, vt_core::NodeStatus::Online, vt_core::NodeReason::Ok)?;
            }
            ProcessType::FtpSend => {
                if let Some(PendingEffect::FtpSend {
                    dest_node_id,
                    dest_path,
                    bytes,
                    file_kind,
                    user_key,
                    file_name,
                    remote_path,
                    local_path,
                }) = self.pending_effects.remove(&pid)
                {
                    let size_bytes = bytes.len() as u64;
                    let overlay = self
                        .overlays
                        .get_mut(&dest_node_id)
                        .ok_or_else(|| WorldError::ServerNotFound(dest_node_id.clone()))?;
                    let mut store = self.blob_store.lock();
                    overlay.write_file(&self.base_image, &mut store, &dest_path, &bytes, file_kind)?;
                    let content_id = overlay
                        .overlay_entry_content_id(&dest_path)
                        .map(|id| id.as_str().to_string())
                        .unwrap_or_default();
                    drop(store);

                    let host_node_id = self.process_list[&pid].host_node_id.clone();
                    self.emit_event(EventPayload::FileAcquire {
                        from_node_id: host_node_id,
                        user_key,
                        file_name,
                        remote_path,
                        local_path,
                        size_bytes,
                        content_id,
                        transfer_method: "ftp".to_string(),
                        acquired_at_ms,
                    });
                }
            }
            ProcessType::FileWrite => {
                if let Some(PendingEffect::FileWrite { node_id, path, bytes, file_kind }) =
                    self.pending_effects.remove(&pid)
                {
                    let overlay = self
                        .overlays
                        .get_mut(&node_id)
                        .ok_or_else(|| WorldError::ServerNotFound(node_id.clone()))?;
                    let mut store = self.blob_store.lock();
                    overlay.write_file(&self.base_image, &mut store, &path, &bytes, file_kind)?;
                }
            }
            ProcessType::Generic => {}
        }

        if let Some(process) = self.process_list.get_mut(&pid) {
            // `processIds` keeps the pid: invariant 6 (`§8`) requires
            // `∪ servers.processIds = processList.keys` to hold for
            // finished processes too, not just running ones.
            process.state = ProcessState::Finished;
        }
        self.emit_event(EventPayload::ProcessFinished { pid });
        Ok(())
    }
}

#[cfg(test)]
#[path = "process_effects_tests.rs"]
mod tests;
