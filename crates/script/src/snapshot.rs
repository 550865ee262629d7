// SPDX-License-Identifier: MIT

//! A point-in-time, read/write-buffered view of one server's overlay,
//! handed to intrinsics so they never need to borrow `WorldRuntime`
//! across the lifetime of a script run (`§4.11`, `§5` single-threaded
//! cooperative model).

use std::collections::HashMap;

use vt_core::FileKind;
use vt_world::WorldRuntime;

use crate::error::IntrinsicErrorCode;

#[derive(Debug, Clone)]
pub enum SnapshotEntry {
    Dir,
    TextFile(String),
    OpaqueFile { kind: FileKind, size: u64 },
}

/// Effects a script performs, buffered in call order and applied to the
/// real world only after the run completes (`PendingEffect` in
/// `vt-world` uses the same deferred-apply idea for process
/// completions).
#[derive(Debug, Clone)]
pub enum ScriptEffect {
    Write { path: String, text: String },
    Delete { path: String },
    SetFlag { key: String, value: serde_json::Value },
}

pub struct FsSnapshot {
    node_id: vt_core::NodeId,
    entries: HashMap<String, SnapshotEntry>,
    pub effects: Vec<ScriptEffect>,
}

impl FsSnapshot {
    /// Walk the merged overlay/base tree for `node_id` and capture
    /// every reachable entry.
    pub fn capture(world: &WorldRuntime, node_id: &vt_core::NodeId) -> Option<Self> {
        let overlay = world.overlays.get(node_id)?;
        let store = world.blob_store().lock();
        let mut entries = HashMap::new();
        entries.insert("/".to_string(), SnapshotEntry::Dir);
        for path in overlay.find(world.base_image(), "/", "") {
            let Some(entry) = overlay.stat(world.base_image(), &path) else { continue };
            if entry.is_dir() {
                entries.insert(path, SnapshotEntry::Dir);
                continue;
            }
            let kind = entry.file_kind.unwrap_or(FileKind::Binary);
            if kind.is_text_like() {
                if let Ok(text) = overlay.read_text(world.base_image(), &store, &path) {
                    entries.insert(path, SnapshotEntry::TextFile(text));
                    continue;
                }
            }
            entries.insert(path, SnapshotEntry::OpaqueFile { kind, size: entry.size });
        }
        Some(Self { node_id: node_id.clone(), entries, effects: Vec::new() })
    }

    pub fn read_text(&self, path: &str) -> Result<String, IntrinsicErrorCode> {
        match self.entries.get(path) {
            Some(SnapshotEntry::TextFile(text)) => Ok(text.clone()),
            Some(SnapshotEntry::Dir) => Err(IntrinsicErrorCode::IsDirectory),
            Some(SnapshotEntry::OpaqueFile { .. }) => Err(IntrinsicErrorCode::NotTextFile),
            None => Err(IntrinsicErrorCode::NotFound),
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn list(&self, dir: &str) -> Vec<String> {
        let prefix = if dir == "/" { "/".to_string() } else { format!("{dir}/") };
        let mut names: Vec<String> = self
            .entries
            .keys()
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    /// Record a write and make it immediately visible to later reads in
    /// the same run.
    pub fn write_text(&mut self, path: &str, text: String) {
        self.entries.insert(path.to_string(), SnapshotEntry::TextFile(text.clone()));
        self.effects.push(ScriptEffect::Write { path: path.to_string(), text });
    }

    pub fn delete(&mut self, path: &str) {
        self.entries.remove(path);
        self.effects.push(ScriptEffect::Delete { path: path.to_string() });
    }

    pub fn set_flag(&mut self, key: &str, value: serde_json::Value) {
        self.effects.push(ScriptEffect::SetFlag { key: key.to_string(), value });
    }

    pub fn node_id(&self) -> &vt_core::NodeId {
        &self.node_id
    }
}

/// Apply buffered effects to the real world after the run completes.
pub fn apply_effects(world: &mut WorldRuntime, node_id: &vt_core::NodeId, effects: Vec<ScriptEffect>) -> Result<(), vt_world::WorldError> {
    let base_image = world.base_image_arc();
    let blob_store = world.blob_store_arc();
    for effect in effects {
        match effect {
            ScriptEffect::Write { path, text } => {
                let overlay = world
                    .overlays
                    .get_mut(node_id)
                    .ok_or_else(|| vt_world::WorldError::ServerNotFound(node_id.clone()))?;
                let mut store = blob_store.lock();
                overlay.write_file(&base_image, &mut store, &path, text.as_bytes(), FileKind::Text)?;
            }
            ScriptEffect::Delete { path } => {
                let overlay = world
                    .overlays
                    .get_mut(node_id)
                    .ok_or_else(|| vt_world::WorldError::ServerNotFound(node_id.clone()))?;
                let mut store = blob_store.lock();
                overlay.delete(&base_image, &mut store, &path)?;
            }
            ScriptEffect::SetFlag { key, value } => {
                world.scenario_flags.insert(key, value);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
