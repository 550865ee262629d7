// SPDX-License-Identifier: MIT

//! Per-server copy-on-write overlay filesystem (`§4.3 Overlay filesystem`).

use crate::base_image::BaseImage;
use crate::blob::BlobStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;
use vt_core::{path, ContentId, Entry, FileKind};

/// Files larger than this are rejected by `cat`/`read_text` (`§4.8 cat`
/// `TooLarge`); chosen generously since this is a text terminal, not a
/// general file viewer.
pub const MAX_TEXT_FILE_BYTES: u64 = 1_000_000;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OverlayError {
    #[error("not found")]
    NotFound,
    #[error("not a directory")]
    NotDirectory,
    #[error("not a file")]
    NotFile,
    #[error("is a directory")]
    IsDirectory,
    #[error("not a text file")]
    NotTextFile,
    #[error("file too large")]
    TooLarge,
    #[error("already exists")]
    AlreadyExists,
    #[error("cannot delete root")]
    RootForbidden,
}

/// Per-directory added/removed child-name bookkeeping, kept *neutral*
/// (absent entirely) whenever both sets are empty (`§3`, `§8` invariant 3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirDelta {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl DirDelta {
    fn is_neutral(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayFs {
    overlay_entries: HashMap<String, Entry>,
    tombstones: HashSet<String>,
    dir_delta: HashMap<String, DirDelta>,
}

impl OverlayFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tombstone/overlay/base merge order (`§3`, `§8` invariant 2).
    pub fn resolve(&self, base: &BaseImage, path: &str) -> Option<Entry> {
        if self.tombstones.contains(path) {
            return None;
        }
        if let Some(entry) = self.overlay_entries.get(path) {
            return Some(entry.clone());
        }
        base.resolve(path).cloned()
    }

    fn base_has_child(base: &BaseImage, parent: &str, name: &str) -> bool {
        base.list_children(parent).iter().any(|n| n == name)
    }

    fn merged_child_names(&self, base: &BaseImage, dir: &str) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = base.list_children(dir).into_iter().collect();
        if let Some(delta) = self.dir_delta.get(dir) {
            for name in &delta.added {
                names.insert(name.clone());
            }
            for name in &delta.removed {
                names.remove(name);
            }
        }
        names
    }

    /// List children, filtered by `resolve` so an overlay directory
    /// shadowing a base file is handled correctly (`§4.3`).
    pub fn list_children(&self, base: &BaseImage, dir: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .merged_child_names(base, dir)
            .into_iter()
            .filter(|name| self.resolve(base, &path::join(dir, name)).is_some())
            .collect();
        out.sort();
        out
    }

    fn record_add(&mut self, base: &BaseImage, parent: &str, name: &str) {
        let delta = self.dir_delta.entry(parent.to_string()).or_default();
        if Self::base_has_child(base, parent, name) {
            delta.removed.remove(name);
        } else {
            delta.added.insert(name.to_string());
        }
        self.prune_delta(parent);
    }

    fn record_remove(&mut self, base: &BaseImage, parent: &str, name: &str) {
        let delta = self.dir_delta.entry(parent.to_string()).or_default();
        if Self::base_has_child(base, parent, name) {
            delta.added.remove(name);
            delta.removed.insert(name.to_string());
        } else {
            delta.added.remove(name);
        }
        self.prune_delta(parent);
    }

    fn prune_delta(&mut self, parent: &str) {
        if self.dir_delta.get(parent).map(DirDelta::is_neutral).unwrap_or(false) {
            self.dir_delta.remove(parent);
        }
    }

    fn release_if_file(&self, store: &mut BlobStore, entry: &Entry) {
        if let Some(id) = &entry.content_id {
            store.release(id);
        }
    }

    pub fn add_dir(&mut self, base: &BaseImage, path: &str) -> Result<(), OverlayError> {
        if self.resolve(base, path).is_some() {
            return Err(OverlayError::AlreadyExists);
        }
        let parent = path::parent(path).ok_or(OverlayError::AlreadyExists)?;
        match self.resolve(base, &parent) {
            Some(e) if e.is_dir() => {}
            Some(_) => return Err(OverlayError::NotDirectory),
            None => return Err(OverlayError::NotFound),
        }
        self.tombstones.remove(path);
        self.overlay_entries.insert(path.to_string(), Entry::dir());
        self.record_add(base, &parent, path::name(path));
        Ok(())
    }

    pub fn write_file(
        &mut self,
        base: &BaseImage,
        store: &mut BlobStore,
        path: &str,
        bytes: &[u8],
        kind: FileKind,
    ) -> Result<(), OverlayError> {
        let parent = path::parent(path).ok_or(OverlayError::NotDirectory)?;
        match self.resolve(base, &parent) {
            Some(e) if e.is_dir() => {}
            Some(_) => return Err(OverlayError::NotDirectory),
            None => return Err(OverlayError::NotFound),
        }
        if let Some(existing) = self.resolve(base, path) {
            if existing.is_dir() {
                return Err(OverlayError::IsDirectory);
            }
            self.release_if_file(store, &existing);
        }
        let id = store.put(bytes.to_vec());
        self.tombstones.remove(path);
        self.overlay_entries
            .insert(path.to_string(), Entry::file(kind, id, bytes.len() as u64));
        self.record_add(base, &parent, path::name(path));
        Ok(())
    }

    /// Single-entry delete. A non-empty directory is rejected with
    /// `NotDirectory` (callers wanting `rm -r` use `delete_subtree`).
    pub fn delete(&mut self, base: &BaseImage, store: &mut BlobStore, path: &str) -> Result<(), OverlayError> {
        if path == "/" {
            return Err(OverlayError::RootForbidden);
        }
        let entry = self.resolve(base, path).ok_or(OverlayError::NotFound)?;
        if entry.is_dir() && !self.list_children(base, path).is_empty() {
            return Err(OverlayError::NotDirectory);
        }
        let parent = path::parent(path).ok_or(OverlayError::RootForbidden)?;
        let name = path::name(path);
        let existed_in_base = base.resolve(path).is_some();
        if let Some(overlay_entry) = self.overlay_entries.remove(path) {
            self.release_if_file(store, &overlay_entry);
        }
        if existed_in_base {
            self.tombstones.insert(path.to_string());
        }
        self.record_remove(base, &parent, name);
        self.dir_delta.remove(path);
        Ok(())
    }

    /// Recursively tombstone/erase a subtree. Forbids deleting root.
    pub fn delete_subtree(&mut self, base: &BaseImage, store: &mut BlobStore, path: &str) -> Result<(), OverlayError> {
        if path == "/" {
            return Err(OverlayError::RootForbidden);
        }
        let entry = self.resolve(base, path).ok_or(OverlayError::NotFound)?;
        if entry.is_dir() {
            for name in self.list_children(base, path) {
                self.delete_subtree(base, store, &path::join(path, &name))?;
            }
        }
        self.delete(base, store, path)
    }

    pub fn read_text(&self, base: &BaseImage, store: &BlobStore, path: &str) -> Result<String, OverlayError> {
        let entry = self.resolve(base, path).ok_or(OverlayError::NotFound)?;
        if entry.is_dir() {
            return Err(OverlayError::IsDirectory);
        }
        if !entry.file_kind.map(FileKind::is_text_like).unwrap_or(false) {
            return Err(OverlayError::NotTextFile);
        }
        if entry.size > MAX_TEXT_FILE_BYTES {
            return Err(OverlayError::TooLarge);
        }
        let id = entry.content_id.as_ref().ok_or(OverlayError::NotFound)?;
        let bytes = store.get(id).ok_or(OverlayError::NotFound)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn read_bytes<'a>(&self, base: &BaseImage, store: &'a BlobStore, path: &str) -> Result<&'a [u8], OverlayError> {
        let entry = self.resolve(base, path).ok_or(OverlayError::NotFound)?;
        if entry.is_dir() {
            return Err(OverlayError::IsDirectory);
        }
        let id = entry.content_id.as_ref().ok_or(OverlayError::NotFound)?;
        store.get(id).ok_or(OverlayError::NotFound)
    }

    pub fn stat(&self, base: &BaseImage, path: &str) -> Option<Entry> {
        self.resolve(base, path)
    }

    pub fn find(&self, base: &BaseImage, root: &str, pattern: &str) -> Vec<String> {
        // Walk the merged tree rather than the base index, so overlay-only
        // files and tombstoned base files are reflected.
        let mut out = Vec::new();
        self.find_rec(base, root, pattern, &mut out);
        out.sort();
        out
    }

    fn find_rec(&self, base: &BaseImage, dir: &str, pattern: &str, out: &mut Vec<String>) {
        for name in self.list_children(base, dir) {
            let child = path::join(dir, &name);
            if name.contains(pattern) {
                out.push(child.clone());
            }
            if let Some(entry) = self.resolve(base, &child) {
                if entry.is_dir() {
                    self.find_rec(base, &child, pattern, out);
                }
            }
        }
    }

    pub fn overlay_entry_content_id(&self, path: &str) -> Option<&ContentId> {
        self.overlay_entries.get(path).and_then(|e| e.content_id.as_ref())
    }

    pub fn is_tombstoned(&self, path: &str) -> bool {
        self.tombstones.contains(path)
    }

    pub fn dir_delta(&self, dir: &str) -> Option<&DirDelta> {
        self.dir_delta.get(dir)
    }

    /// Every content id this overlay currently references, for releasing
    /// on server teardown (`§3` overlay lifetime).
    pub fn referenced_content_ids(&self) -> Vec<ContentId> {
        self.overlay_entries
            .values()
            .filter_map(|e| e.content_id.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "overlay_tests.rs"]
mod tests;
