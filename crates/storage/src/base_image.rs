// SPDX-License-Identifier: MIT

//! Read-only shared file tree (`§4.2 Base image`).

use crate::blob::BlobStore;
use std::collections::{BTreeSet, HashMap};
use vt_core::{path, Entry, EntryKind, FileKind};

/// Immutable-after-build mapping path → entry, plus a directory index of
/// child names for fast listing.
#[derive(Default)]
pub struct BaseImage {
    entries: HashMap<String, Entry>,
    children: HashMap<String, BTreeSet<String>>,
}

impl BaseImage {
    pub fn new() -> Self {
        let mut image = Self::default();
        image.entries.insert("/".to_string(), Entry::dir());
        image
    }

    /// Materialize `path` and all missing ancestor directories.
    pub fn add_dir(&mut self, path: &str) {
        let norm = path::normalize(path, "/");
        self.materialize_ancestors(&norm);
        self.entries.entry(norm).or_insert_with(Entry::dir);
    }

    fn materialize_ancestors(&mut self, path: &str) {
        let mut current = path.to_string();
        while let Some(parent) = path::parent(&current) {
            self.entries.entry(parent.clone()).or_insert_with(Entry::dir);
            let name = path::name(&current);
            self.children.entry(parent.clone()).or_default().insert(name.to_string());
            current = parent;
        }
    }

    /// Add a file. Pinned by default: base image payloads are shared and
    /// outlive any single overlay (`§4.2`).
    pub fn add_file(&mut self, store: &mut BlobStore, path: &str, bytes: &[u8], file_kind: FileKind, pin: bool) {
        let norm = path::normalize(path, "/");
        self.materialize_ancestors(&norm);
        let id = if pin {
            store.put_pinned(bytes.to_vec())
        } else {
            store.put(bytes.to_vec())
        };
        self.entries.insert(norm, Entry::file(file_kind, id, bytes.len() as u64));
    }

    pub fn resolve(&self, path: &str) -> Option<&Entry> {
        self.entries.get(path)
    }

    pub fn list_children(&self, dir: &str) -> Vec<String> {
        self.children
            .get(dir)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Depth-first search under `root` for paths whose final component
    /// contains `substring` (`§4.2 find`).
    pub fn find(&self, root: &str, substring: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .entries
            .keys()
            .filter(|p| p.starts_with(root) && path::name(p).contains(substring))
            .cloned()
            .collect();
        out.sort();
        out
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.entries.get(path).map(|e| e.kind == EntryKind::Dir).unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "base_image_tests.rs"]
mod tests;
