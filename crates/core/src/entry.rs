// SPDX-License-Identifier: MIT

//! Filesystem entry model shared by the base image and server overlays
//! (`§3 Entry`).

use crate::content::ContentId;
use serde::{Deserialize, Serialize};

/// The broad kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
}

/// The kind of a file's content, used by syscall handlers and program
/// resolution (`§4.7`, `§4.8`) to decide how to treat a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Text,
    Binary,
    Image,
    ExecutableScript,
    ExecutableHardcode,
}

impl FileKind {
    /// Whether this kind is executable through PATH resolution (`§4.8 (P)`).
    pub fn is_executable(self) -> bool {
        matches!(self, FileKind::ExecutableScript | FileKind::ExecutableHardcode)
    }

    /// Whether `cat`/`edit` should treat this as plain UTF-8 text.
    pub fn is_text_like(self) -> bool {
        matches!(self, FileKind::Text | FileKind::ExecutableScript)
    }
}

/// A single filesystem entry: either a directory (no content) or a file
/// backed by a blob store content id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_kind: Option<FileKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
    pub size: u64,
}

impl Entry {
    pub fn dir() -> Self {
        Self {
            kind: EntryKind::Dir,
            file_kind: None,
            content_id: None,
            size: 0,
        }
    }

    pub fn file(file_kind: FileKind, content_id: ContentId, size: u64) -> Self {
        Self {
            kind: EntryKind::File,
            file_kind: Some(file_kind),
            content_id: Some(content_id),
            size,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
