// SPDX-License-Identifier: MIT

//! Deduplicated, content-addressed blob store (`§4.1 Blob store`).

use std::collections::HashMap;
use vt_core::ContentId;

struct BlobRecord {
    bytes: Vec<u8>,
    refcount: u64,
    pinned: bool,
}

/// Single-threaded content store. Identical payloads always share a
/// single record (`§3` "identical payloads always share storage").
#[derive(Default)]
pub struct BlobStore {
    records: HashMap<ContentId, BlobRecord>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes`, incrementing its refcount. Returns the content id.
    pub fn put(&mut self, bytes: impl Into<Vec<u8>>) -> ContentId {
        let bytes = bytes.into();
        let id = ContentId::of(&bytes);
        let record = self.records.entry(id.clone()).or_insert_with(|| BlobRecord {
            bytes,
            refcount: 0,
            pinned: false,
        });
        if !record.pinned {
            record.refcount += 1;
        }
        id
    }

    /// Store `bytes` as pinned: never reclaimed regardless of refcount.
    pub fn put_pinned(&mut self, bytes: impl Into<Vec<u8>>) -> ContentId {
        let bytes = bytes.into();
        let id = ContentId::of(&bytes);
        let record = self.records.entry(id.clone()).or_insert_with(|| BlobRecord {
            bytes,
            refcount: 0,
            pinned: false,
        });
        record.pinned = true;
        id
    }

    /// Increment the refcount of an existing id. Returns `false` for an
    /// unknown id (never panics, `§4.1`).
    pub fn retain(&mut self, id: &ContentId) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                if !record.pinned {
                    record.refcount += 1;
                }
                true
            }
            None => false,
        }
    }

    /// Decrement the refcount, reclaiming the payload once it hits zero.
    /// Pinned entries and unknown ids are no-ops returning `false`/`true`
    /// respectively per `§4.1`.
    pub fn release(&mut self, id: &ContentId) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            return false;
        };
        if record.pinned {
            return false;
        }
        if record.refcount > 0 {
            record.refcount -= 1;
        }
        if record.refcount == 0 {
            self.records.remove(id);
        }
        true
    }

    pub fn get(&self, id: &ContentId) -> Option<&[u8]> {
        self.records.get(id).map(|r| r.bytes.as_slice())
    }

    pub fn is_pinned(&self, id: &ContentId) -> bool {
        self.records.get(id).map(|r| r.pinned).unwrap_or(false)
    }

    pub fn refcount(&self, id: &ContentId) -> u64 {
        self.records.get(id).map(|r| r.refcount).unwrap_or(0)
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.records.contains_key(id)
    }

    /// Snapshot every blob currently referenced by `ids` (typically the
    /// union of all overlay content ids in the world), for inclusion in a
    /// save capture (`§6 Save snapshot`). Base-image pinned blobs do not
    /// need to round-trip: they are re-derived on blueprint reload.
    pub fn capture(&self, ids: impl IntoIterator<Item = ContentId>) -> Vec<BlobRecordSnapshot> {
        ids.into_iter()
            .filter_map(|id| {
                self.records.get(&id).map(|r| BlobRecordSnapshot {
                    id: id.clone(),
                    bytes: r.bytes.clone(),
                    refcount: r.refcount,
                    pinned: r.pinned,
                })
            })
            .collect()
    }

    /// Restore blobs captured by [`BlobStore::capture`]. Existing records
    /// with the same id are overwritten (restore always follows a fresh
    /// blueprint rebuild, so there is nothing to merge with).
    pub fn restore(&mut self, records: Vec<BlobRecordSnapshot>) {
        for r in records {
            self.records.insert(
                r.id,
                BlobRecord {
                    bytes: r.bytes,
                    refcount: r.refcount,
                    pinned: r.pinned,
                },
            );
        }
    }
}

/// Serializable projection of a single blob record for save/restore.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BlobRecordSnapshot {
    pub id: ContentId,
    pub bytes: Vec<u8>,
    pub refcount: u64,
    pub pinned: bool,
}

#[cfg(test)]
#[path = "blob_tests.rs"]
mod tests;
