// SPDX-License-Identifier: MIT

//! Handler index: `(conditionType, privilegeKey|fileNameKey, nodeIdKey,
//! userKey) → descriptor` built once per scenario load, queried by the
//! cross-product expansion each trigger event performs (`§4.13` step 3,
//! `§4.6` step 4).

use std::collections::HashMap;

use vt_core::{ConditionType, EventPayload, HandlerDescriptor, ANY_KEY};

type Key = (ConditionType, String, String, String);

#[derive(Default)]
pub struct HandlerIndex {
    by_key: HashMap<Key, Vec<usize>>,
}

impl HandlerIndex {
    pub fn build(handlers: &[HandlerDescriptor]) -> Self {
        let mut by_key: HashMap<Key, Vec<usize>> = HashMap::new();
        for (i, h) in handlers.iter().enumerate() {
            let third = match h.condition_type {
                ConditionType::PrivilegeAcquire => &h.privilege_key,
                ConditionType::FileAcquire => &h.file_name_key,
            };
            by_key.entry((h.condition_type, h.node_id_key.clone(), h.user_key.clone(), third.clone())).or_default().push(i);
        }
        Self { by_key }
    }

    /// Candidate indices for `payload`, expanding each of (nodeId,
    /// userKey, privilege|fileName) to `[actual, "__ANY__"]` and
    /// collecting the unique union across all eight combinations.
    pub fn candidates(&self, payload: &EventPayload) -> Vec<usize> {
        let condition_type = match payload {
            EventPayload::PrivilegeAcquire { .. } => ConditionType::PrivilegeAcquire,
            EventPayload::FileAcquire { .. } => ConditionType::FileAcquire,
            EventPayload::ProcessFinished { .. } => return Vec::new(),
        };
        let node_id = payload.node_id().map(|n| n.as_str().to_string()).unwrap_or_default();
        let user_key = payload.user_key().cloned().unwrap_or_default();
        let third = match condition_type {
            ConditionType::PrivilegeAcquire => payload.privilege().unwrap_or_default().to_string(),
            ConditionType::FileAcquire => payload.file_name().unwrap_or_default().to_string(),
        };

        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for n in [node_id.as_str(), ANY_KEY] {
            for u in [user_key.as_str(), ANY_KEY] {
                for t in [third.as_str(), ANY_KEY] {
                    let key = (condition_type, n.to_string(), u.to_string(), t.to_string());
                    if let Some(indices) = self.by_key.get(&key) {
                        for &idx in indices {
                            if seen.insert(idx) {
                                out.push(idx);
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "handler_index_tests.rs"]
mod tests;
