// SPDX-License-Identifier: MIT

//! Per-run state shared by all intrinsics during a single script
//! execution (`§4.11`). Built once before `Engine::eval_ast_with_scope`
//! and torn down into a [`crate::result::ScriptOutcome`] afterward.

use std::collections::HashMap;

use vt_core::NodeId;

use crate::import::ImportCache;
use crate::snapshot::FsSnapshot;

pub struct RunState {
    pub snapshot: FsSnapshot,
    pub write_allowed: bool,
    pub lines: Vec<String>,
    pub now_ms: u64,
    pub known_hosts: Vec<(String, String)>,
    pub scan_neighbors: HashMap<String, Vec<(String, String)>>,
    pub node_id: NodeId,
    pub import_cache: ImportCache,
    pub import_stack: Vec<String>,
}
