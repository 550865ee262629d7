// SPDX-License-Identifier: MIT

//! The context a running script executes under (`§4.11`).

use vt_core::{NodeId, UserKey};

#[derive(Debug, Clone)]
pub struct ScriptContext {
    pub node_id: NodeId,
    pub user_key: UserKey,
    pub cwd: String,
}
