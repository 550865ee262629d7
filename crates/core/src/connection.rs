// SPDX-License-Identifier: MIT

//! Terminal connection stack frames (`§3 Connection frame`, `§4.9`).

use crate::id::{NodeId, SessionId, UserKey};
use serde::{Deserialize, Serialize};

/// One pushed `connect` hop. The stack top determines the terminal's
/// current target; `disconnect` pops and restores the fields here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionFrame {
    pub prev_node_id: NodeId,
    pub prev_user_key: UserKey,
    pub prev_cwd: String,
    pub prev_prompt_user: String,
    pub prev_prompt_host: String,
    pub session_node_id: NodeId,
    pub session_id: SessionId,
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
