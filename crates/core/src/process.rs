// SPDX-License-Identifier: MIT

//! Process model and lifecycle (`§3 Process`).

use crate::id::{NodeId, UserKey};
use serde::{Deserialize, Serialize};

pub type Pid = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Running,
    Finished,
    Canceled,
}

/// Determines which completion effect `vt-world` applies when the
/// scheduler pops a process (`§4.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    Generic,
    Booting,
    FtpSend,
    FileWrite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub pid: Pid,
    pub name: String,
    pub host_node_id: NodeId,
    pub user_key: UserKey,
    pub state: ProcessState,
    pub path: String,
    pub process_type: ProcessType,
    pub process_args: Vec<String>,
    pub end_at_ms: u64,
}

impl Process {
    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
