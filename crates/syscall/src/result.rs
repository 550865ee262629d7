// SPDX-License-Identifier: MIT

//! Result envelope (`§4.7`).

use vt_core::ResultCode;

/// Editor/connection transitions consumed by the UI layer (`§4.7 data`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Editor {
        path: String,
        text: String,
        binary_hex: Option<String>,
    },
    Connection {
        next_node_id: String,
        next_user_key: String,
        next_cwd: String,
        motd_lines: Vec<String>,
    },
    Disconnection {
        next_node_id: String,
        next_user_key: String,
        next_cwd: String,
        next_prompt_user: String,
        next_prompt_host: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub ok: bool,
    pub code: ResultCode,
    pub lines: Vec<String>,
    pub next_cwd: Option<String>,
    pub data: Option<Transition>,
}

impl CommandResult {
    pub fn ok(lines: Vec<String>) -> Self {
        Self { ok: true, code: ResultCode::None, lines, next_cwd: None, data: None }
    }

    pub fn ok_with_cwd(lines: Vec<String>, next_cwd: String) -> Self {
        Self { ok: true, code: ResultCode::None, lines, next_cwd: Some(next_cwd), data: None }
    }

    pub fn ok_with_data(data: Transition) -> Self {
        Self { ok: true, code: ResultCode::None, lines: Vec::new(), next_cwd: None, data: Some(data) }
    }

    /// Failures emit a single `error: <msg>` line by convention (`§4.7`).
    pub fn err(code: ResultCode, msg: impl Into<String>) -> Self {
        Self { ok: false, code, lines: vec![format!("error: {}", msg.into())], next_cwd: None, data: None }
    }

    pub fn from_world_error(err: &vt_world::WorldError) -> Self {
        Self::err(err.as_result_code(), err.to_string())
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
