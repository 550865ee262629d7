// SPDX-License-Identifier: MIT

//! Intrinsic result map and the top-level script outcome (`§6`).

use serde_json::Value;

use crate::error::IntrinsicErrorCode;

/// `{ok: 0|1, code: "OK"|"ERR_*", err?: string, …payload}` (`§6`).
#[derive(Debug, Clone, PartialEq)]
pub struct IntrinsicResult {
    pub ok: bool,
    pub code: &'static str,
    pub err: Option<String>,
    pub payload: Value,
}

impl IntrinsicResult {
    pub fn ok(payload: Value) -> Self {
        Self { ok: true, code: "OK", err: None, payload }
    }

    pub fn err(code: IntrinsicErrorCode, message: impl Into<String>) -> Self {
        Self { ok: false, code: code.as_token(), err: Some(message.into()), payload: Value::Null }
    }

    /// Flatten into the `{ok, code, err?, ...payload}` shape the spec
    /// describes, for handing back to rhai as a single `Dynamic` map.
    pub fn into_json(self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("ok".to_string(), Value::from(if self.ok { 1 } else { 0 }));
        map.insert("code".to_string(), Value::from(self.code));
        if let Some(err) = self.err {
            map.insert("err".to_string(), Value::from(err));
        }
        if let Value::Object(payload_map) = self.payload {
            map.extend(payload_map);
        }
        Value::Object(map)
    }
}

/// The top-level `execute(source, context, argv)` return value
/// (`§4.11`). Runtime errors are captured here rather than propagated
/// as a host panic.
#[derive(Debug, Clone, Default)]
pub struct ScriptOutcome {
    pub ok: bool,
    pub lines: Vec<String>,
    pub return_value: Option<Value>,
    pub error: Option<String>,
}

impl ScriptOutcome {
    pub fn failure(lines: Vec<String>, error: impl Into<String>) -> Self {
        Self { ok: false, lines, return_value: None, error: Some(error.into()) }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
