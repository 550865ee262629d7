// SPDX-License-Identifier: MIT

//! Intrinsic modules injected into the script's global environment:
//! `term`, `fs`, `net`, `time`, `crypto`, `ssh`, `ftp` (`§4.11`).
//!
//! Each module is a `rhai::Module` of native functions closing over a
//! shared [`RunState`](crate::run_state::RunState), so none of them
//! need to borrow `WorldRuntime` for the lifetime of the script run.

use std::sync::Arc;

use parking_lot::Mutex;
use rhai::{Dynamic, Engine, EvalAltResult, Module};
use vt_core::ContentId;

use crate::error::IntrinsicErrorCode;
use crate::result::IntrinsicResult;
use crate::run_state::RunState;

fn to_dynamic(result: IntrinsicResult) -> Dynamic {
    rhai::serde::to_dynamic(&result.into_json()).unwrap_or(Dynamic::UNIT)
}

fn eval_err(message: impl Into<String>) -> Box<EvalAltResult> {
    message.into().into()
}

pub fn register_all(engine: &mut Engine, state: Arc<Mutex<RunState>>) {
    register_term(engine, state.clone());
    register_fs(engine, state.clone());
    register_net(engine, state.clone());
    register_time(engine, state.clone());
    register_crypto(engine);
    register_unavailable(engine, "ssh");
    register_unavailable(engine, "ftp");
    register_import(engine, state);
}

fn register_term(engine: &mut Engine, state: Arc<Mutex<RunState>>) {
    let mut module = Module::new();
    {
        let state = state.clone();
        module.set_native_fn("print", move |text: &str| -> Result<(), Box<EvalAltResult>> {
            state.lock().lines.push(text.to_string());
            Ok(())
        });
    }
    {
        let state = state.clone();
        module.set_native_fn("warn", move |text: &str| -> Result<(), Box<EvalAltResult>> {
            state.lock().lines.push(format!("warn: {text}"));
            Ok(())
        });
    }
    module.set_native_fn("error", move |text: &str| -> Result<(), Box<EvalAltResult>> {
        state.lock().lines.push(format!("error: {text}"));
        Ok(())
    });
    engine.register_static_module("term", module.into());
}

fn register_fs(engine: &mut Engine, state: Arc<Mutex<RunState>>) {
    let mut module = Module::new();
    {
        let state = state.clone();
        module.set_native_fn("read", move |path: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let result = match state.lock().snapshot.read_text(path) {
                Ok(text) => IntrinsicResult::ok(serde_json::json!({ "text": text })),
                Err(code) => IntrinsicResult::err(code, format!("cannot read {path}")),
            };
            Ok(to_dynamic(result))
        });
    }
    {
        let state = state.clone();
        module.set_native_fn("write", move |path: &str, text: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let mut guard = state.lock();
            if !guard.write_allowed {
                return Ok(to_dynamic(IntrinsicResult::err(IntrinsicErrorCode::PermissionDenied, "write access denied")));
            }
            guard.snapshot.write_text(path, text.to_string());
            Ok(to_dynamic(IntrinsicResult::ok(serde_json::Value::Null)))
        });
    }
    {
        let state = state.clone();
        module.set_native_fn("exists", move |path: &str| -> Result<bool, Box<EvalAltResult>> { Ok(state.lock().snapshot.exists(path)) });
    }
    {
        let state = state.clone();
        module.set_native_fn("list", move |path: &str| -> Result<rhai::Array, Box<EvalAltResult>> {
            Ok(state.lock().snapshot.list(path).into_iter().map(Dynamic::from).collect())
        });
    }
    module.set_native_fn("delete", move |path: &str| -> Result<Dynamic, Box<EvalAltResult>> {
        let mut guard = state.lock();
        if !guard.write_allowed {
            return Ok(to_dynamic(IntrinsicResult::err(IntrinsicErrorCode::PermissionDenied, "write access denied")));
        }
        guard.snapshot.delete(path);
        Ok(to_dynamic(IntrinsicResult::ok(serde_json::Value::Null)))
    });
    engine.register_static_module("fs", module.into());
}

fn register_net(engine: &mut Engine, state: Arc<Mutex<RunState>>) {
    let mut module = Module::new();
    {
        let state = state.clone();
        module.set_native_fn("known", move || -> Result<rhai::Array, Box<EvalAltResult>> {
            Ok(state
                .lock()
                .known_hosts
                .iter()
                .map(|(host, ip)| Dynamic::from(serde_json::json!({ "hostname": host, "ip": ip })))
                .collect())
        });
    }
    module.set_native_fn("scan", move |net_id: &str| -> Result<Dynamic, Box<EvalAltResult>> {
        let guard = state.lock();
        match guard.scan_neighbors.get(net_id) {
            Some(rows) => Ok(to_dynamic(IntrinsicResult::ok(serde_json::json!({ "rows": rows })))),
            None => Ok(to_dynamic(IntrinsicResult::err(IntrinsicErrorCode::NotFound, "unknown net"))),
        }
    });
    engine.register_static_module("net", module.into());
}

fn register_time(engine: &mut Engine, state: Arc<Mutex<RunState>>) {
    let mut module = Module::new();
    module.set_native_fn("now_ms", move || -> Result<i64, Box<EvalAltResult>> { Ok(state.lock().now_ms as i64) });
    engine.register_static_module("time", module.into());
}

fn register_crypto(engine: &mut Engine) {
    let mut module = Module::new();
    module.set_native_fn("sha256", |text: &str| -> Result<String, Box<EvalAltResult>> {
        Ok(ContentId::of(text.as_bytes()).as_str().to_string())
    });
    engine.register_static_module("crypto", module.into());
}

/// `ssh`/`ftp` are not reachable synchronously from a script in this
/// host: both require mutating the terminal's connection stack, which
/// only exists on the calling terminal, not inside a sandboxed run.
fn register_unavailable(engine: &mut Engine, name: &str) {
    let mut module = Module::new();
    module.set_native_fn("connect", |_host: &str, _user: &str, _passwd: &str| -> Result<Dynamic, Box<EvalAltResult>> {
        Ok(to_dynamic(IntrinsicResult::err(IntrinsicErrorCode::NotFound, "not available from a script")))
    });
    engine.register_static_module(name, module.into());
}

fn register_import(engine: &mut Engine, state: Arc<Mutex<RunState>>) {
    engine.register_fn("import", move |name: &str| -> Result<Dynamic, Box<EvalAltResult>> {
        crate::import::load(&state, name, None).map_err(|e| eval_err(e.to_string()))
    });
}

#[cfg(test)]
#[path = "intrinsics_tests.rs"]
mod tests;
