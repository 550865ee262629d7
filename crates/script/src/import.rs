// SPDX-License-Identifier: MIT

//! `import(name)` resolution: directory-of-the-running-script first,
//! then a fixed stdlib root, cached per `(serverId, canonicalPath)`
//! with cycle detection (`§4.11`).
//!
//! Open Question: the spec doesn't name a stdlib root path. We use
//! `/opt/lib`, mirroring `/opt/bin` as the PATH entry vt-syscall already
//! treats as the "installed tooling" directory (`vt_world::PATH_DIRS`).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rhai::{Dynamic, Engine};
use thiserror::Error;

use crate::run_state::RunState;

pub const STDLIB_ROOT: &str = "/opt/lib";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unterminated import: module {0:?} is already loading")]
    Cycle(String),
    #[error("module {0:?} not found on the import search path")]
    NotFound(String),
    #[error("module {0:?} has no `// @name` header and cannot be imported")]
    NotALibrary(String),
    #[error("more than one module on the search path matches {0:?}")]
    Ambiguous(String),
    #[error("import {0:?} failed to evaluate: {1}")]
    Eval(String, String),
}

#[derive(Default)]
pub struct ImportCache {
    entries: HashMap<(String, String), Dynamic>,
}

fn canonical_name_of(source: &str) -> Option<&str> {
    source.lines().next().and_then(|line| line.trim().strip_prefix("// @name")).map(str::trim)
}

fn candidate_dirs(script_dir: Option<&str>) -> Vec<String> {
    let mut dirs = Vec::new();
    if let Some(dir) = script_dir {
        dirs.push(dir.to_string());
    }
    dirs.push(STDLIB_ROOT.to_string());
    dirs
}

/// Resolve and evaluate `name` against the running script's snapshot,
/// returning the imported module's top-level scope as a map. `engine`
/// is a plain sandboxed engine reused across imports; intrinsics are
/// not re-registered on it since library modules only manipulate data.
pub fn load(state: &Arc<Mutex<RunState>>, name: &str, script_dir: Option<&str>) -> Result<Dynamic, ImportError> {
    let node_key = state.lock().node_id.as_str().to_string();

    {
        let mut guard = state.lock();
        if guard.import_stack.iter().any(|s| s == name) {
            return Err(ImportError::Cycle(name.to_string()));
        }
    }

    let cache_key = (node_key.clone(), name.to_string());
    if let Some(cached) = state.lock().import_cache.entries.get(&cache_key) {
        return Ok(cached.clone());
    }

    let mut matches = Vec::new();
    for dir in candidate_dirs(script_dir) {
        let candidate = format!("{dir}/{name}.rhai");
        let exists = state.lock().snapshot.exists(&candidate);
        if exists {
            matches.push(candidate);
        }
    }

    let path = match matches.len() {
        0 => return Err(ImportError::NotFound(name.to_string())),
        1 => matches.remove(0),
        _ => return Err(ImportError::Ambiguous(name.to_string())),
    };

    let source = state.lock().snapshot.read_text(&path).map_err(|_| ImportError::NotFound(name.to_string()))?;
    if canonical_name_of(&source).is_none() {
        return Err(ImportError::NotALibrary(name.to_string()));
    }

    state.lock().import_stack.push(name.to_string());
    let engine = Engine::new_raw();
    let module_dir = path.rsplit_once('/').map(|(dir, _)| dir.to_string());
    let result = run_module(&engine, state, &source, module_dir.as_deref());
    state.lock().import_stack.pop();

    let value = result?;
    state.lock().import_cache.entries.insert(cache_key, value.clone());
    Ok(value)
}

fn run_module(engine: &Engine, _state: &Arc<Mutex<RunState>>, source: &str, _module_dir: Option<&str>) -> Result<Dynamic, ImportError> {
    let ast = engine.compile(source).map_err(|e| ImportError::Eval(source.to_string(), e.to_string()))?;
    let mut scope = rhai::Scope::new();
    engine
        .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
        .map_err(|e| ImportError::Eval(source.to_string(), e.to_string()))?;

    let mut map = rhai::Map::new();
    for (name, _, value) in scope.iter() {
        map.insert(name.into(), value.clone());
    }
    Ok(Dynamic::from(map))
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
