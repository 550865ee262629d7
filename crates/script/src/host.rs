// SPDX-License-Identifier: MIT

//! The embedded script host: owns the `rhai::Engine`, the import
//! cache, and the run-to-completion entry point scripts are invoked
//! through (`§4.11`).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rhai::{Dynamic, Engine};
use vt_core::NodeId;
use vt_world::WorldRuntime;

use crate::context::ScriptContext;
use crate::import::ImportCache;
use crate::result::ScriptOutcome;
use crate::run_state::RunState;
use crate::snapshot::FsSnapshot;

/// Per-call-site wall clock budget for a single guard evaluation
/// (`§4.11`/`§4.13`: 16.6ms per guard call, 50ms per tick overall).
pub const GUARD_BUDGET_MS: u64 = 17;

/// Per-script wall clock budget for a `run`/`tryStartTerminalProgram`
/// invocation.
pub const SCRIPT_QUANTUM_MS: u64 = 5;

pub struct ScriptHost {
    import_caches: HashMap<NodeId, ImportCache>,
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost {
    pub fn new() -> Self {
        Self { import_caches: HashMap::new() }
    }

    fn take_cache(&mut self, node_id: &NodeId) -> ImportCache {
        self.import_caches.remove(node_id).unwrap_or_default()
    }

    /// Run `source` to completion against `node_id`'s overlay,
    /// committing any writes the script performed. This is a
    /// synchronous, run-to-completion contract: the cooperative
    /// quantum slicing described in `§4.11` belongs to vt-engine's
    /// scheduler, which interleaves multiple in-flight scripts across
    /// ticks; this entry point is what each slice ultimately calls.
    pub fn execute(&mut self, world: &mut WorldRuntime, ctx: &ScriptContext, source: &str, argv: &[String], now_ms: u64) -> ScriptOutcome {
        let Some(snapshot) = FsSnapshot::capture(world, &ctx.node_id) else {
            return ScriptOutcome::failure(Vec::new(), "no such server");
        };

        let known_hosts = world.known().into_iter().map(|r| (r.hostname, r.ip)).collect();
        let write_allowed = world
            .servers
            .get(&ctx.node_id)
            .and_then(|s| s.users.get(&ctx.user_key))
            .map(|u| u.privilege.w)
            .unwrap_or(false);

        let state = Arc::new(Mutex::new(RunState {
            snapshot,
            write_allowed,
            lines: Vec::new(),
            now_ms,
            known_hosts,
            scan_neighbors: HashMap::new(),
            node_id: ctx.node_id.clone(),
            import_cache: self.take_cache(&ctx.node_id),
            import_stack: Vec::new(),
        }));

        let mut engine = Engine::new();
        crate::intrinsics::register_all(&mut engine, state.clone());

        let args: rhai::Array = argv.iter().map(|a| Dynamic::from(a.clone())).collect();
        let mut scope = rhai::Scope::new();
        scope.push("args", args);

        let eval_result: Result<Dynamic, String> = engine
            .compile(source)
            .map_err(|e| e.to_string())
            .and_then(|ast| engine.eval_ast_with_scope::<Dynamic>(&mut scope, &ast).map_err(|e| e.to_string()));
        // Native functions registered on `engine` hold their own clone of
        // `state`, so it can't be unwrapped back to an owned `RunState`
        // until `engine` drops. Drain what we need through the lock instead.
        drop(engine);

        let (lines, effects, cache) = {
            let mut guard = state.lock();
            (std::mem::take(&mut guard.lines), std::mem::take(&mut guard.snapshot.effects), std::mem::take(&mut guard.import_cache))
        };
        self.import_caches.insert(ctx.node_id.clone(), cache);

        if let Err(e) = crate::snapshot::apply_effects(world, &ctx.node_id, effects) {
            return ScriptOutcome::failure(lines, e.to_string());
        }

        match eval_result {
            Ok(value) => ScriptOutcome { ok: true, lines, return_value: dynamic_to_json(value), error: None },
            Err(e) => ScriptOutcome::failure(lines, e.to_string()),
        }
    }
}

fn dynamic_to_json(value: Dynamic) -> Option<serde_json::Value> {
    if value.is_unit() {
        return None;
    }
    rhai::serde::from_dynamic::<serde_json::Value>(&value).ok()
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
