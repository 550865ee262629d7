// SPDX-License-Identifier: MIT

//! Guard evaluation: a handler's `guard` is a boolean rhai expression
//! over the firing event and `scenarioFlags` (`§4.13` step 6). Compile
//! failures and budget overruns both log and are treated as `false`,
//! never propagated as a host error.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use rhai::{Dynamic, Engine, Scope};
use vt_core::EventPayload;

/// Per-call wall budget for a single guard evaluation (`§4.13`/`§5`).
pub const GUARD_BUDGET: Duration = Duration::from_micros(16_600);

fn event_scope(payload: &EventPayload, flags: &IndexMap<String, serde_json::Value>) -> Scope<'static> {
    let mut scope = Scope::new();
    scope.push("node_id", payload.node_id().map(|n| n.as_str().to_string()).unwrap_or_default());
    scope.push("user_key", payload.user_key().cloned().unwrap_or_default());
    scope.push("privilege", payload.privilege().unwrap_or_default().to_string());
    scope.push("file_name", payload.file_name().unwrap_or_default().to_string());
    let flags_map: rhai::Map = flags
        .iter()
        .map(|(k, v)| (k.as_str().into(), rhai::serde::to_dynamic(v).unwrap_or(Dynamic::UNIT)))
        .collect();
    scope.push("flags", flags_map);
    scope
}

/// Evaluate `guard` against `payload`/`flags`, returning `false` (with a
/// `tracing::warn!`) on compile error, runtime error, or budget overrun.
/// Returns the elapsed wall time alongside the verdict so the caller can
/// subtract it from the tick's aggregate budget.
pub fn evaluate(guard: &str, payload: &EventPayload, flags: &IndexMap<String, serde_json::Value>) -> (bool, Duration) {
    let started = Instant::now();
    let engine = {
        let mut engine = Engine::new();
        let deadline = started + GUARD_BUDGET;
        engine.on_progress(move |_ops| if Instant::now() >= deadline { Some(Dynamic::UNIT) } else { None });
        engine
    };

    let mut scope = event_scope(payload, flags);
    let verdict = match engine.eval_with_scope::<bool>(&mut scope, guard) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, guard, "guard evaluation failed; treating as false");
            false
        }
    };
    (verdict, started.elapsed())
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
