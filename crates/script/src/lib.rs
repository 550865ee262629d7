// SPDX-License-Identifier: MIT

//! Embedded sandboxed script runtime (`§4.11`): the `rhai`-based host
//! that backs PATH-resolved `ExecutableScript` programs and
//! handler guards.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod context;
pub mod error;
pub mod host;
pub mod import;
pub mod intrinsics;
pub mod result;
pub mod run_state;
pub mod snapshot;

#[cfg(test)]
mod test_support;

pub use context::ScriptContext;
pub use error::{IntrinsicErrorCode, ScriptError};
pub use host::{ScriptHost, GUARD_BUDGET_MS, SCRIPT_QUANTUM_MS};
pub use import::{ImportCache, ImportError, STDLIB_ROOT};
pub use result::{IntrinsicResult, ScriptOutcome};
pub use run_state::RunState;
pub use snapshot::{apply_effects, FsSnapshot, ScriptEffect};
