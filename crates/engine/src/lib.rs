// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt-engine: the deterministic scheduler and event-bus dispatcher that
//! drive a `vt-world` runtime forward one tick at a time (`spec.md`
//! §4.12-§4.13, §5).
//!
//! Depends on `vt-world` for the mutable runtime and `vt-script` for
//! guard evaluation, but owns no state of its own beyond the process
//! heap and handler index: everything it mutates lives on
//! [`vt_world::WorldRuntime`].

pub mod dispatcher;
pub mod guard;
pub mod handler_index;
pub mod scheduler;
pub mod tick;

#[cfg(test)]
mod test_support;

pub use dispatcher::{drain, drain_with_budget, TICK_BUDGET};
pub use guard::{evaluate as evaluate_guard, GUARD_BUDGET};
pub use handler_index::HandlerIndex;
pub use scheduler::Scheduler;
pub use tick::Engine;
