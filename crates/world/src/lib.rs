// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt-world: the server/world runtime core — session, process, log, and
//! connection-stack mutation, plus save/restore (`spec.md` §3-§4, §6).
//!
//! Depends on `vt-blueprint` to assemble a [`WorldRuntime`] from an
//! applied scenario, but otherwise knows nothing of syscalls or scripts:
//! those compose these primitives from `vt-syscall`/`vt-script`.

pub mod address;
pub mod config;
pub mod connection;
pub mod error;
pub mod process_effects;
pub mod server_runtime;
pub mod snapshot;
pub mod terminal;
pub mod totp;
pub mod world;

#[cfg(test)]
mod test_support;

pub use address::{KnownHost, ScanNeighbor};
pub use config::{WorldConfig, PATH_DIRS, WORKSTATION_NODE_ID};
pub use connection::{exposure_allowed, ConnectOutcome, ConnectRequest, DisconnectOutcome};
pub use error::WorldError;
pub use process_effects::PendingEffect;
pub use snapshot::{WorldSnapshot, SNAPSHOT_SCHEMA_VERSION};
pub use terminal::TerminalContext;
pub use world::WorldRuntime;
