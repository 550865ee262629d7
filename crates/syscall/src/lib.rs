// SPDX-License-Identifier: MIT

//! Syscall dispatcher: parser, execution context, built-in handlers,
//! PATH resolution, and the terminal-facing facade (`§4.7`-`§4.9`,
//! `§4.10`).

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod context;
pub mod facade;
pub mod handlers_fs;
pub mod handlers_net;
pub mod parser;
pub mod program;
pub mod registry;
pub mod result;

#[cfg(test)]
mod test_support;

pub use context::{acting_privilege, build_context, ExecutionContext};
pub use facade::{execute_terminal_command, interrupt_terminal_program, try_start_terminal_program, TerminalRequest};
pub use parser::{tokenize, ParseError};
pub use program::{dispatch_hardcode, resolve as resolve_program, ProgramKind, ResolvedProgram};
pub use registry::{default_registry, unknown_command, Registry, RegistryBuilder, RegistryError};
pub use result::{CommandResult, Transition};
