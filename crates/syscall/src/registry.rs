// SPDX-License-Identifier: MIT

//! Case-insensitive command registry (`§4.7` "Registry").

use std::collections::HashMap;

use vt_core::ResultCode;
use vt_world::WorldRuntime;

use crate::context::ExecutionContext;
use crate::result::CommandResult;

pub type Handler = fn(&mut WorldRuntime, &ExecutionContext, &[String]) -> CommandResult;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("duplicate handler registration for {0:?}")]
    DuplicateName(String),
}

/// A single global registry populated at startup from the configured
/// modules. Duplicate registration is a build-time error.
pub struct Registry {
    handlers: HashMap<String, Handler>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder { handlers: HashMap::new() }
    }

    pub fn lookup(&self, name: &str) -> Option<Handler> {
        self.handlers.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_ascii_lowercase())
    }
}

pub struct RegistryBuilder {
    handlers: HashMap<String, Handler>,
}

impl RegistryBuilder {
    pub fn register(mut self, name: &str, handler: Handler) -> Result<Self, RegistryError> {
        let key = name.to_ascii_lowercase();
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.handlers.insert(key, handler);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry { handlers: self.handlers }
    }
}

/// The built-in filesystem/network handlers, registered once at
/// startup (`§4.8`). `connect`/`disconnect`/`ftp` need extra context
/// (clock, remote node) the uniform `Handler` signature doesn't carry,
/// so the facade dispatches those by name directly instead of through
/// this table.
pub fn default_registry() -> Result<Registry, RegistryError> {
    let builder = Registry::builder()
        .register("pwd", crate::handlers_fs::pwd)?
        .register("ls", crate::handlers_fs::ls)?
        .register("cd", crate::handlers_fs::cd)?
        .register("cat", crate::handlers_fs::cat)?
        .register("mkdir", crate::handlers_fs::mkdir)?
        .register("rm", crate::handlers_fs::rm)?
        .register("cp", crate::handlers_fs::cp)?
        .register("mv", crate::handlers_fs::mv)?
        .register("edit", crate::handlers_fs::edit)?
        .register("known", crate::handlers_net::known)?
        .register("scan", crate::handlers_net::scan)?;
    Ok(builder.build())
}

pub fn unknown_command(name: &str) -> CommandResult {
    CommandResult::err(ResultCode::UnknownCommand, &format!("unknown command: {name}"))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
