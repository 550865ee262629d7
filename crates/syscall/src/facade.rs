// SPDX-License-Identifier: MIT

//! The syscall dispatcher facade (`§4.5`, `§4.7`): `executeTerminalCommand`,
//! `tryStartTerminalProgram`, `interruptTerminalProgram`.

use vt_core::{NodeId, ResultCode, SessionId, UserKey};
use vt_script::{ScriptContext, ScriptHost};
use vt_world::WorldRuntime;

use crate::context::{build_context, ExecutionContext};
use crate::parser::tokenize;
use crate::program::{self, ProgramKind};
use crate::registry::Registry;
use crate::result::CommandResult;

pub struct TerminalRequest {
    pub node_id: NodeId,
    pub user_key: UserKey,
    pub cwd: String,
    pub terminal_session_id: SessionId,
    pub line: String,
}

/// `connect`/`disconnect`/`ftp` need extra arguments the uniform
/// handler signature doesn't carry (clock, remote node); the facade
/// recognizes them by name before falling back to the registry.
fn dispatch_network_builtin(world: &mut WorldRuntime, ctx: &ExecutionContext, command: &str, args: &[String], now_ms: u64) -> Option<CommandResult> {
    match command.to_ascii_lowercase().as_str() {
        "connect" => Some(crate::handlers_net::connect(world, ctx, args, now_ms)),
        "disconnect" => Some(crate::handlers_net::disconnect(world, ctx, args)),
        "ftp" => {
            // No host argument (§4.10): the remote endpoint, and the user
            // authenticated against it, are whatever this terminal session
            // is currently connected to.
            let frame = world.terminal_stacks.get(&ctx.terminal_session_id).and_then(|stack| stack.last());
            let target = frame.map(|f| (f.session_node_id.clone(), f.session_id.clone()));
            let Some((remote_node_id, remote_session_id)) = target else {
                return Some(CommandResult::err(ResultCode::InvalidArgs, "ftp requires an established connection"));
            };
            let remote_user_key = world
                .servers
                .get(&remote_node_id)
                .and_then(|s| s.sessions.get(remote_session_id.as_str()))
                .map(|session| session.user_key.clone());
            match remote_user_key {
                Some(remote_user_key) => Some(crate::handlers_net::ftp(world, ctx, args, &remote_node_id, &remote_user_key, now_ms)),
                None => Some(CommandResult::err(ResultCode::NotFound, "remote session not found")),
            }
        }
        _ => None,
    }
}

fn resolve_and_build_context(world: &WorldRuntime, req: &TerminalRequest) -> Result<(ExecutionContext, String, Vec<String>), CommandResult> {
    let (command, args) = match tokenize(&req.line) {
        Ok(tokens) if tokens.is_empty() => return Err(CommandResult::err(ResultCode::InvalidArgs, "empty command line")),
        Ok(mut tokens) => {
            let command = tokens.remove(0);
            (command, tokens)
        }
        Err(e) => return Err(CommandResult::err(ResultCode::InvalidArgs, e.to_string())),
    };
    let ctx = build_context(world, req.node_id.clone(), req.user_key.clone(), req.cwd.clone(), req.terminal_session_id.clone())
        .map_err(|e| CommandResult::from_world_error(&e))?;
    Ok((ctx, command, args))
}

/// `executeTerminalCommand(req)` (`§4.5`): parse, resolve context,
/// dispatch through the registry or PATH resolution, synchronously.
pub fn execute_terminal_command(world: &mut WorldRuntime, registry: &Registry, scripts: &mut ScriptHost, req: &TerminalRequest, now_ms: u64) -> CommandResult {
    let (ctx, command, args) = match resolve_and_build_context(world, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    if let Some(result) = dispatch_network_builtin(world, &ctx, &command, &args, now_ms) {
        return result;
    }
    if let Some(handler) = registry.lookup(&command) {
        return handler(world, &ctx, &args);
    }

    match program::resolve(world, &ctx, &command) {
        Ok(resolved) => match resolved.kind {
            ProgramKind::Hardcode(id) => program::dispatch_hardcode(world, &ctx, &id, &args),
            // A script resolved through PATH still executes synchronously
            // here; only `tryStartTerminalProgram` schedules it async.
            ProgramKind::Script(source) => run_script_sync(world, scripts, &ctx, &source, &args, now_ms),
        },
        Err(e) => e,
    }
}

/// `tryStartTerminalProgram(req)` (`§4.5`): same resolution; scripts and
/// `miniscript` hardcodes schedule asynchronously in the engine and
/// return a handle line, everything else runs synchronously.
pub fn try_start_terminal_program(world: &mut WorldRuntime, registry: &Registry, scripts: &mut ScriptHost, req: &TerminalRequest, now_ms: u64) -> CommandResult {
    let (ctx, command, args) = match resolve_and_build_context(world, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    if dispatch_network_builtin(world, &ctx, &command, &args, now_ms).is_some() || registry.lookup(&command).is_some() {
        return execute_terminal_command(world, registry, scripts, req, now_ms);
    }

    match program::resolve(world, &ctx, &command) {
        Ok(resolved) => match resolved.kind {
            ProgramKind::Script(_) => CommandResult::ok(vec![format!("started: {}", resolved.path)]),
            ProgramKind::Hardcode(id) if id == "miniscript" => CommandResult::ok(vec![format!("started: {}", resolved.path)]),
            ProgramKind::Hardcode(id) => program::dispatch_hardcode(world, &ctx, &id, &args),
        },
        Err(e) => e,
    }
}

/// `interruptTerminalProgram(pid)` (`§4.5`): cancel a running script.
/// Process-to-terminal-session bookkeeping lives in `vt-engine` once its
/// scheduler is built; this removes the process from the world's table
/// directly.
pub fn interrupt_terminal_program(world: &mut WorldRuntime, pid: vt_core::Pid) -> bool {
    world.process_list.remove(&pid).is_some()
}

fn run_script_sync(world: &mut WorldRuntime, scripts: &mut ScriptHost, ctx: &ExecutionContext, source: &str, args: &[String], now_ms: u64) -> CommandResult {
    let script_ctx = ScriptContext { node_id: ctx.node_id.clone(), user_key: ctx.user_key.clone(), cwd: ctx.cwd.clone() };
    let outcome = scripts.execute(world, &script_ctx, source, args, now_ms);
    if outcome.ok {
        CommandResult::ok(outcome.lines)
    } else {
        let mut lines = outcome.lines;
        lines.push(format!("error: {}", outcome.error.unwrap_or_default()));
        CommandResult { ok: false, code: ResultCode::InternalError, lines, next_cwd: None, data: None }
    }
}

#[cfg(test)]
#[path = "facade_tests.rs"]
mod tests;
