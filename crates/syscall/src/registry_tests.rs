// SPDX-License-Identifier: MIT

use super::*;

fn noop_handler(_world: &mut WorldRuntime, _ctx: &ExecutionContext, _args: &[String]) -> CommandResult {
    CommandResult::ok(Vec::new())
}

#[test]
fn lookup_is_case_insensitive() {
    let registry = Registry::builder().register("Pwd", noop_handler).unwrap().build();
    assert!(registry.lookup("pwd").is_some());
    assert!(registry.lookup("PWD").is_some());
    assert!(registry.lookup("pWd").is_some());
}

#[test]
fn duplicate_registration_is_an_error() {
    let err = Registry::builder().register("pwd", noop_handler).unwrap().register("PWD", noop_handler);
    assert!(matches!(err, Err(RegistryError::DuplicateName(_))));
}

#[test]
fn default_registry_has_no_duplicates() {
    assert!(default_registry().is_ok());
}

#[test]
fn unknown_command_reports_unknown_command_code() {
    let result = unknown_command("frobnicate");
    assert_eq!(result.code, ResultCode::UnknownCommand);
}
