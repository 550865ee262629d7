// SPDX-License-Identifier: MIT

use vt_core::ResultCode;
use vt_world::WorldError;

use super::*;

#[test]
fn err_result_emits_single_error_line_with_narrowest_code() {
    let result = CommandResult::err(ResultCode::NotFound, "no such file");
    assert!(!result.ok);
    assert_eq!(result.code, ResultCode::NotFound);
    assert_eq!(result.lines, vec!["error: no such file".to_string()]);
}

#[test]
fn from_world_error_maps_to_narrow_code() {
    let result = CommandResult::from_world_error(&WorldError::PermissionDenied);
    assert_eq!(result.code, ResultCode::PermissionDenied);
    assert!(!result.ok);
}
