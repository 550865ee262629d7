// SPDX-License-Identifier: MIT

//! Shared result/error taxonomy (`§4.7 Result envelope`, `§6` intrinsic
//! error codes, `§7 Error handling design`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The narrow failure code a syscall handler or world operation returns.
/// Handlers MUST choose the narrowest applicable code (`§4.7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ResultCode {
    None,
    UnknownCommand,
    InvalidArgs,
    PermissionDenied,
    NetDenied,
    NotFound,
    PortClosed,
    NotFile,
    NotDirectory,
    Conflict,
    InternalError,
    AlreadyExists,
    IsDirectory,
    NotTextFile,
    TooLarge,
}

impl ResultCode {
    /// The stable `ERR_*` identifier intrinsics surface to scripts
    /// (`§6` Intrinsic result map).
    pub fn as_err_token(self) -> &'static str {
        match self {
            ResultCode::None => "OK",
            ResultCode::UnknownCommand => "ERR_UNKNOWN_COMMAND",
            ResultCode::InvalidArgs => "ERR_INVALID_ARGS",
            ResultCode::PermissionDenied => "ERR_PERMISSION_DENIED",
            ResultCode::NetDenied => "ERR_NET_DENIED",
            ResultCode::NotFound => "ERR_NOT_FOUND",
            ResultCode::PortClosed => "ERR_PORT_CLOSED",
            ResultCode::NotFile => "ERR_NOT_FILE",
            ResultCode::NotDirectory => "ERR_NOT_DIRECTORY",
            ResultCode::Conflict => "ERR_ALREADY_EXISTS",
            ResultCode::InternalError => "ERR_INTERNAL_ERROR",
            ResultCode::AlreadyExists => "ERR_ALREADY_EXISTS",
            ResultCode::IsDirectory => "ERR_IS_DIRECTORY",
            ResultCode::NotTextFile => "ERR_NOT_TEXT_FILE",
            ResultCode::TooLarge => "ERR_TOO_LARGE",
        }
    }
}

/// Low-level errors shared by the data-model crate's own operations
/// (mostly path/entry bookkeeping helpers that live here rather than in
/// `vt-storage` because they only touch `Entry`/`ContentId`).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgs(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
