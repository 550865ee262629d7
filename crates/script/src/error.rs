// SPDX-License-Identifier: MIT

//! Intrinsic error taxonomy (`§6` "Intrinsic result map").

use thiserror::Error;

/// Stable error code tokens surfaced to scripts through the intrinsic
/// result map (`§6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicErrorCode {
    InvalidArgs,
    NotFound,
    PermissionDenied,
    IsDirectory,
    NotDirectory,
    NotFile,
    NotTextFile,
    TooLarge,
    AlreadyExists,
    NetDenied,
    PortClosed,
    AuthFailed,
    UnknownCommand,
    ImportAmbiguous,
    ImportCycle,
    NotALibrary,
    InternalError,
}

impl IntrinsicErrorCode {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::InvalidArgs => "ERR_INVALID_ARGS",
            Self::NotFound => "ERR_NOT_FOUND",
            Self::PermissionDenied => "ERR_PERMISSION_DENIED",
            Self::IsDirectory => "ERR_IS_DIRECTORY",
            Self::NotDirectory => "ERR_NOT_DIRECTORY",
            Self::NotFile => "ERR_NOT_FILE",
            Self::NotTextFile => "ERR_NOT_TEXT_FILE",
            Self::TooLarge => "ERR_TOO_LARGE",
            Self::AlreadyExists => "ERR_ALREADY_EXISTS",
            Self::NetDenied => "ERR_NET_DENIED",
            Self::PortClosed => "ERR_PORT_CLOSED",
            Self::AuthFailed => "ERR_AUTH_FAILED",
            Self::UnknownCommand => "ERR_UNKNOWN_COMMAND",
            Self::ImportAmbiguous => "ERR_IMPORT_AMBIGUOUS",
            Self::ImportCycle => "ERR_IMPORT_CYCLE",
            Self::NotALibrary => "ERR_NOT_A_LIBRARY",
            Self::InternalError => "ERR_INTERNAL_ERROR",
        }
    }
}

impl From<vt_storage::OverlayError> for IntrinsicErrorCode {
    fn from(e: vt_storage::OverlayError) -> Self {
        use vt_storage::OverlayError as E;
        match e {
            E::NotFound => Self::NotFound,
            E::NotDirectory => Self::NotDirectory,
            E::NotFile => Self::NotFile,
            E::IsDirectory => Self::IsDirectory,
            E::NotTextFile => Self::NotTextFile,
            E::TooLarge => Self::TooLarge,
            E::AlreadyExists => Self::AlreadyExists,
            E::RootForbidden => Self::InvalidArgs,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unterminated import: module {0:?} is already loading (ERR_IMPORT_CYCLE)")]
    ImportCycle(String),
    #[error("module {0:?} not found on the import search path")]
    ImportNotFound(String),
    #[error("module {0:?} has no `// @name` header and cannot be imported")]
    NotALibrary(String),
    #[error("more than one module on the search path matches {0:?}")]
    ImportAmbiguous(String),
    #[error("script exceeded its wall-clock quantum")]
    QuantumExceeded,
    #[error("rhai evaluation error: {0}")]
    Eval(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
