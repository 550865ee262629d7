// SPDX-License-Identifier: MIT

//! World runtime errors (`§4.4`, `§4.5`, `§4.9`).

use thiserror::Error;
use vt_core::{NetId, NodeId, ResultCode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("server {0} not found")]
    ServerNotFound(NodeId),
    #[error("address {0:?} does not resolve to any server")]
    AddressNotFound(String),
    #[error("user {0} not found on server")]
    UserNotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgs(String),
    #[error("permission denied")]
    PermissionDenied,
    #[error("port closed")]
    PortClosed,
    #[error("network denied")]
    NetDenied,
    #[error("not connected")]
    NotConnected,
    #[error("net {0} not found")]
    NetNotFound(NetId),
    #[error(transparent)]
    Overlay(#[from] vt_storage::OverlayError),
}

impl WorldError {
    /// Map into the narrow syscall result code (`§4.7`); handlers refine
    /// further where the spec calls for a more specific code than this
    /// default mapping gives (e.g. `Overlay(NotTextFile)`).
    pub fn as_result_code(&self) -> ResultCode {
        match self {
            WorldError::ServerNotFound(_)
            | WorldError::UserNotFound(_)
            | WorldError::NetNotFound(_)
            | WorldError::AddressNotFound(_) => ResultCode::NotFound,
            WorldError::InvalidArgs(_) => ResultCode::InvalidArgs,
            WorldError::PermissionDenied => ResultCode::PermissionDenied,
            WorldError::PortClosed => ResultCode::PortClosed,
            WorldError::NetDenied => ResultCode::NetDenied,
            WorldError::NotConnected => ResultCode::InvalidArgs,
            WorldError::Overlay(e) => match e {
                vt_storage::OverlayError::NotFound => ResultCode::NotFound,
                vt_storage::OverlayError::NotDirectory => ResultCode::NotDirectory,
                vt_storage::OverlayError::NotFile => ResultCode::NotFile,
                vt_storage::OverlayError::IsDirectory => ResultCode::IsDirectory,
                vt_storage::OverlayError::NotTextFile => ResultCode::NotTextFile,
                vt_storage::OverlayError::TooLarge => ResultCode::TooLarge,
                vt_storage::OverlayError::AlreadyExists => ResultCode::AlreadyExists,
                vt_storage::OverlayError::RootForbidden => ResultCode::PermissionDenied,
            },
        }
    }
}
