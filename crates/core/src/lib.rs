// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt-core: shared data model for the terminal world runtime.
//!
//! This crate has no knowledge of storage, scripting, or scheduling; it
//! defines the value types every other crate builds on (`spec.md` §3).

pub mod connection;
pub mod content;
pub mod entry;
pub mod error;
pub mod event;
pub mod id;
pub mod path;
pub mod process;
pub mod server;

pub use connection::ConnectionFrame;
pub use content::ContentId;
pub use entry::{Entry, EntryKind, FileKind};
pub use error::{CoreError, ResultCode};
pub use event::{Action, ConditionType, Event, EventPayload, HandlerDescriptor, ANY_KEY};
pub use id::{CampaignId, EventId, IdGen, NetId, NodeId, ScenarioId, SequentialIdGen, SessionId, ShortId, SpecId, UserKey, UuidIdGen};
pub use process::{Pid, Process, ProcessState, ProcessType};
pub use server::{
    AuthMode, Exposure, Interface, LogEntry, LogRing, NodeReason, NodeStatus, Port, PortType,
    Privilege, ServerNode, SessionRecord, User,
};
