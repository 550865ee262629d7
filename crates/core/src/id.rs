// SPDX-License-Identifier: MIT

//! ID generation abstractions and newtype identifier definitions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for truncating identifiers to a short prefix (used by log lines
/// and terminal output that cannot afford full uuids).
pub trait ShortId {
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        if self.len() <= n {
            self
        } else {
            &self[..n]
        }
    }
}

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `short()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn short(&self, n: usize) -> &str {
                if self.0.len() <= n {
                    &self.0
                } else {
                    &self.0[..n]
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(String::new())
            }
        }
    };
}

define_id! {
    /// Identifies a server node within the world (`§3 Server node`).
    pub struct NodeId;
}

define_id! {
    /// Identifies a terminal or connection session (`§3 Session`).
    pub struct SessionId;
}

define_id! {
    /// Identifies a subnet ("netId") in the topology (`§4.6`).
    pub struct NetId;
}

define_id! {
    /// Identifies a blueprint server spec (`§6 ServerSpec`).
    pub struct SpecId;
}

define_id! {
    /// Identifies a scenario within a campaign (`§6 Scenario`).
    pub struct ScenarioId;
}

define_id! {
    /// Identifies a scenario-declared event within a scenario (`§6 events`).
    pub struct EventId;
}

define_id! {
    /// Identifies a campaign (`§6 Campaign`).
    pub struct CampaignId;
}

/// A user key within a server's user table (`userKey` in `§3 Server node`).
/// Kept as a plain string alias rather than a wrapper: user keys are
/// authored literally in blueprints and never generated.
pub type UserKey = String;

/// Generates unique identifiers for runtime-created entities (sessions,
/// processes). Mirrors the teacher's pluggable `IdGen` so tests can swap
/// in a deterministic generator instead of random uuids.
pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based ID generator for production use.
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sequential ID generator for deterministic tests and save/restore
/// round-trip assertions (`§8` invariant 9 requires canonicalized,
/// reproducible state).
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
