// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt-blueprint: DTOs for server specs, scenarios, and campaigns, plus
//! the applier that turns a scenario into a built world
//! (`spec.md` §4.6, §6).

mod applier;
mod dto;
mod error;
mod ip;

pub use applier::{apply_scenario, resolve_scenario, BuiltServer, BuiltWorld};
pub use dto::{
    BlueprintCatalog, Campaign, DiskOverlaySpec, EventBlueprint, Hub, InterfaceSpawn,
    OverlayContent, OverlayEntryMeta, Scenario, ServerSpawn, ServerSpec, SubnetTopology,
    find_scenario_in_campaign,
};
pub use error::BlueprintError;
pub use ip::{address_for_host_suffix, derive_address, Cidr};
