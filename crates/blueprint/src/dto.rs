// SPDX-License-Identifier: MIT

//! Blueprint DTOs produced by the (external, out of scope) YAML loader
//! and consumed by the applier (`spec.md` §6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vt_core::{
    Action, CampaignId, ConditionType, EventId, FileKind, NetId, NodeId, NodeReason, NodeStatus,
    Port, ScenarioId, SpecId, User,
};

/// Source content for a blueprint-declared filesystem entry
/// (`§4.6` step 5: "text-like kinds load as UTF-8 source;
/// `executableHardcode` stores an `exec:<id>` token").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayContent {
    Dir,
    Text(String),
    Binary(Vec<u8>),
    /// Built-in handler id (without the `exec:` prefix, which the
    /// applier adds when it writes the entry).
    Hardcode(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayEntryMeta {
    pub file_kind: FileKind,
    pub content: OverlayContent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskOverlaySpec {
    pub entries: HashMap<String, OverlayEntryMeta>,
    pub tombstones: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSpec {
    pub spec_id: SpecId,
    pub initial_status: NodeStatus,
    pub initial_reason: NodeReason,
    pub hostname: String,
    pub users: HashMap<String, User>,
    pub ports: HashMap<u16, Port>,
    pub daemons: HashMap<String, Vec<String>>,
    pub disk_overlay: DiskOverlaySpec,
    pub log_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceSpawn {
    pub net_id: NetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_suffix: Option<u32>,
    #[serde(default)]
    pub initially_exposed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSpawn {
    pub node_id: NodeId,
    pub spec_id: SpecId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_status_override: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_reason_override: Option<NodeReason>,
    #[serde(default)]
    pub overlay_adds: HashMap<String, OverlayEntryMeta>,
    #[serde(default)]
    pub overlay_removes: Vec<String>,
    #[serde(default)]
    pub port_adds: HashMap<u16, Port>,
    #[serde(default)]
    pub port_removes: Vec<u16>,
    #[serde(default)]
    pub daemon_adds: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub daemon_removes: Vec<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpawn>,
    #[serde(default)]
    pub info: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub hub_type: String,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetTopology {
    /// IPv4 CIDR, e.g. `"10.0.20.0/24"`.
    pub address_plan: String,
    #[serde(default)]
    pub hubs: HashMap<String, Hub>,
    #[serde(default)]
    pub links: Vec<(NodeId, NodeId)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBlueprint {
    pub condition_type: Option<ConditionType>,
    /// Unbound fields are `None`; the applier maps them to the
    /// `"__ANY__"` sentinel (`§4.6` step 4).
    #[serde(default)]
    pub node_id_key: Option<NodeId>,
    #[serde(default)]
    pub user_key: Option<String>,
    #[serde(default)]
    pub privilege_key: Option<String>,
    #[serde(default)]
    pub file_name_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_content: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: ScenarioId,
    pub servers: Vec<ServerSpawn>,
    #[serde(default)]
    pub subnet_topology: HashMap<NetId, SubnetTopology>,
    #[serde(default)]
    pub events: HashMap<EventId, EventBlueprint>,
    #[serde(default)]
    pub scripts: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: CampaignId,
    #[serde(default)]
    pub child_campaigns: Vec<Campaign>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// The parsed catalog handed to the applier: `{serverSpecs, scenarios,
/// campaigns}` (`§4.6`).
#[derive(Debug, Clone, Default)]
pub struct BlueprintCatalog {
    pub server_specs: HashMap<SpecId, ServerSpec>,
    pub scenarios: HashMap<ScenarioId, Scenario>,
    pub campaigns: HashMap<CampaignId, Campaign>,
}

/// Depth-first search for `scenario_id` across a campaign tree.
pub fn find_scenario_in_campaign<'a>(campaign: &'a Campaign, scenario_id: &ScenarioId) -> Option<&'a Scenario> {
    if let Some(s) = campaign.scenarios.iter().find(|s| &s.scenario_id == scenario_id) {
        return Some(s);
    }
    campaign
        .child_campaigns
        .iter()
        .find_map(|child| find_scenario_in_campaign(child, scenario_id))
}
