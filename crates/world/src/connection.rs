// SPDX-License-Identifier: MIT

//! Connection stack: `connect`/`disconnect` and the exposure rule
//! (`§4.9 Connection stack (SSH)`).

use vt_core::{AuthMode, ConnectionFrame, Exposure, NodeId, Port, SessionId, SessionRecord, User, UserKey};

use crate::error::WorldError;
use crate::totp;
use crate::world::WorldRuntime;

pub struct ConnectRequest {
    pub terminal_session_id: SessionId,
    pub source_node_id: NodeId,
    pub prev_user_key: UserKey,
    pub prev_cwd: String,
    pub prev_prompt_user: String,
    pub prev_prompt_host: String,
    pub host_or_ip: String,
    pub port: Option<u16>,
    pub target_user_key: String,
    pub passwd_attempt: String,
    pub now_ms: u64,
}

pub struct ConnectOutcome {
    pub next_node_id: NodeId,
    pub next_user_key: UserKey,
    pub next_cwd: String,
    pub motd_lines: Vec<String>,
}

pub struct DisconnectOutcome {
    pub next_node_id: NodeId,
    pub next_user_key: UserKey,
    pub next_cwd: String,
    pub next_prompt_user: String,
    pub next_prompt_host: String,
}

/// A port is reachable from `source` if it shares an exposed subnet
/// with `target`, or the port is `public` and `target` has an
/// `internet` interface (`§4.9` exposure rule).
pub fn exposure_allowed(source: &vt_core::ServerNode, target: &vt_core::ServerNode, port: &Port) -> bool {
    let lan_ok = source
        .subnet_membership
        .iter()
        .any(|net| target.subnet_membership.contains(net) && target.is_exposed_on(net));
    let internet_ok = port.exposure == Exposure::Public && target.interfaces.iter().any(|i| i.net_id.as_str() == "internet");
    lan_ok || internet_ok
}

fn authenticate(user: &User, passwd_attempt: &str, now_ms: u64) -> bool {
    match user.auth_mode {
        AuthMode::None => true,
        AuthMode::Static => user.passwd.as_deref() == Some(passwd_attempt),
        AuthMode::Otp => user
            .passwd
            .as_deref()
            .map(|secret| totp::verify(secret, now_ms, passwd_attempt))
            .unwrap_or(false),
        AuthMode::Other => false,
    }
}

impl WorldRuntime {
    /// `connect [-p port] <host|ip> <user> <passwd>` (`§4.8`, `§4.9`).
    pub fn connect(&mut self, req: ConnectRequest) -> Result<ConnectOutcome, WorldError> {
        if req.host_or_ip.is_empty() || req.target_user_key.is_empty() {
            return Err(WorldError::InvalidArgs("host and user are required".to_string()));
        }
        let target_node_id = self
            .resolve_address(&req.host_or_ip)
            .ok_or_else(|| WorldError::AddressNotFound(req.host_or_ip.clone()))?;

        let port_num = req.port.unwrap_or(22);
        let target = self
            .servers
            .get(&target_node_id)
            .ok_or_else(|| WorldError::ServerNotFound(target_node_id.clone()))?;
        let port = target.ports.get(&port_num).ok_or(WorldError::PortClosed)?;
        if port.port_type != vt_core::PortType::Ssh {
            return Err(WorldError::PortClosed);
        }
        let source = self
            .servers
            .get(&req.source_node_id)
            .ok_or_else(|| WorldError::ServerNotFound(req.source_node_id.clone()))?;
        if !exposure_allowed(source, target, port) {
            return Err(WorldError::NetDenied);
        }
        let user = target
            .users
            .get(&req.target_user_key)
            .ok_or_else(|| WorldError::UserNotFound(req.target_user_key.clone()))?;
        if !authenticate(user, &req.passwd_attempt, req.now_ms) {
            return Err(WorldError::PermissionDenied);
        }

        let remote_ip = source.primary_ip().map(str::to_string);
        let node_session_key = self.id_gen.next();
        let target_mut = self
            .servers
            .get_mut(&target_node_id)
            .ok_or_else(|| WorldError::ServerNotFound(target_node_id.clone()))?;
        crate::server_runtime::upsert_session(
            target_mut,
            node_session_key.clone(),
            SessionRecord { user_key: req.target_user_key.clone(), remote_ip, cwd: "/".to_string() },
        );

        let frame = ConnectionFrame {
            prev_node_id: req.source_node_id,
            prev_user_key: req.prev_user_key,
            prev_cwd: req.prev_cwd,
            prev_prompt_user: req.prev_prompt_user,
            prev_prompt_host: req.prev_prompt_host,
            session_node_id: target_node_id.clone(),
            session_id: SessionId::new(node_session_key),
        };
        self.terminal_stacks.entry(req.terminal_session_id).or_default().push(frame);

        let motd_lines = self
            .overlays
            .get(&target_node_id)
            .and_then(|overlay| overlay.read_text(&self.base_image, &self.blob_store.lock(), "/etc/motd").ok())
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(ConnectOutcome {
            next_node_id: target_node_id,
            next_user_key: req.target_user_key,
            next_cwd: "/".to_string(),
            motd_lines,
        })
    }

    /// `disconnect`: pop the top frame and restore the caller's prior
    /// position; empty stack fails "not connected" (`§4.9`).
    pub fn disconnect(&mut self, terminal_session_id: &SessionId) -> Result<DisconnectOutcome, WorldError> {
        let frame = self
            .terminal_stacks
            .get_mut(terminal_session_id)
            .and_then(Vec::pop)
            .ok_or(WorldError::NotConnected)?;

        if let Some(server) = self.servers.get_mut(&frame.session_node_id) {
            crate::server_runtime::remove_session(server, frame.session_id.as_str());
        }

        Ok(DisconnectOutcome {
            next_node_id: frame.prev_node_id,
            next_user_key: frame.prev_user_key,
            next_cwd: frame.prev_cwd,
            next_prompt_user: frame.prev_prompt_user,
            next_prompt_host: frame.prev_prompt_host,
        })
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
