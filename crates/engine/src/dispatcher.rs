// SPDX-License-Identifier: MIT

//! Event bus + dispatcher (`§4.13`): drains `world.event_queue` up to a
//! per-tick wall budget, applying the pre-dispatch hook, querying the
//! handler index, evaluating guards, and executing actions.

use std::time::{Duration, Instant};

use vt_core::{Action, Event, EventPayload};
use vt_world::WorldRuntime;

use crate::guard;
use crate::handler_index::HandlerIndex;

pub const TICK_BUDGET: Duration = Duration::from_millis(50);

/// Apply `§4.13` step 1: side effects every event causes regardless of
/// whether it is a scenario trigger.
fn pre_dispatch_hook(world: &mut WorldRuntime, event: &Event) {
    match &event.payload {
        EventPayload::PrivilegeAcquire { node_id, unlocked_net_ids, .. } => {
            for net_id in unlocked_net_ids {
                world.known_nodes_by_net.entry(net_id.clone()).or_default().insert(node_id.clone());
            }
        }
        EventPayload::ProcessFinished { pid } => {
            if let Some(process) = world.process_list.get(pid) {
                let node_id = process.host_node_id.clone();
                let user_key = process.user_key.clone();
                world.enqueue_terminal_line(node_id, user_key, format!("process {pid} finished"));
            }
        }
        EventPayload::FileAcquire { .. } => {}
    }
}

fn apply_action(world: &mut WorldRuntime, payload: &EventPayload, action: &Action) {
    match action {
        Action::Print { text } => {
            let Some((node_id, user_key)) = target_of(payload) else { return };
            world.enqueue_terminal_line(node_id, user_key, text.clone());
        }
        Action::SetFlag { key, value } => {
            world.scenario_flags.insert(key.clone(), value.clone());
        }
    }
}

/// Terminal line target for an action (`§4.13`: privilege → (nodeId,
/// userKey), file → (fromNodeId, userKey)).
fn target_of(payload: &EventPayload) -> Option<(vt_core::NodeId, vt_core::UserKey)> {
    Some((payload.node_id()?.clone(), payload.user_key()?.clone()))
}

/// Drain the event queue (deferred-front first) up to `TICK_BUDGET`,
/// returning early and re-queuing the front event if the budget runs
/// out mid-dispatch (`§4.13` step 5, `§5` ordering guarantee).
pub fn drain(world: &mut WorldRuntime, index: &HandlerIndex) {
    drain_with_budget(world, index, TICK_BUDGET);
}

/// `drain` with an explicit budget, so tests can force exhaustion
/// deterministically instead of racing the wall clock.
pub fn drain_with_budget(world: &mut WorldRuntime, index: &HandlerIndex, budget: Duration) {
    let started = Instant::now();

    loop {
        if started.elapsed() >= budget {
            break;
        }
        let Some(event) = world.deferred_front.take().or_else(|| world.event_queue.pop_front()) else {
            break;
        };

        pre_dispatch_hook(world, &event);

        if !event.payload.is_scenario_trigger() {
            continue;
        }

        let candidates = index.candidates(&event.payload);
        for idx in candidates {
            if started.elapsed() >= budget {
                world.deferred_front = Some(event);
                return;
            }
            let Some(handler) = world.handlers.get(idx) else { continue };
            let fired_key = handler.fired_key();
            if world.fired_handler_ids.contains(&fired_key) {
                continue;
            }

            let passed = match &handler.guard {
                Some(guard_src) => {
                    let (verdict, elapsed) = guard::evaluate(guard_src, &event.payload, &world.scenario_flags);
                    tracing::debug!(scenario_id = %fired_key.0, event_id = %fired_key.1, verdict, ?elapsed, "guard evaluated");
                    verdict
                }
                None => true,
            };
            if !passed {
                continue;
            }

            let actions = handler.actions.clone();
            for action in &actions {
                apply_action(world, &event.payload, action);
            }
            world.fired_handler_ids.insert(fired_key);
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
