// SPDX-License-Identifier: MIT

//! World tick driver (`§5` ordering guarantees): advance `worldTick`,
//! pop due processes and apply their completion effects, then drain the
//! event queue subject to the per-tick budget. Completion effects and
//! dispatched actions may themselves emit new events, appended to the
//! tail and picked up on a later tick.

use vt_world::WorldRuntime;

use crate::dispatcher;
use crate::handler_index::HandlerIndex;
use crate::scheduler::Scheduler;

pub struct Engine {
    scheduler: Scheduler,
    handler_index: HandlerIndex,
}

impl Engine {
    pub fn new(world: &WorldRuntime) -> Self {
        Self { scheduler: Scheduler::new(), handler_index: HandlerIndex::build(&world.handlers) }
    }

    /// Rebuild the handler index after `world.handlers` changes (a new
    /// scenario/campaign is applied) or after a snapshot restore.
    pub fn rebuild_handler_index(&mut self, world: &WorldRuntime) {
        self.handler_index = HandlerIndex::build(&world.handlers);
    }

    /// Reschedule every still-running process after a snapshot restore
    /// (`§6`); the scheduler itself is not part of the snapshot tree.
    pub fn rebuild_scheduler(&mut self, world: &WorldRuntime) {
        self.scheduler.rebuild_from_snapshot(&world.process_list);
    }

    pub fn schedule_process(&mut self, pid: vt_core::Pid, end_at_ms: u64) {
        self.scheduler.schedule_or_update(pid, end_at_ms);
    }

    pub fn cancel_process(&mut self, pid: vt_core::Pid) {
        self.scheduler.cancel(pid);
    }

    /// Advance one tick at `now_ms` (`§5` steps a-c).
    pub fn run_tick(&mut self, world: &mut WorldRuntime, now_ms: u64) {
        world.world_tick = now_ms;

        for pid in self.scheduler.pop_due(now_ms, &world.process_list) {
            if let Err(e) = world.complete_process(pid, now_ms) {
                tracing::warn!(pid, error = %e, "process completion failed");
            }
        }

        dispatcher::drain(world, &self.handler_index);
    }
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tests;
