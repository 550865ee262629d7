// SPDX-License-Identifier: MIT

//! Process scheduler (`§4.12`): an indexed min-heap of `(endAt, pid,
//! revision)`, with lazily-discarded stale entries and `rebuild` support
//! from a restored snapshot.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use vt_core::{Pid, Process, ProcessState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct HeapEntry {
    end_at_ms: u64,
    pid: Pid,
    revision: u64,
}

#[derive(Default)]
pub struct Scheduler {
    heap: BinaryHeap<Reverse<HeapEntry>>,
    revisions: HashMap<Pid, u64>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `pid` to fire at `end_at_ms`, or move it if already
    /// scheduled. Bumping the revision lets a stale heap entry left
    /// behind by the old schedule be discarded for free on pop.
    pub fn schedule_or_update(&mut self, pid: Pid, end_at_ms: u64) {
        let revision = self.revisions.entry(pid).or_insert(0);
        *revision += 1;
        self.heap.push(Reverse(HeapEntry { end_at_ms, pid, revision: *revision }));
    }

    pub fn cancel(&mut self, pid: Pid) {
        // Bumping the revision with no matching push makes every
        // existing heap entry for `pid` stale; it is discarded on pop.
        *self.revisions.entry(pid).or_insert(0) += 1;
    }

    /// Pop every process due at or before `now_ms`, validating each
    /// against `process_list` so a stale or canceled entry is silently
    /// dropped rather than completed twice.
    pub fn pop_due(&mut self, now_ms: u64, process_list: &HashMap<Pid, Process>) -> Vec<Pid> {
        let mut due = Vec::new();
        while let Some(Reverse(top)) = self.heap.peek().copied() {
            if top.end_at_ms > now_ms {
                break;
            }
            self.heap.pop();
            if self.revisions.get(&top.pid) != Some(&top.revision) {
                continue;
            }
            match process_list.get(&top.pid) {
                Some(p) if p.state == ProcessState::Running && p.end_at_ms == top.end_at_ms => due.push(top.pid),
                _ => continue,
            }
        }
        due
    }

    /// Rebuild scheduling state from a freshly restored process table
    /// (`§6`): every still-running process is rescheduled at its
    /// recorded `end_at_ms`.
    pub fn rebuild_from_snapshot(&mut self, process_list: &HashMap<Pid, Process>) {
        self.heap.clear();
        self.revisions.clear();
        for process in process_list.values() {
            if process.state == ProcessState::Running {
                self.schedule_or_update(process.pid, process.end_at_ms);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
