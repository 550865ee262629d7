// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn short_truncates_long_ids() {
    let id = NodeId::new("0123456789abcdef");
    assert_eq!(id.short(8), "01234567");
}

#[test]
fn short_passes_through_short_ids() {
    let id = NodeId::new("abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn sequential_id_gen_increments_and_is_stable_under_clone() {
    let gen = SequentialIdGen::new("proc");
    let cloned = gen.clone();
    assert_eq!(gen.next(), "proc-1");
    assert_eq!(cloned.next(), "proc-2");
    assert_eq!(gen.next(), "proc-3");
}

#[test]
fn node_id_compares_against_str() {
    let id = NodeId::new("srv-1");
    assert_eq!(id, "srv-1");
    assert_eq!(id, *&"srv-1");
}

#[test]
fn node_id_displays_inner_value() {
    let id = NodeId::new("srv-1");
    assert_eq!(format!("{id}"), "srv-1");
}
