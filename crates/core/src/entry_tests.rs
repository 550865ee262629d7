// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn dir_entry_has_no_content_id() {
    let e = Entry::dir();
    assert!(e.is_dir());
    assert!(e.content_id.is_none());
}

#[test]
fn file_entry_carries_content_id_and_size() {
    let cid = ContentId::of(b"data");
    let e = Entry::file(FileKind::Text, cid.clone(), 4);
    assert!(e.is_file());
    assert_eq!(e.content_id, Some(cid));
    assert_eq!(e.size, 4);
}

#[test]
fn executable_kinds_are_executable() {
    assert!(FileKind::ExecutableScript.is_executable());
    assert!(FileKind::ExecutableHardcode.is_executable());
    assert!(!FileKind::Text.is_executable());
    assert!(!FileKind::Binary.is_executable());
}

#[test]
fn text_like_kinds() {
    assert!(FileKind::Text.is_text_like());
    assert!(FileKind::ExecutableScript.is_text_like());
    assert!(!FileKind::Binary.is_text_like());
    assert!(!FileKind::Image.is_text_like());
}
