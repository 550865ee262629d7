// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vt-storage: content-addressed blob store, read-only base image, and
//! per-server copy-on-write overlay filesystem (`spec.md` §4.1–4.3).

mod base_image;
mod blob;
mod overlay;

pub use base_image::BaseImage;
pub use blob::{BlobRecordSnapshot, BlobStore};
pub use overlay::{DirDelta, OverlayError, OverlayFs, MAX_TEXT_FILE_BYTES};
