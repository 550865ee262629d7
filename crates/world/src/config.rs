// SPDX-License-Identifier: MIT

//! Construction-time configuration, the teacher's `RuntimeConfig`
//! pattern (`SPEC_FULL.md` §3.3) in place of an on-disk config file.

use std::sync::Arc;

use parking_lot::Mutex;
use vt_core::IdGen;
use vt_storage::{BaseImage, BlobStore};

/// Shared, immutable-after-build world dependencies.
#[derive(Clone)]
pub struct WorldConfig {
    pub world_seed: u64,
    pub base_image: Arc<BaseImage>,
    pub blob_store: Arc<Mutex<BlobStore>>,
    pub id_gen: Arc<dyn IdGen>,
}

/// PATH list searched by program resolution (`§4.8 (P)`).
pub const PATH_DIRS: [&str; 3] = ["/opt/bin", "/usr/bin", "/bin"];

/// Player workstation node id, used to simulate a global tool set in
/// program resolution (`§4.8 (P)` step 2) and as the `scan` "no
/// neighbors" special case (`§4.8 scan`).
pub const WORKSTATION_NODE_ID: &str = "workstation";
