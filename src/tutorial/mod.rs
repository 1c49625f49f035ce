//! Per-zone progress trackers.
//!
//! Each tracker has a monotonic flag record, an `update` that flips flags
//! in response to a processed command, and a side-effect free hint lookup
//! that walks an ordered step list.

pub mod context;
pub mod steps;
pub mod zone1;
pub mod zone2;

pub use context::{has_all_option, names_file, UpdateContext};
pub use steps::{next_step, Hint, Step};
pub use zone1::Zone1Flags;
pub use zone2::Zone2Flags;
