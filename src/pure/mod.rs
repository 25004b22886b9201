//! Pure state and geometry: everything in here is free of X calls so it can
//! be driven and tested directly.
pub mod client;
pub mod floatpos;
pub mod geometry;
pub mod hints;
pub mod monitor;

pub use client::{Client, ClientArena, ClientId};
pub use geometry::{Point, Rect};
pub use hints::SizeHints;
pub use monitor::{Gaps, Monitor, Pertag};

/// The mask covering every valid tag bit for a given tag count.
///
/// Tag counts are bounded at 31 so that the union view (all bits set) still
/// fits in a u32 alongside the "all tags" sentinel.
pub const fn tag_mask(n_tags: usize) -> u32 {
    (1 << n_tags) - 1
}
