//! Hub exclusion - choices at hub nodes that burn other branches.
//!
//! - **HubRegistry**: read-only `(hub, target) -> burns` lookup built from config
//! - **BurnTracker**: the growing set of burned branch ids for one playthrough

mod burn;
mod registry;

pub use burn::*;
pub use registry::*;
