//! Layout calculation modules for quoting
//!
//! This module handles all the geometric calculations for one candidate:
//! - Grid solving (rows × cols, orientation, optional shrink)
//! - Tile coordinates for downstream rendering
//! - Sheet hierarchy (parent sheets cut into machine sheets, waste)

mod grid;
mod hierarchy;
mod types;

pub use grid::*;
pub use hierarchy::*;
pub use types::*;
