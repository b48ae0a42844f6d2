//! Layout data types
//!
//! These types carry the geometric result of solving one sheet between the
//! grid solver, the hierarchy calculator and the final option.

use crate::types::Orientation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular area in centimeters, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// X position (left edge)
    pub x: f64,
    /// Y position (top edge, growing downward)
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether the interiors of two rects intersect (shared edges do not count)
    pub fn overlaps(&self, other: &Rect, tolerance: f64) -> bool {
        self.x < other.right() - tolerance
            && other.x < self.right() - tolerance
            && self.y < other.bottom() - tolerance
            && other.y < self.bottom() - tolerance
    }
}

/// Rows × cols chosen for one machine sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFit {
    pub cols: u32,
    pub rows: u32,
    pub orientation: Orientation,
    /// Tile size as placed (orientation applied, bleed included)
    pub tile_width_cm: f64,
    pub tile_height_cm: f64,
    pub shrink_width_cm: f64,
    pub shrink_height_cm: f64,
    /// Trimmed product size after shrink, unrotated
    pub final_width_cm: f64,
    pub final_height_cm: f64,
}

impl GridFit {
    pub fn items_per_sheet(&self) -> u32 {
        self.cols.saturating_mul(self.rows)
    }

    pub fn is_shrink_used(&self) -> bool {
        self.shrink_width_cm > 0.0 || self.shrink_height_cm > 0.0
    }

    pub fn total_shrink_cm(&self) -> f64 {
        self.shrink_width_cm + self.shrink_height_cm
    }
}

/// Position of one tile on the machine sheet
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TilePlacement {
    /// Row index (0 = row nearest the gripper edge)
    pub row: u32,
    /// Column index (0 = leftmost column)
    pub col: u32,
    /// Tile bounds including bleed
    pub rect: Rect,
}

/// Everything a renderer needs to draw the imposition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutData {
    pub sheet_width_cm: f64,
    pub sheet_height_cm: f64,
    /// Unprintable strip along the top edge
    pub gripper_margin_cm: f64,
    pub item_gap_cm: f64,
    pub bleed_cm: f64,
    /// Row-major, top-left first
    pub tiles: Vec<TilePlacement>,
}

/// The sheet actually fed through the press
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineSheet {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl MachineSheet {
    pub fn new(width_cm: f64, height_cm: f64) -> Self {
        Self {
            width_cm,
            height_cm,
        }
    }

    pub fn area_cm2(&self) -> f64 {
        self.width_cm * self.height_cm
    }
}
