//! Sheet hierarchy calculation
//!
//! Offset jobs buy parent sheets and cut them down to press-sized machine
//! sheets. Digital jobs feed the catalog sheet directly. This module turns a
//! tile count into machine-sheet and parent-sheet counts, including waste.

use crate::catalog::SheetSize;
use crate::constants::{MAX_CUTS_PER_AXIS, ceil_count, div_ceil, floor_count};
use crate::options::{PressSetup, WastePolicy};
use crate::types::ProductionMethod;

use super::MachineSheet;

// =============================================================================
// Cut Plan
// =============================================================================

/// How a parent sheet is divided into machine sheets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPlan {
    pub machine: MachineSheet,
    pub cuts_across: u32,
    pub cuts_down: u32,
}

impl CutPlan {
    /// The parent is printed as is
    pub fn whole(parent: &SheetSize) -> Self {
        Self {
            machine: MachineSheet::new(parent.width_cm, parent.height_cm),
            cuts_across: 1,
            cuts_down: 1,
        }
    }

    pub fn machine_sheets_per_parent(&self) -> u32 {
        self.cuts_across * self.cuts_down
    }
}

/// Find the machine sheet an offset press prints for this parent.
///
/// A parent that already fits the press bed is used whole. Otherwise it is
/// divided evenly into `across × down` pieces, taking the fewest pieces that
/// fit the bed (fewer cuts across on a tie). Returns `None` if no division
/// up to [`MAX_CUTS_PER_AXIS`] per axis fits.
pub fn plan_offset_cut(parent: &SheetSize, press: &PressSetup) -> Option<CutPlan> {
    if press.fits(parent.width_cm, parent.height_cm) {
        return Some(CutPlan::whole(parent));
    }

    let mut best: Option<CutPlan> = None;
    for across in 1..=MAX_CUTS_PER_AXIS {
        for down in 1..=MAX_CUTS_PER_AXIS {
            let machine = MachineSheet::new(
                parent.width_cm / across as f64,
                parent.height_cm / down as f64,
            );
            if !press.fits(machine.width_cm, machine.height_cm) {
                continue;
            }

            let plan = CutPlan {
                machine,
                cuts_across: floor_count(parent.width_cm / machine.width_cm),
                cuts_down: floor_count(parent.height_cm / machine.height_cm),
            };
            let better = match &best {
                Some(current) => {
                    plan.machine_sheets_per_parent() < current.machine_sheets_per_parent()
                }
                None => true,
            };
            if better {
                best = Some(plan);
            }
        }
    }

    best
}

// =============================================================================
// Sheet Counts
// =============================================================================

/// Machine and parent sheet counts for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetCounts {
    /// Machine sheets carrying sellable tiles
    pub net_machine_sheets: u32,
    pub makeready_waste_sheets: u32,
    pub run_waste_sheets: u32,
    /// Net plus all waste
    pub total_machine_sheets: u32,
    pub machine_sheets_per_parent: u32,
    /// Parent sheets that the net run alone would consume
    pub net_parent_sheets: u32,
    /// Parent sheets to buy for the whole run, waste included
    pub parent_sheets_needed: u32,
}

impl SheetCounts {
    pub fn waste_sheets(&self) -> u32 {
        self.makeready_waste_sheets + self.run_waste_sheets
    }

    /// Parent sheets bought only to cover waste
    pub fn waste_parent_sheets(&self) -> u32 {
        self.parent_sheets_needed - self.net_parent_sheets
    }
}

/// Count sheets for a run of `tiles_needed` tiles at `items_per_sheet` per sheet.
///
/// Offset runs pay a fixed makeready waste plus a proportional run waste;
/// digital runs have no makeready and a proportional spoilage only, and
/// always use one machine sheet per parent. Returns `None` if the total does
/// not fit a `u32`.
pub fn sheet_counts(
    method: ProductionMethod,
    tiles_needed: u32,
    items_per_sheet: u32,
    plan: &CutPlan,
    waste: &WastePolicy,
) -> Option<SheetCounts> {
    let net = div_ceil(tiles_needed, items_per_sheet);

    let (per_parent, makeready, run_percentage) = match method {
        ProductionMethod::Offset => (
            plan.machine_sheets_per_parent().max(1),
            waste.makeready_sheets,
            waste.offset_run_percentage,
        ),
        ProductionMethod::Digital => (1, 0, waste.digital_percentage),
    };

    let run_waste = ceil_count(net as f64 * run_percentage / 100.0);
    let total = net.checked_add(makeready)?.checked_add(run_waste)?;

    Some(SheetCounts {
        net_machine_sheets: net,
        makeready_waste_sheets: makeready,
        run_waste_sheets: run_waste,
        total_machine_sheets: total,
        machine_sheets_per_parent: per_parent,
        net_parent_sheets: div_ceil(net, per_parent),
        parent_sheets_needed: div_ceil(total, per_parent),
    })
}

// =============================================================================
// Tests
// =============================================================================
