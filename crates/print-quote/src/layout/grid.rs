//! Grid solving
//!
//! Finds how many copies of a tile fit on one machine sheet, in which
//! orientation, and whether shrinking the product is needed to get any fit.

use crate::constants::{EPSILON, MAX_ITEMS_PER_SHEET, floor_count};
use crate::options::{PressSetup, ShrinkPolicy};
use crate::types::Orientation;

use super::{GridFit, LayoutData, MachineSheet, Rect, TilePlacement};

// =============================================================================
// Printable Area
// =============================================================================

/// Area of the machine sheet that tiles may occupy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintableArea {
    pub width_cm: f64,
    pub height_cm: f64,
}

/// The machine sheet minus the gripper strip on its top edge.
///
/// Returns `None` when the gripper leaves nothing to print on.
pub fn printable_area(sheet: MachineSheet, press: &PressSetup) -> Option<PrintableArea> {
    let height = sheet.height_cm - press.gripper_margin_cm;
    if sheet.width_cm <= EPSILON || height <= EPSILON {
        return None;
    }
    Some(PrintableArea {
        width_cm: sheet.width_cm,
        height_cm: height,
    })
}

// =============================================================================
// Grid Search
// =============================================================================

/// Tiles along one axis: `floor((available + gap) / (tile + gap))`
fn tiles_along(available: f64, tile: f64, gap: f64) -> u32 {
    if tile <= EPSILON {
        return 0;
    }
    floor_count((available + gap) / (tile + gap))
}

/// Length consumed by `count` tiles and the gaps between them
fn used_length(count: u32, tile: f64, gap: f64) -> f64 {
    if count == 0 {
        0.0
    } else {
        count as f64 * tile + (count - 1) as f64 * gap
    }
}

/// One orientation's outcome before the winner is chosen
#[derive(Debug, Clone, Copy)]
struct OrientedFit {
    orientation: Orientation,
    cols: u32,
    rows: u32,
    tile_width: f64,
    tile_height: f64,
    /// Leftover width strip + leftover height strip
    residual: f64,
}

impl OrientedFit {
    fn count(&self) -> u64 {
        u64::from(self.cols) * u64::from(self.rows)
    }
}

fn fit_oriented(
    orientation: Orientation,
    tile_width: f64,
    tile_height: f64,
    area: PrintableArea,
    gap: f64,
) -> OrientedFit {
    let (tile_width, tile_height) = orientation.apply(tile_width, tile_height);
    let cols = tiles_along(area.width_cm, tile_width, gap);
    let rows = tiles_along(area.height_cm, tile_height, gap);
    let residual = (area.width_cm - used_length(cols, tile_width, gap))
        + (area.height_cm - used_length(rows, tile_height, gap));

    OrientedFit {
        orientation,
        cols,
        rows,
        tile_width,
        tile_height,
        residual,
    }
}

/// Pick the better of the two orientations.
///
/// More tiles wins; equal counts go to the smaller residual strip, then to
/// `Normal`.
fn best_orientation(tile_width: f64, tile_height: f64, area: PrintableArea, gap: f64) -> OrientedFit {
    let normal = fit_oriented(Orientation::Normal, tile_width, tile_height, area, gap);
    let rotated = fit_oriented(Orientation::Rotated, tile_width, tile_height, area, gap);

    if rotated.count() > normal.count() {
        rotated
    } else if rotated.count() == normal.count() && rotated.residual < normal.residual - EPSILON {
        rotated
    } else {
        normal
    }
}

/// Solve the grid for one product on one machine sheet.
///
/// `product_width`/`product_height` are the trimmed size; bleed is added on
/// every edge to form the tile. Shrink is only attempted when nothing fits
/// unshrunk, and only the product (never the bleed) is reduced. Returns
/// `None` when the sheet cannot take even one tile, or would take more than
/// [`MAX_ITEMS_PER_SHEET`].
pub fn solve_grid(
    product_width: f64,
    product_height: f64,
    bleed: f64,
    sheet: MachineSheet,
    press: &PressSetup,
    shrink: &ShrinkPolicy,
) -> Option<GridFit> {
    let area = printable_area(sheet, press)?;
    let gap = press.item_gap_cm;

    let base = best_orientation(
        product_width + 2.0 * bleed,
        product_height + 2.0 * bleed,
        area,
        gap,
    );
    if base.count() > 0 {
        return to_grid_fit(base, product_width, product_height, 0.0, 0.0);
    }

    if !shrink.enabled || shrink.step_cm <= EPSILON {
        return None;
    }

    let max_steps = floor_count(shrink.max_cm / shrink.step_cm);
    for total in 1..=max_steps {
        let mut best: Option<(OrientedFit, f64, f64)> = None;

        for width_steps in 0..=total {
            let height_steps = total - width_steps;
            let shrink_w = step_length(width_steps, shrink.step_cm);
            let shrink_h = step_length(height_steps, shrink.step_cm);
            let width = product_width - shrink_w;
            let height = product_height - shrink_h;
            if width <= EPSILON || height <= EPSILON {
                continue;
            }

            let fit = best_orientation(width + 2.0 * bleed, height + 2.0 * bleed, area, gap);
            let improves = match &best {
                Some((current, _, _)) => fit.count() > current.count(),
                None => fit.count() > base.count(),
            };
            if improves {
                best = Some((fit, shrink_w, shrink_h));
            }
        }

        if let Some((fit, shrink_w, shrink_h)) = best {
            return to_grid_fit(fit, product_width, product_height, shrink_w, shrink_h);
        }
    }

    None
}

/// `steps × step`, snapped to a micrometre so repeated steps stay exact
fn step_length(steps: u32, step: f64) -> f64 {
    ((steps as f64 * step) * 1e6).round() / 1e6
}

fn to_grid_fit(
    fit: OrientedFit,
    product_width: f64,
    product_height: f64,
    shrink_width: f64,
    shrink_height: f64,
) -> Option<GridFit> {
    if fit.count() > u64::from(MAX_ITEMS_PER_SHEET) {
        log::debug!(
            "{}×{} grid exceeds {} tiles per sheet",
            fit.cols,
            fit.rows,
            MAX_ITEMS_PER_SHEET
        );
        return None;
    }
    Some(GridFit {
        cols: fit.cols,
        rows: fit.rows,
        orientation: fit.orientation,
        tile_width_cm: fit.tile_width,
        tile_height_cm: fit.tile_height,
        shrink_width_cm: shrink_width,
        shrink_height_cm: shrink_height,
        final_width_cm: product_width - shrink_width,
        final_height_cm: product_height - shrink_height,
    })
}

// =============================================================================
// Coordinates
// =============================================================================

/// Absolute tile positions, row-major from the top-left, below the gripper
pub fn tile_placements(fit: &GridFit, press: &PressSetup) -> Vec<TilePlacement> {
    let gap = press.item_gap_cm;
    let mut tiles = Vec::with_capacity(fit.items_per_sheet() as usize);

    for row in 0..fit.rows {
        for col in 0..fit.cols {
            let x = col as f64 * (fit.tile_width_cm + gap);
            let y = press.gripper_margin_cm + row as f64 * (fit.tile_height_cm + gap);
            tiles.push(TilePlacement {
                row,
                col,
                rect: Rect::new(x, y, fit.tile_width_cm, fit.tile_height_cm),
            });
        }
    }

    tiles
}

/// Build the renderer-facing layout record for a solved sheet
pub fn layout_data(fit: &GridFit, sheet: MachineSheet, press: &PressSetup, bleed: f64) -> LayoutData {
    LayoutData {
        sheet_width_cm: sheet.width_cm,
        sheet_height_cm: sheet.height_cm,
        gripper_margin_cm: press.gripper_margin_cm,
        item_gap_cm: press.item_gap_cm,
        bleed_cm: bleed,
        tiles: tile_placements(fit, press),
    }
}

/// Percentage of the machine sheet covered by tiles
pub fn sheet_utilization(fit: &GridFit, sheet: MachineSheet) -> f64 {
    let sheet_area = sheet.area_cm2();
    if sheet_area <= EPSILON {
        return 0.0;
    }
    let covered = fit.items_per_sheet() as f64 * fit.tile_width_cm * fit.tile_height_cm;
    covered / sheet_area * 100.0
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn press(gripper: f64, gap: f64) -> PressSetup {
        PressSetup {
            gripper_margin_cm: gripper,
            item_gap_cm: gap,
            machine_max_width_cm: 200.0,
            machine_max_height_cm: 200.0,
        }
    }

    fn shrink(max_cm: f64) -> ShrinkPolicy {
        ShrinkPolicy {
            enabled: true,
            max_cm,
            step_cm: 0.1,
        }
    }

    #[test]
    fn test_business_card_on_full_sheet() {
        // Tile 9.6 × 5.6 into 100 × 69
        // normal: 10 × 11 = 110, rotated: 17 × 7 = 119
        let fit = solve_grid(
            9.0,
            5.0,
            0.3,
            MachineSheet::new(100.0, 70.0),
            &press(1.0, 0.2),
            &ShrinkPolicy::disabled(),
        )
        .unwrap();

        assert_eq!(fit.orientation, Orientation::Rotated);
        assert_eq!(fit.cols, 17);
        assert_eq!(fit.rows, 7);
        assert_eq!(fit.items_per_sheet(), 119);
        assert!(!fit.is_shrink_used());
    }

    #[test]
    fn test_exact_fit_gives_one_item() {
        let fit = solve_grid(
            9.4,
            4.4,
            0.3,
            MachineSheet::new(10.0, 6.0),
            &press(1.0, 0.2),
            &ShrinkPolicy::disabled(),
        )
        .unwrap();
        assert_eq!(fit.items_per_sheet(), 1);
    }

    #[test]
    fn test_tie_prefers_normal() {
        // Square tile: both orientations identical
        let fit = solve_grid(
            9.0,
            9.0,
            0.0,
            MachineSheet::new(30.0, 31.0),
            &press(1.0, 0.0),
            &ShrinkPolicy::disabled(),
        )
        .unwrap();
        assert_eq!(fit.orientation, Orientation::Normal);
        assert_eq!(fit.items_per_sheet(), 9);
    }

    #[test]
    fn test_rotated_beats_normal_on_count() {
        // Tile 10 × 19 into 39 × 40: normal 3 × 2 = 6, rotated 2 × 4 = 8
        let fit = solve_grid(
            10.0,
            19.0,
            0.0,
            MachineSheet::new(39.0, 41.0),
            &press(1.0, 0.0),
            &ShrinkPolicy::disabled(),
        )
        .unwrap();
        assert_eq!(fit.orientation, Orientation::Rotated);
        assert_eq!(fit.items_per_sheet(), 8);
        assert_eq!(fit.tile_width_cm, 19.0);
    }

    #[test]
    fn test_equal_count_prefers_smaller_residual() {
        // Tile 16 × 10 into 33 × 64:
        // normal 2 × 6 = 12, leftover 1 + 4 = 5
        // rotated 3 × 4 = 12, leftover 3 + 0 = 3
        let fit = solve_grid(
            16.0,
            10.0,
            0.0,
            MachineSheet::new(33.0, 65.0),
            &press(1.0, 0.0),
            &ShrinkPolicy::disabled(),
        )
        .unwrap();
        assert_eq!(fit.items_per_sheet(), 12);
        assert_eq!(fit.orientation, Orientation::Rotated);
        assert_eq!((fit.cols, fit.rows), (3, 4));
    }

    #[test]
    fn test_no_fit_without_shrink() {
        let result = solve_grid(
            9.5,
            4.4,
            0.3,
            MachineSheet::new(10.0, 6.0),
            &press(1.0, 0.2),
            &ShrinkPolicy::disabled(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_shrink_rescues_fit() {
        // Tile 10.2 wide needs 0.2 cm off the product width to fit 10.0
        let fit = solve_grid(
            9.6,
            4.4,
            0.3,
            MachineSheet::new(10.0, 6.0),
            &press(1.0, 0.2),
            &shrink(0.5),
        )
        .unwrap();
        assert!(fit.is_shrink_used());
        assert_eq!(fit.items_per_sheet(), 1);
        assert!((fit.shrink_width_cm - 0.2).abs() < 1e-9);
        assert_eq!(fit.shrink_height_cm, 0.0);
        assert!((fit.final_width_cm - 9.4).abs() < 1e-9);
    }

    #[test]
    fn test_shrink_budget_exhausted() {
        // Needs 0.6 cm but only 0.5 is allowed
        let result = solve_grid(
            10.0,
            4.4,
            0.3,
            MachineSheet::new(10.0, 6.0),
            &press(1.0, 0.2),
            &shrink(0.5),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_dust_sized_tile_is_refused() {
        // 160000 × 220000 would overflow a u32 count
        let result = solve_grid(
            0.0002,
            0.0002,
            0.0,
            MachineSheet::new(32.0, 45.0),
            &press(1.0, 0.0),
            &ShrinkPolicy::disabled(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_gripper_swallows_sheet() {
        let result = solve_grid(
            1.0,
            1.0,
            0.0,
            MachineSheet::new(10.0, 1.0),
            &press(1.0, 0.0),
            &ShrinkPolicy::disabled(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_placements_stay_in_bounds_and_apart() {
        let sheet = MachineSheet::new(100.0, 70.0);
        let p = press(1.0, 0.2);
        let fit = solve_grid(9.0, 5.0, 0.3, sheet, &p, &ShrinkPolicy::disabled()).unwrap();
        let tiles = tile_placements(&fit, &p);

        assert_eq!(tiles.len(), fit.items_per_sheet() as usize);
        assert_eq!((tiles[0].row, tiles[0].col), (0, 0));
        assert_eq!(tiles[0].rect.y, 1.0);
        assert_eq!((tiles[1].row, tiles[1].col), (0, 1));

        for (i, a) in tiles.iter().enumerate() {
            assert!(a.rect.x >= 0.0);
            assert!(a.rect.y >= p.gripper_margin_cm);
            assert!(a.rect.right() <= sheet.width_cm + 1e-9);
            assert!(a.rect.bottom() <= sheet.height_cm + 1e-9);
            for b in &tiles[i + 1..] {
                assert!(!a.rect.overlaps(&b.rect, 1e-9));
            }
        }
    }

    #[test]
    fn test_utilization() {
        let sheet = MachineSheet::new(100.0, 70.0);
        let fit = solve_grid(
            9.0,
            5.0,
            0.3,
            sheet,
            &press(1.0, 0.2),
            &ShrinkPolicy::disabled(),
        )
        .unwrap();
        // 119 × 9.6 × 5.6 / 7000
        let expected = 119.0 * 9.6 * 5.6 / 7000.0 * 100.0;
        assert!((sheet_utilization(&fit, sheet) - expected).abs() < 1e-9);
    }
}
