//! Cost model
//!
//! Prices one fully laid-out candidate under one production method. Every
//! line is rounded to cents first and the total is the sum of the rounded
//! lines, so the breakdown always adds up.

use crate::catalog::FinishingOperation;
use crate::constants::{div_ceil, round_money};
use crate::layout::SheetCounts;
use crate::options::{ProductSpec, RateCard};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cost lines for one option
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostBreakdown {
    pub paper_cost: f64,
    pub printing_cost: f64,
    pub setup_cost: f64,
    pub waste_cost: f64,
    pub finishing_cost: f64,
    pub total_cost: f64,
    pub cost_per_unit: f64,
}

impl CostBreakdown {
    /// Sum of the five cost lines
    pub fn lines_sum(&self) -> f64 {
        self.paper_cost + self.printing_cost + self.setup_cost + self.waste_cost + self.finishing_cost
    }
}

/// Whether an offset run of `total_machine_sheets` is below the economic minimum
pub fn below_offset_minimum(total_machine_sheets: u32, rates: &RateCard) -> bool {
    total_machine_sheets < rates.offset_min_sheets
}

/// Price a candidate.
///
/// `parent_sheet_price` is the resolved price of one parent sheet of the
/// candidate's paper. Returns `None` when the method cannot run the job: an
/// offset run below `offset_min_sheets`.
pub fn price_candidate(
    method: ProductionMethod,
    product: &ProductSpec,
    counts: &SheetCounts,
    parent_sheet_price: f64,
    rates: &RateCard,
    finishing: &[FinishingOperation],
) -> Option<CostBreakdown> {
    if method == ProductionMethod::Offset && below_offset_minimum(counts.total_machine_sheets, rates) {
        return None;
    }

    let paper_cost = round_money(counts.net_parent_sheets as f64 * parent_sheet_price);
    let waste_cost = round_money(counts.waste_parent_sheets() as f64 * parent_sheet_price);

    let (printing_cost, setup_cost) = match method {
        ProductionMethod::Digital => (digital_printing_cost(product, counts, rates), 0.0),
        ProductionMethod::Offset => (
            offset_printing_cost(counts, rates),
            offset_setup_cost(product, rates),
        ),
    };
    let printing_cost = round_money(printing_cost);
    let setup_cost = round_money(setup_cost);

    let finishing_cost = round_money(
        finishing
            .iter()
            .map(|op| finishing_charge(op, product, counts))
            .sum(),
    );

    let mut breakdown = CostBreakdown {
        paper_cost,
        printing_cost,
        setup_cost,
        waste_cost,
        finishing_cost,
        total_cost: 0.0,
        cost_per_unit: 0.0,
    };
    breakdown.total_cost = round_money(breakdown.lines_sum());
    breakdown.cost_per_unit = round_money(breakdown.total_cost / product.quantity.max(1) as f64);

    Some(breakdown)
}

/// Click charge for one printed sheet: one click per side, mono or colour
fn clicks_per_sheet(product: &ProductSpec, rates: &RateCard) -> f64 {
    let side_rate = |inks: u8| {
        if inks <= 1 {
            rates.click_mono
        } else {
            rates.click_color
        }
    };
    side_rate(product.color_front) + product.color_back.map(side_rate).unwrap_or(0.0)
}

fn digital_printing_cost(product: &ProductSpec, counts: &SheetCounts, rates: &RateCard) -> f64 {
    let clicks = counts.total_machine_sheets as f64 * clicks_per_sheet(product, rates);
    clicks.max(rates.digital_min_charge)
}

fn offset_printing_cost(counts: &SheetCounts, rates: &RateCard) -> f64 {
    div_ceil(counts.total_machine_sheets, 1000) as f64 * rates.offset_per_1000_sheets
}

fn offset_setup_cost(product: &ProductSpec, rates: &RateCard) -> f64 {
    rates.offset_setup + product.plate_count() as f64 * rates.ctp_per_plate
}

/// Charge for one finishing operation, floored at its `min_cost`
pub fn finishing_charge(op: &FinishingOperation, product: &ProductSpec, counts: &SheetCounts) -> f64 {
    let quantity = product.quantity as f64;
    let raw = match op.pricing_type {
        PricingType::PerPiece => op.cost * quantity,
        PricingType::PerSheet => op.cost * counts.total_machine_sheets as f64,
        PricingType::Fixed => op.cost,
        PricingType::PerFold => op.cost * product.folds_per_unit as f64 * quantity,
        PricingType::PerCut => op.cost * product.cuts_per_unit as f64 * quantity,
    };
    match op.min_cost {
        Some(min) => raw.max(min),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateCard {
        RateCard {
            click_mono: 0.05,
            click_color: 0.25,
            digital_min_charge: 10.0,
            ctp_per_plate: 15.0,
            offset_setup: 60.0,
            offset_per_1000_sheets: 40.0,
            offset_min_sheets: 200,
        }
    }

    fn counts(net: u32, total: u32, per_parent: u32) -> SheetCounts {
        SheetCounts {
            net_machine_sheets: net,
            makeready_waste_sheets: 0,
            run_waste_sheets: total - net,
            total_machine_sheets: total,
            machine_sheets_per_parent: per_parent,
            net_parent_sheets: net.div_ceil(per_parent),
            parent_sheets_needed: total.div_ceil(per_parent),
        }
    }

    fn op(pricing_type: PricingType, cost: f64, min_cost: Option<f64>) -> FinishingOperation {
        FinishingOperation {
            id: "op".to_string(),
            pricing_type,
            cost,
            min_cost,
        }
    }

    #[test]
    fn test_digital_duplex_colour() {
        let mut product = ProductSpec::new(9.0, 5.0, 1000);
        product.color_back = Some(1);
        let c = counts(48, 49, 1);

        let cost = price_candidate(ProductionMethod::Digital, &product, &c, 0.2, &rates(), &[]).unwrap();

        // 49 sheets × (0.25 + 0.05)
        assert_eq!(cost.printing_cost, 14.7);
        assert_eq!(cost.setup_cost, 0.0);
        assert_eq!(cost.paper_cost, 9.6);
        assert_eq!(cost.waste_cost, 0.2);
        assert!((cost.total_cost - cost.lines_sum()).abs() < 1e-9);
        assert_eq!(cost.cost_per_unit, round_money(cost.total_cost / 1000.0));
    }

    #[test]
    fn test_digital_minimum_charge() {
        let product = ProductSpec::new(9.0, 5.0, 10);
        let c = counts(1, 1, 1);
        let cost = price_candidate(ProductionMethod::Digital, &product, &c, 0.2, &rates(), &[]).unwrap();
        assert_eq!(cost.printing_cost, 10.0);
    }

    #[test]
    fn test_offset_plates_and_runs() {
        let mut product = ProductSpec::new(9.0, 5.0, 10_000);
        product.color_back = Some(4);
        let c = counts(1200, 1290, 2);

        let cost = price_candidate(ProductionMethod::Offset, &product, &c, 1.0, &rates(), &[]).unwrap();

        // 8 plates × 15 + 60
        assert_eq!(cost.setup_cost, 180.0);
        // ceil(1290 / 1000) = 2 × 40
        assert_eq!(cost.printing_cost, 80.0);
        // 600 net parents, 645 total
        assert_eq!(cost.paper_cost, 600.0);
        assert_eq!(cost.waste_cost, 45.0);
        assert_eq!(cost.total_cost, 905.0);
    }

    #[test]
    fn test_offset_below_minimum_excluded() {
        let product = ProductSpec::new(9.0, 5.0, 50);
        let c = counts(10, 60, 1);
        assert!(price_candidate(ProductionMethod::Offset, &product, &c, 1.0, &rates(), &[]).is_none());
    }

    #[test]
    fn test_finishing_pricing_types() {
        let mut product = ProductSpec::new(10.0, 21.0, 500);
        product.folds_per_unit = 2;
        product.cuts_per_unit = 4;
        let c = counts(100, 110, 1);

        assert_eq!(finishing_charge(&op(PricingType::PerPiece, 0.1, None), &product, &c), 50.0);
        assert_eq!(finishing_charge(&op(PricingType::PerSheet, 0.5, None), &product, &c), 55.0);
        assert_eq!(finishing_charge(&op(PricingType::Fixed, 25.0, None), &product, &c), 25.0);
        assert_eq!(finishing_charge(&op(PricingType::PerFold, 0.01, None), &product, &c), 10.0);
        assert_eq!(finishing_charge(&op(PricingType::PerCut, 0.01, None), &product, &c), 20.0);
    }

    #[test]
    fn test_finishing_min_cost_floor() {
        let product = ProductSpec::new(10.0, 21.0, 100);
        let c = counts(10, 11, 1);
        let lamination = op(PricingType::PerPiece, 0.01, Some(15.0));
        assert_eq!(finishing_charge(&lamination, &product, &c), 15.0);
    }
}
