//! Option ranking and method recommendation

use crate::constants::{round_2, round_money};
use crate::options::RankingPolicy;
use crate::result::{ImpositionOption, PricingSummary, Recommendation};
use crate::types::*;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Total order over options.
///
/// Cheapest first, then higher utilization, then fewer parent sheets. The
/// remaining keys only make the order total so output never depends on the
/// order candidates were evaluated in.
pub fn compare_options(a: &ImpositionOption, b: &ImpositionOption) -> Ordering {
    a.cost
        .total_cost
        .total_cmp(&b.cost.total_cost)
        .then_with(|| b.sheet_utilization.total_cmp(&a.sheet_utilization))
        .then_with(|| a.parent_sheets_needed.cmp(&b.parent_sheets_needed))
        .then_with(|| a.production_method.cmp(&b.production_method))
        .then_with(|| a.sheet_size_id.cmp(&b.sheet_size_id))
        .then_with(|| a.paper_type_id.cmp(&b.paper_type_id))
        .then_with(|| a.orientation.cmp(&b.orientation))
}

/// Sort options, number them 1..N and fill in savings against the most expensive.
pub fn rank_options(mut options: Vec<ImpositionOption>) -> Vec<ImpositionOption> {
    options.sort_by(compare_options);

    let most_expensive = options
        .iter()
        .map(|o| o.cost.total_cost)
        .fold(0.0_f64, f64::max);

    for (idx, option) in options.iter_mut().enumerate() {
        option.option_rank = idx as u32 + 1;
        let saving = most_expensive - option.cost.total_cost;
        option.cost_saving_amount = round_money(saving);
        option.cost_saving_percent = if most_expensive > 0.0 {
            round_2(saving / most_expensive * 100.0)
        } else {
            0.0
        };
    }

    options
}

/// Pick digital, offset or both from the cheapest option of each method.
///
/// `offset_min_sheets` is only used to explain why offset is missing. A
/// digital option implies an offset candidate on the same press-fittable
/// sheet with the same grid, so offset can only be missing alongside digital
/// when every offset run fell below that minimum.
pub fn recommend(
    options: &[ImpositionOption],
    policy: &RankingPolicy,
    offset_min_sheets: u32,
) -> Recommendation {
    let cheapest = |method: ProductionMethod| {
        options
            .iter()
            .filter(|o| o.production_method == method)
            .min_by(|a, b| compare_options(a, b))
    };

    match (
        cheapest(ProductionMethod::Digital),
        cheapest(ProductionMethod::Offset),
    ) {
        (Some(_), None) => Recommendation {
            method: RecommendedMethod::Digital,
            reason: format!(
                "Only digital can produce this job; offset setup cost is not justified below the {}-sheet threshold volume",
                offset_min_sheets
            ),
        },
        (None, Some(_)) => Recommendation {
            method: RecommendedMethod::Offset,
            reason: "Only offset can produce this job; no eligible sheet size fits the digital press"
                .to_string(),
        },
        (Some(digital), Some(offset)) => compare_methods(digital, offset, policy),
        (None, None) => Recommendation {
            method: RecommendedMethod::Both,
            reason: "No option was produced".to_string(),
        },
    }
}

fn compare_methods(
    digital: &ImpositionOption,
    offset: &ImpositionOption,
    policy: &RankingPolicy,
) -> Recommendation {
    let d = digital.cost.total_cost;
    let o = offset.cost.total_cost;
    let lower = d.min(o);
    let diff_percent = if lower > 0.0 {
        (d - o).abs() / lower * 100.0
    } else if d == o {
        0.0
    } else {
        f64::INFINITY
    };

    if diff_percent < policy.near_tie_tolerance_percent {
        return Recommendation {
            method: RecommendedMethod::Both,
            reason: format!(
                "Digital ({:.2}) and offset ({:.2}) are within {:.1}% of each other; choose on turnaround or finish",
                d, o, policy.near_tie_tolerance_percent
            ),
        };
    }

    if d < o {
        Recommendation {
            method: RecommendedMethod::Digital,
            reason: format!(
                "Digital is {:.1}% cheaper; offset setup and plates ({:.2}) are not recovered at {} machine sheets",
                diff_percent, offset.cost.setup_cost, offset.total_machine_sheets
            ),
        }
    } else {
        Recommendation {
            method: RecommendedMethod::Offset,
            reason: format!(
                "Offset is {:.1}% cheaper; at {} machine sheets digital click charges ({:.2}) exceed offset setup and run cost",
                diff_percent, digital.total_machine_sheets, digital.cost.printing_cost
            ),
        }
    }
}

/// Headline price built from the rank-1 option
pub fn pricing_summary(best: &ImpositionOption, margin_percentage: f64, quantity: u32) -> PricingSummary {
    let selling_price = round_money(best.cost.total_cost * (1.0 + margin_percentage / 100.0));
    PricingSummary {
        total_cost: best.cost.total_cost,
        cost_per_unit: best.cost.cost_per_unit,
        margin_percentage,
        selling_price,
        selling_price_per_unit: round_money(selling_price / quantity.max(1) as f64),
    }
}

/// Union of the top options' warnings and engine-level warnings.
///
/// Duplicates are dropped, first appearance wins.
pub fn global_warnings(
    options: &[ImpositionOption],
    top: usize,
    engine_warnings: &[QualityWarning],
) -> Vec<QualityWarning> {
    let mut seen: HashSet<&QualityWarning> = HashSet::new();
    let mut merged = Vec::new();

    let option_warnings = options.iter().take(top).flat_map(|o| o.warnings.iter());
    for warning in engine_warnings.iter().chain(option_warnings) {
        if seen.insert(warning) {
            merged.push(warning.clone());
        }
    }

    merged
}
