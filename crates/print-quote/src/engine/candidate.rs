//! Evaluation of one (paper, sheet, method) combination

use crate::catalog::{PaperType, SheetSize};
use crate::constants::round_2;
use crate::cost::price_candidate;
use crate::layout::{CutPlan, GridFit, SheetCounts, layout_data, sheet_counts, sheet_utilization, solve_grid};
use crate::options::ResolvedJob;
use crate::quality::{QualityContext, candidate_warnings};
use crate::result::{ImpositionOption, WasteBreakdown};
use crate::types::*;

/// One combination to try
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate<'a> {
    pub method: ProductionMethod,
    pub paper: &'a PaperType,
    pub sheet: &'a SheetSize,
    pub plan: CutPlan,
    /// Resolved price of one `sheet` of `paper`
    pub parent_price: f64,
}

/// Solve the grid on the candidate's machine sheet
pub(crate) fn solve(job: &ResolvedJob, plan: &CutPlan) -> Option<GridFit> {
    solve_grid(
        job.product.width_cm,
        job.product.height_cm,
        job.bleed_cm,
        plan.machine,
        &job.press,
        &job.shrink,
    )
    .filter(|fit| fit.items_per_sheet() > 0)
}

/// Lay out, count, price and validate one candidate.
///
/// Returns `None` when nothing fits or the method cannot run the job. The
/// option comes back unranked.
pub(crate) fn evaluate(job: &ResolvedJob, candidate: &Candidate<'_>) -> Option<ImpositionOption> {
    let Some(fit) = solve(job, &candidate.plan) else {
        log::debug!(
            "{} on {}: no tile fits the {:.1}×{:.1} cm machine sheet",
            candidate.method.label(),
            candidate.sheet.id,
            candidate.plan.machine.width_cm,
            candidate.plan.machine.height_cm
        );
        return None;
    };

    let Some(counts) = sheet_counts(
        candidate.method,
        job.tiles_needed,
        fit.items_per_sheet(),
        &candidate.plan,
        &job.waste,
    ) else {
        log::debug!(
            "{} on {}: sheet count for {} tiles overflows",
            candidate.method.label(),
            candidate.sheet.id,
            job.tiles_needed
        );
        return None;
    };

    let Some(cost) = price_candidate(
        candidate.method,
        &job.product,
        &counts,
        candidate.parent_price,
        &job.rates,
        &job.finishing,
    ) else {
        log::debug!(
            "{} on {}: {} machine sheets is below the {}-sheet minimum",
            candidate.method.label(),
            candidate.sheet.id,
            counts.total_machine_sheets,
            job.rates.offset_min_sheets
        );
        return None;
    };

    let utilization = round_2(sheet_utilization(&fit, candidate.plan.machine));
    let warnings = candidate_warnings(&QualityContext {
        product: &job.product,
        fit: &fit,
        sheet_utilization: utilization,
        method: candidate.method,
        total_machine_sheets: counts.total_machine_sheets,
        offset_min_sheets: job.rates.offset_min_sheets,
        shrink: &job.shrink,
        thresholds: &job.quality,
    });

    Some(ImpositionOption {
        option_rank: 0,
        production_method: candidate.method,
        paper_type_id: candidate.paper.id.clone(),
        sheet_size_id: candidate.sheet.id.clone(),
        sheet_category: candidate.sheet.category,
        orientation: fit.orientation,
        cols: fit.cols,
        rows: fit.rows,
        items_per_sheet: fit.items_per_sheet(),
        machine_sheet: candidate.plan.machine,
        net_machine_sheets: counts.net_machine_sheets,
        total_machine_sheets: counts.total_machine_sheets,
        machine_sheets_per_parent: counts.machine_sheets_per_parent,
        parent_sheets_needed: counts.parent_sheets_needed,
        waste: WasteBreakdown {
            makeready_waste_sheets: counts.makeready_waste_sheets,
            run_waste_sheets: counts.run_waste_sheets,
            total_waste_sheets: counts.waste_sheets(),
        },
        sheet_utilization: utilization,
        is_shrink_used: fit.is_shrink_used(),
        shrink_width_cm: fit.shrink_width_cm,
        shrink_height_cm: fit.shrink_height_cm,
        final_width_cm: fit.final_width_cm,
        final_height_cm: fit.final_height_cm,
        layout_data: layout_data(&fit, candidate.plan.machine, &job.press, job.bleed_cm),
        cost,
        cost_saving_amount: 0.0,
        cost_saving_percent: 0.0,
        warnings,
        explanation: explain(candidate, &fit, &counts, utilization),
    })
}

fn explain(candidate: &Candidate<'_>, fit: &GridFit, counts: &SheetCounts, utilization: f64) -> String {
    let orientation = match fit.orientation {
        Orientation::Normal => "normal",
        Orientation::Rotated => "rotated",
    };

    let mut text = match candidate.method {
        ProductionMethod::Digital => format!(
            "Digital on {} ({:.1}×{:.1} cm) fed directly",
            candidate.sheet.id, candidate.sheet.width_cm, candidate.sheet.height_cm
        ),
        ProductionMethod::Offset => format!(
            "Offset on {} ({:.1}×{:.1} cm) cut {}-up to {:.1}×{:.1} cm machine sheets",
            candidate.sheet.id,
            candidate.sheet.width_cm,
            candidate.sheet.height_cm,
            counts.machine_sheets_per_parent,
            candidate.plan.machine.width_cm,
            candidate.plan.machine.height_cm
        ),
    };

    text.push_str(&format!(
        "; {}×{} {} = {} per sheet at {:.1}% utilization; {} net + {} waste machine sheets from {} parent sheets",
        fit.cols,
        fit.rows,
        orientation,
        fit.items_per_sheet(),
        utilization,
        counts.net_machine_sheets,
        counts.waste_sheets(),
        counts.parent_sheets_needed
    ));

    if fit.is_shrink_used() {
        text.push_str(&format!(
            "; product shrunk to {:.2}×{:.2} cm",
            fit.final_width_cm, fit.final_height_cm
        ));
    }

    text
}
