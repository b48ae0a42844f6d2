//! Quote calculation
//!
//! This module orchestrates one calculation:
//! 1. Resolve the request against the catalog
//! 2. Enumerate (paper, sheet, method) candidates
//! 3. Lay out, count, price and validate each candidate in parallel
//! 4. Rank the survivors and recommend a method

mod candidate;
mod io;

use crate::catalog::{Catalog, PaperType, SheetSize};
use crate::constants::EPSILON;
use crate::layout::{CutPlan, plan_offset_cut, sheet_utilization};
use crate::options::{QuoteRequest, ResolvedJob, resolve};
use crate::rank::{global_warnings, pricing_summary, rank_options, recommend};
use crate::result::PriceCalculationResult;
use crate::types::*;
use candidate::{Candidate, evaluate, solve};
use rayon::prelude::*;
use std::fmt;

/// Pipeline stage, used to tag log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validating,
    Enumerating,
    Ranking,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Enumerating => "enumerating",
            Stage::Ranking => "ranking",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Compute every feasible imposition option for a request.
///
/// Pure and deterministic: the same request and catalog always produce the
/// same result, option order included.
pub fn calculate(request: &QuoteRequest, catalog: &Catalog) -> Result<PriceCalculationResult> {
    log::debug!(
        "[{}] {}×{} cm × {}",
        Stage::Validating,
        request.product.width_cm,
        request.product.height_cm,
        request.product.quantity
    );
    let outcome = resolve(request, catalog).and_then(calculate_resolved);
    if let Err(e) = &outcome {
        log::debug!("[{}] {}", Stage::Failed, e);
    }
    outcome
}

/// [`calculate`] on the blocking thread pool
pub async fn calculate_async(request: &QuoteRequest, catalog: &Catalog) -> Result<PriceCalculationResult> {
    let request = request.clone();
    let catalog = catalog.clone();

    tokio::task::spawn_blocking(move || calculate(&request, &catalog)).await?
}

fn calculate_resolved(job: ResolvedJob) -> Result<PriceCalculationResult> {
    let mut engine_warnings: Vec<QualityWarning> = job
        .excluded_sheet_ids
        .iter()
        .map(|id| {
            QualityWarning::new(
                WarningKind::SheetExcluded,
                Severity::Warning,
                format!(
                    "Sheet size {} cannot hold a {:.2}×{:.2} cm tile even after shrink; it was not quoted",
                    id, job.tile_width_cm, job.tile_height_cm
                ),
            )
        })
        .collect();
    let priced = priceable_papers(&job, &mut engine_warnings)?;

    let candidates = enumerate(&job, &priced);
    log::debug!(
        "[{}] {} candidates over {} papers and {} sheet sizes",
        Stage::Enumerating,
        candidates.len(),
        priced.len(),
        job.sheet_sizes.len()
    );

    let options: Vec<_> = candidates
        .par_iter()
        .filter_map(|c| evaluate(&job, c))
        .collect();
    log::debug!("[{}] {} feasible options", Stage::Ranking, options.len());

    if options.is_empty() {
        let attempted = job
            .sheet_sizes
            .iter()
            .map(|s| s.id.clone())
            .chain(job.excluded_sheet_ids.iter().cloned())
            .collect();
        return Err(EngineError::NoFeasibleLayout { attempted });
    }

    let options = rank_options(options);
    let recommendation = recommend(&options, &job.ranking, job.rates.offset_min_sheets);
    let warnings = global_warnings(&options, job.ranking.summary_option_count, &engine_warnings);

    let best = &options[0];
    let pricing_summary = pricing_summary(best, job.margin_percentage, job.product.quantity);
    log::info!(
        "[{}] {} options; best {} on {} at {:.2} ({:.2}/unit)",
        Stage::Done,
        options.len(),
        best.production_method.label(),
        best.sheet_size_id,
        best.cost.total_cost,
        best.cost.cost_per_unit
    );

    Ok(PriceCalculationResult {
        input: job,
        recommendation,
        pricing_summary,
        options,
        warnings,
    })
}

/// Papers with a resolvable price. Unpriceable papers are dropped with a
/// warning; it is an error only if none is left.
fn priceable_papers<'a>(
    job: &'a ResolvedJob,
    engine_warnings: &mut Vec<QualityWarning>,
) -> Result<Vec<&'a PaperType>> {
    let mut priced = Vec::new();
    let mut unresolved = Vec::new();

    for paper in &job.paper_types {
        if job.sheet_sizes.iter().any(|s| paper.sheet_price(s).is_some()) {
            priced.push(paper);
        } else {
            log::warn!("Paper type {} has no usable price; skipped", paper.id);
            engine_warnings.push(QualityWarning::new(
                WarningKind::PaperPriceUnresolved,
                Severity::Warning,
                format!(
                    "Paper type {} has neither a sheet price nor a per-kg price with grammage; it was not quoted",
                    paper.id
                ),
            ));
            unresolved.push(paper.id.clone());
        }
    }

    if priced.is_empty() {
        return Err(EngineError::AmbiguousPaperPrice {
            paper_type_ids: unresolved,
        });
    }
    Ok(priced)
}

fn enumerate<'a>(job: &'a ResolvedJob, papers: &[&'a PaperType]) -> Vec<Candidate<'a>> {
    let offset_plans: Vec<(&SheetSize, CutPlan)> = job
        .sheet_sizes
        .iter()
        .filter_map(|sheet| match plan_offset_cut(sheet, &job.press) {
            Some(plan) => Some((sheet, plan)),
            None => {
                log::debug!("Sheet {} cannot be cut to fit the press", sheet.id);
                None
            }
        })
        .collect();
    let digital_sheet = digital_sheet(job);

    let mut candidates = Vec::new();
    for &paper in papers {
        for &(sheet, plan) in &offset_plans {
            if let Some(parent_price) = paper.sheet_price(sheet) {
                candidates.push(Candidate {
                    method: ProductionMethod::Offset,
                    paper,
                    sheet,
                    plan,
                    parent_price,
                });
            }
        }

        if let Some(sheet) = digital_sheet {
            if let Some(parent_price) = paper.sheet_price(sheet) {
                candidates.push(Candidate {
                    method: ProductionMethod::Digital,
                    paper,
                    sheet,
                    plan: CutPlan::whole(sheet),
                    parent_price,
                });
            }
        }
    }

    candidates
}

/// The sheet a digital run is fed on: the press-fittable sheet with the best
/// utilization, then the most items, then the first in catalog order.
fn digital_sheet(job: &ResolvedJob) -> Option<&SheetSize> {
    let mut best: Option<(&SheetSize, f64, u32)> = None;

    for sheet in &job.sheet_sizes {
        if !job.press.fits(sheet.width_cm, sheet.height_cm) {
            continue;
        }
        let plan = CutPlan::whole(sheet);
        let Some(fit) = solve(job, &plan) else {
            continue;
        };
        let utilization = sheet_utilization(&fit, plan.machine);
        let items = fit.items_per_sheet();

        let better = match best {
            Some((_, best_util, best_items)) => {
                utilization > best_util + EPSILON
                    || ((utilization - best_util).abs() <= EPSILON && items > best_items)
            }
            None => true,
        };
        if better {
            best = Some((sheet, utilization, items));
        }
    }

    best.map(|(sheet, _, _)| sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PricingConfiguration;
    use crate::options::ProductSpec;

    fn catalog() -> Catalog {
        Catalog {
            paper_types: vec![PaperType {
                id: "coated-300".to_string(),
                category: "coated".to_string(),
                weight_gsm: Some(300.0),
                price_per_sheet: Some(0.5),
                price_per_kg: None,
            }],
            sheet_sizes: vec![
                SheetSize::new("full", SheetCategory::FullSheet, 100.0, 70.0),
                SheetSize::new("half", SheetCategory::HalfSheet, 50.0, 70.0),
                SheetSize::new("sra3", SheetCategory::QuarterSheet, 32.0, 45.0),
            ],
            finishing_operations: Vec::new(),
            pricing: PricingConfiguration::default(),
        }
    }

    #[test]
    fn test_digital_sheet_prefers_utilization() {
        let request = QuoteRequest::new(ProductSpec::new(9.0, 5.0, 1000));
        let job = resolve(&request, &catalog()).unwrap();
        // 100 × 70 does not fit the 72 × 52 press
        let sheet = digital_sheet(&job).unwrap();
        assert_ne!(sheet.id, "full");
    }

    #[test]
    fn test_offset_candidate_per_cuttable_sheet() {
        let request = QuoteRequest::new(ProductSpec::new(9.0, 5.0, 1000));
        let job = resolve(&request, &catalog()).unwrap();
        let mut warnings = Vec::new();
        let papers = priceable_papers(&job, &mut warnings).unwrap();
        let candidates = enumerate(&job, &papers);

        let offset = candidates
            .iter()
            .filter(|c| c.method == ProductionMethod::Offset)
            .count();
        let digital = candidates
            .iter()
            .filter(|c| c.method == ProductionMethod::Digital)
            .count();
        assert_eq!(offset, 3);
        assert_eq!(digital, 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_digital_sheet_also_has_whole_offset_candidate() {
        let request = QuoteRequest::new(ProductSpec::new(9.0, 5.0, 1000));
        let job = resolve(&request, &catalog()).unwrap();
        let mut warnings = Vec::new();
        let papers = priceable_papers(&job, &mut warnings).unwrap();
        let candidates = enumerate(&job, &papers);

        let digital: Vec<_> = candidates
            .iter()
            .filter(|c| c.method == ProductionMethod::Digital)
            .collect();
        assert!(!digital.is_empty());
        for d in digital {
            assert!(candidates.iter().any(|c| {
                c.method == ProductionMethod::Offset
                    && c.sheet.id == d.sheet.id
                    && c.paper.id == d.paper.id
                    && c.plan == d.plan
            }));
        }
    }

    #[test]
    fn test_unpriceable_papers_are_skipped() {
        let mut catalog = catalog();
        catalog.paper_types.push(PaperType {
            id: "mystery".to_string(),
            category: "uncoated".to_string(),
            weight_gsm: None,
            price_per_sheet: None,
            price_per_kg: Some(1.2),
        });
        let request = QuoteRequest::new(ProductSpec::new(9.0, 5.0, 1000));
        let job = resolve(&request, &catalog).unwrap();

        let mut warnings = Vec::new();
        let papers = priceable_papers(&job, &mut warnings).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::PaperPriceUnresolved);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Enumerating.to_string(), "enumerating");
    }
}
