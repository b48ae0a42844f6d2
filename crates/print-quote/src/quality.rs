//! Quality warnings
//!
//! Warnings annotate an option; they never remove it.

use crate::constants::EPSILON;
use crate::layout::GridFit;
use crate::options::{ProductSpec, QualityThresholds, ShrinkPolicy};
use crate::types::*;

/// What the validator looks at for one candidate
#[derive(Debug, Clone, Copy)]
pub struct QualityContext<'a> {
    pub product: &'a ProductSpec,
    pub fit: &'a GridFit,
    pub sheet_utilization: f64,
    pub method: ProductionMethod,
    pub total_machine_sheets: u32,
    pub offset_min_sheets: u32,
    pub shrink: &'a ShrinkPolicy,
    pub thresholds: &'a QualityThresholds,
}

/// Warnings that depend only on the artwork
pub fn design_warnings(product: &ProductSpec, thresholds: &QualityThresholds) -> Vec<QualityWarning> {
    let mut warnings = Vec::new();

    if product.has_text {
        if let Some(pt) = product.min_font_size_pt {
            if pt < thresholds.min_text_size_pt {
                warnings.push(QualityWarning::new(
                    WarningKind::SmallText,
                    Severity::Warning,
                    format!(
                        "Smallest text is {:.1}pt, below the {:.1}pt minimum for legible print",
                        pt, thresholds.min_text_size_pt
                    ),
                ));
            }
        }
    }

    if product.has_images {
        if let Some(dpi) = product.image_dpi {
            if dpi < thresholds.min_image_dpi {
                warnings.push(QualityWarning::new(
                    WarningKind::LowImageResolution,
                    Severity::Warning,
                    format!(
                        "Images are {} dpi, below the {} dpi minimum; expect visible pixelation",
                        dpi, thresholds.min_image_dpi
                    ),
                ));
            }
        }
    }

    warnings
}

/// All warnings for one candidate, artwork warnings first
pub fn candidate_warnings(ctx: &QualityContext<'_>) -> Vec<QualityWarning> {
    let mut warnings = design_warnings(ctx.product, ctx.thresholds);
    let t = ctx.thresholds;

    if ctx.fit.is_shrink_used() {
        let total = ctx.fit.total_shrink_cm();
        if total > ctx.shrink.max_cm * t.shrink_warning_fraction + EPSILON {
            warnings.push(QualityWarning::new(
                WarningKind::ExcessiveShrink,
                Severity::Warning,
                format!(
                    "Product reduced by {:.2}×{:.2} cm to {:.2}×{:.2} cm, over {:.0}% of the allowed shrink",
                    ctx.fit.shrink_width_cm,
                    ctx.fit.shrink_height_cm,
                    ctx.fit.final_width_cm,
                    ctx.fit.final_height_cm,
                    t.shrink_warning_fraction * 100.0
                ),
            ));
        }

        let exhausted = total >= ctx.shrink.max_cm - ctx.shrink.step_cm / 2.0;
        if exhausted && ctx.sheet_utilization < t.danger_utilization_percent {
            warnings.push(QualityWarning::new(
                WarningKind::ShrinkExhausted,
                Severity::Danger,
                format!(
                    "Shrink budget fully used and only {:.1}% of the sheet is covered",
                    ctx.sheet_utilization
                ),
            ));
        }
    }

    if ctx.sheet_utilization < t.low_utilization_percent {
        warnings.push(QualityWarning::new(
            WarningKind::LowUtilization,
            Severity::Info,
            format!(
                "Only {:.1}% of the sheet is used; a different sheet size may waste less paper",
                ctx.sheet_utilization
            ),
        ));
    }

    if ctx.method == ProductionMethod::Offset {
        let marginal = ctx.offset_min_sheets as f64 * t.offset_marginal_factor;
        if (ctx.total_machine_sheets as f64) < marginal {
            warnings.push(QualityWarning::new(
                WarningKind::MarginalOffsetVolume,
                Severity::Info,
                format!(
                    "Offset run of {} sheets is close to the {}-sheet minimum; digital may be cheaper at this volume",
                    ctx.total_machine_sheets, ctx.offset_min_sheets
                ),
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> QualityThresholds {
        QualityThresholds {
            min_text_size_pt: 6.0,
            min_image_dpi: 300,
            shrink_warning_fraction: 0.5,
            low_utilization_percent: 50.0,
            danger_utilization_percent: 30.0,
            offset_marginal_factor: 1.2,
        }
    }

    fn shrink() -> ShrinkPolicy {
        ShrinkPolicy {
            enabled: true,
            max_cm: 0.5,
            step_cm: 0.1,
        }
    }

    fn fit(shrink_w: f64, shrink_h: f64) -> GridFit {
        GridFit {
            cols: 2,
            rows: 2,
            orientation: Orientation::Normal,
            tile_width_cm: 10.0,
            tile_height_cm: 10.0,
            shrink_width_cm: shrink_w,
            shrink_height_cm: shrink_h,
            final_width_cm: 10.0 - shrink_w,
            final_height_cm: 10.0 - shrink_h,
        }
    }

    fn kinds(warnings: &[QualityWarning]) -> Vec<WarningKind> {
        warnings.iter().map(|w| w.kind).collect()
    }

    #[test]
    fn test_design_warnings() {
        let mut product = ProductSpec::new(9.0, 5.0, 100);
        product.has_text = true;
        product.min_font_size_pt = Some(5.0);
        product.has_images = true;
        product.image_dpi = Some(150);

        let warnings = design_warnings(&product, &thresholds());
        assert_eq!(
            kinds(&warnings),
            vec![WarningKind::SmallText, WarningKind::LowImageResolution]
        );
        assert!(warnings.iter().all(|w| w.severity == Severity::Warning));
    }

    #[test]
    fn test_design_attributes_ignored_when_flag_off() {
        let mut product = ProductSpec::new(9.0, 5.0, 100);
        product.min_font_size_pt = Some(4.0);
        product.image_dpi = Some(72);
        assert!(design_warnings(&product, &thresholds()).is_empty());
    }

    #[test]
    fn test_clean_candidate_has_no_warnings() {
        let product = ProductSpec::new(9.0, 5.0, 100);
        let f = fit(0.0, 0.0);
        let ctx = QualityContext {
            product: &product,
            fit: &f,
            sheet_utilization: 80.0,
            method: ProductionMethod::Digital,
            total_machine_sheets: 10,
            offset_min_sheets: 500,
            shrink: &shrink(),
            thresholds: &thresholds(),
        };
        assert!(candidate_warnings(&ctx).is_empty());
    }

    #[test]
    fn test_shrink_and_utilization_warnings() {
        let product = ProductSpec::new(9.0, 5.0, 100);
        let f = fit(0.3, 0.2);
        let ctx = QualityContext {
            product: &product,
            fit: &f,
            sheet_utilization: 20.0,
            method: ProductionMethod::Digital,
            total_machine_sheets: 10,
            offset_min_sheets: 500,
            shrink: &shrink(),
            thresholds: &thresholds(),
        };
        let warnings = candidate_warnings(&ctx);
        assert_eq!(
            kinds(&warnings),
            vec![
                WarningKind::ExcessiveShrink,
                WarningKind::ShrinkExhausted,
                WarningKind::LowUtilization
            ]
        );
        assert_eq!(warnings[1].severity, Severity::Danger);
        assert_eq!(warnings[2].severity, Severity::Info);
    }

    #[test]
    fn test_half_budget_shrink_is_not_excessive() {
        let product = ProductSpec::new(9.0, 5.0, 100);
        let f = fit(0.25, 0.0);
        let ctx = QualityContext {
            product: &product,
            fit: &f,
            sheet_utilization: 80.0,
            method: ProductionMethod::Digital,
            total_machine_sheets: 10,
            offset_min_sheets: 500,
            shrink: &shrink(),
            thresholds: &thresholds(),
        };
        assert!(candidate_warnings(&ctx).is_empty());
    }

    #[test]
    fn test_marginal_offset_volume() {
        let product = ProductSpec::new(9.0, 5.0, 100);
        let f = fit(0.0, 0.0);
        let mut ctx = QualityContext {
            product: &product,
            fit: &f,
            sheet_utilization: 80.0,
            method: ProductionMethod::Offset,
            total_machine_sheets: 550,
            offset_min_sheets: 500,
            shrink: &shrink(),
            thresholds: &thresholds(),
        };
        assert_eq!(
            kinds(&candidate_warnings(&ctx)),
            vec![WarningKind::MarginalOffsetVolume]
        );

        ctx.total_machine_sheets = 600;
        assert!(candidate_warnings(&ctx).is_empty());
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Danger);
    }
}
