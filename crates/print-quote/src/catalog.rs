//! Read-only catalog entities supplied by the caller for one calculation

use crate::constants::*;
use crate::types::*;
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Paper stock and how it is priced
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct PaperType {
    pub id: String,
    pub category: String,
    /// Grammage (g/m²); needed to derive a sheet price from a per-kg price
    #[cfg_attr(feature = "serde", serde(default))]
    pub weight_gsm: Option<f64>,
    /// Price of one parent sheet; wins over `price_per_kg` when both are set
    #[cfg_attr(feature = "serde", serde(default))]
    pub price_per_sheet: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub price_per_kg: Option<f64>,
}

impl PaperType {
    /// Resolve the price of one sheet of the given size.
    ///
    /// Returns `None` when neither a per-sheet price nor a per-kg price with
    /// a grammage is available.
    pub fn sheet_price(&self, sheet: &SheetSize) -> Option<f64> {
        if let Some(price) = self.price_per_sheet {
            return Some(price);
        }
        match (self.price_per_kg, self.weight_gsm) {
            (Some(per_kg), Some(gsm)) if gsm > 0.0 => {
                let area_m2 = (sheet.width_cm / 100.0) * (sheet.height_cm / 100.0);
                let weight_kg = area_m2 * gsm / 1000.0;
                Some(per_kg * weight_kg)
            }
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::Config("Paper type id is empty".to_string()));
        }
        for (label, value) in [
            ("weight_gsm", self.weight_gsm),
            ("price_per_sheet", self.price_per_sheet),
            ("price_per_kg", self.price_per_kg),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(EngineError::Config(format!(
                        "Paper type {}: {} must be a non-negative number",
                        self.id, label
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parent sheet as purchased
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct SheetSize {
    pub id: String,
    pub category: SheetCategory,
    pub width_cm: f64,
    pub height_cm: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub is_active: bool,
}

impl SheetSize {
    pub fn new(id: impl Into<String>, category: SheetCategory, width_cm: f64, height_cm: f64) -> Self {
        Self {
            id: id.into(),
            category,
            width_cm,
            height_cm,
            is_active: true,
        }
    }

    pub fn area_cm2(&self) -> f64 {
        self.width_cm * self.height_cm
    }

    /// Whether a `width × height` rectangle fits on this sheet in either orientation
    pub fn can_hold(&self, width: f64, height: f64) -> bool {
        fits_either_way(width, height, self.width_cm, self.height_cm)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::Config("Sheet size id is empty".to_string()));
        }
        if !(self.width_cm.is_finite() && self.width_cm > 0.0)
            || !(self.height_cm.is_finite() && self.height_cm > 0.0)
        {
            return Err(EngineError::Config(format!(
                "Sheet size {} must have positive dimensions",
                self.id
            )));
        }
        Ok(())
    }
}

/// Post-press operation and its charge
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct FinishingOperation {
    pub id: String,
    pub pricing_type: PricingType,
    pub cost: f64,
    /// Floor applied to this operation's computed charge
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_cost: Option<f64>,
}

impl FinishingOperation {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::Config(
                "Finishing operation id is empty".to_string(),
            ));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(EngineError::Config(format!(
                "Finishing operation {}: cost must be non-negative",
                self.id
            )));
        }
        if let Some(min) = self.min_cost {
            if !min.is_finite() || min < 0.0 {
                return Err(EngineError::Config(format!(
                    "Finishing operation {}: min_cost must be non-negative",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Shop-wide pricing and press configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct PricingConfiguration {
    // Digital
    pub digital_cost_per_click_mono: f64,
    pub digital_cost_per_click_color: f64,
    pub digital_min_charge: f64,

    // Offset
    pub offset_ctp_cost_per_plate: f64,
    pub offset_setup_cost: f64,
    pub offset_cost_per_1000_sheets: f64,
    pub offset_min_sheets: u32,

    // Press geometry
    #[cfg_attr(feature = "serde", serde(default = "default_gripper_margin_cm"))]
    pub gripper_margin_cm: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_item_gap_cm"))]
    pub item_gap_cm: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_machine_max_width_cm"))]
    pub machine_max_width_cm: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_machine_max_height_cm"))]
    pub machine_max_height_cm: f64,

    // Job defaults
    #[cfg_attr(feature = "serde", serde(default = "default_bleed_cm"))]
    pub default_bleed_cm: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_margin_percentage"))]
    pub default_margin_percentage: f64,
    /// Proportional spoilage for digital runs (%)
    #[cfg_attr(feature = "serde", serde(default = "default_waste_percentage"))]
    pub default_waste_percentage: f64,

    // Waste
    #[cfg_attr(feature = "serde", serde(default = "default_makeready_waste_sheets"))]
    pub makeready_waste_sheets: u32,
    /// Proportional spoilage for offset runs (%)
    #[cfg_attr(feature = "serde", serde(default = "default_run_waste_percentage"))]
    pub run_waste_percentage: f64,

    // Quality
    #[cfg_attr(feature = "serde", serde(default = "default_min_text_size_pt"))]
    pub min_text_size_pt: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_min_image_dpi"))]
    pub min_image_dpi: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_max_shrink_cm"))]
    pub max_shrink_cm: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_shrink_step_cm"))]
    pub shrink_step_cm: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_shrink_warning_fraction"))]
    pub shrink_warning_fraction: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_low_utilization_percent"))]
    pub low_utilization_percent: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_danger_utilization_percent"))]
    pub danger_utilization_percent: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_offset_marginal_factor"))]
    pub offset_marginal_factor: f64,

    // Ranking
    #[cfg_attr(feature = "serde", serde(default = "default_near_tie_tolerance_percent"))]
    pub near_tie_tolerance_percent: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_summary_option_count"))]
    pub summary_option_count: usize,
}

impl Default for PricingConfiguration {
    fn default() -> Self {
        Self {
            digital_cost_per_click_mono: 0.05,
            digital_cost_per_click_color: 0.25,
            digital_min_charge: 10.0,
            offset_ctp_cost_per_plate: 15.0,
            offset_setup_cost: 60.0,
            offset_cost_per_1000_sheets: 40.0,
            offset_min_sheets: 500,
            gripper_margin_cm: DEFAULT_GRIPPER_MARGIN_CM,
            item_gap_cm: DEFAULT_ITEM_GAP_CM,
            machine_max_width_cm: DEFAULT_MACHINE_MAX_WIDTH_CM,
            machine_max_height_cm: DEFAULT_MACHINE_MAX_HEIGHT_CM,
            default_bleed_cm: DEFAULT_BLEED_CM,
            default_margin_percentage: DEFAULT_MARGIN_PERCENTAGE,
            default_waste_percentage: DEFAULT_WASTE_PERCENTAGE,
            makeready_waste_sheets: DEFAULT_MAKEREADY_WASTE_SHEETS,
            run_waste_percentage: DEFAULT_RUN_WASTE_PERCENTAGE,
            min_text_size_pt: DEFAULT_MIN_TEXT_SIZE_PT,
            min_image_dpi: DEFAULT_MIN_IMAGE_DPI,
            max_shrink_cm: DEFAULT_MAX_SHRINK_CM,
            shrink_step_cm: DEFAULT_SHRINK_STEP_CM,
            shrink_warning_fraction: DEFAULT_SHRINK_WARNING_FRACTION,
            low_utilization_percent: DEFAULT_LOW_UTILIZATION_PERCENT,
            danger_utilization_percent: DEFAULT_DANGER_UTILIZATION_PERCENT,
            offset_marginal_factor: DEFAULT_OFFSET_MARGINAL_FACTOR,
            near_tie_tolerance_percent: DEFAULT_NEAR_TIE_TOLERANCE_PERCENT,
            summary_option_count: DEFAULT_SUMMARY_OPTION_COUNT,
        }
    }
}

impl PricingConfiguration {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("digital_cost_per_click_mono", self.digital_cost_per_click_mono),
            ("digital_cost_per_click_color", self.digital_cost_per_click_color),
            ("digital_min_charge", self.digital_min_charge),
            ("offset_ctp_cost_per_plate", self.offset_ctp_cost_per_plate),
            ("offset_setup_cost", self.offset_setup_cost),
            ("offset_cost_per_1000_sheets", self.offset_cost_per_1000_sheets),
            ("gripper_margin_cm", self.gripper_margin_cm),
            ("item_gap_cm", self.item_gap_cm),
            ("default_bleed_cm", self.default_bleed_cm),
            ("default_margin_percentage", self.default_margin_percentage),
            ("default_waste_percentage", self.default_waste_percentage),
            ("run_waste_percentage", self.run_waste_percentage),
            ("min_text_size_pt", self.min_text_size_pt),
            ("max_shrink_cm", self.max_shrink_cm),
            ("low_utilization_percent", self.low_utilization_percent),
            ("danger_utilization_percent", self.danger_utilization_percent),
            ("near_tie_tolerance_percent", self.near_tie_tolerance_percent),
        ];
        for (label, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Config(format!(
                    "{} must be a non-negative number",
                    label
                )));
            }
        }

        if self.machine_max_width_cm <= 0.0 || self.machine_max_height_cm <= 0.0 {
            return Err(EngineError::Config(
                "Machine press bed must have positive dimensions".to_string(),
            ));
        }
        if !(self.shrink_step_cm > 0.0) {
            return Err(EngineError::Config(
                "shrink_step_cm must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.shrink_warning_fraction) {
            return Err(EngineError::Config(
                "shrink_warning_fraction must be between 0 and 1".to_string(),
            ));
        }
        if !(self.offset_marginal_factor >= 1.0) {
            return Err(EngineError::Config(
                "offset_marginal_factor must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a `width × height` sheet can be fed through the press
    pub fn fits_press(&self, width: f64, height: f64) -> bool {
        fits_either_way(
            width,
            height,
            self.machine_max_width_cm,
            self.machine_max_height_cm,
        )
    }
}

/// Everything the engine reads besides the request
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct Catalog {
    #[cfg_attr(feature = "serde", serde(default))]
    pub paper_types: Vec<PaperType>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sheet_sizes: Vec<SheetSize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub finishing_operations: Vec<FinishingOperation>,
    pub pricing: PricingConfiguration,
}

impl Catalog {
    /// Validate every entity and check that ids are unique per collection
    pub fn validate(&self) -> Result<()> {
        for paper in &self.paper_types {
            paper.validate()?;
        }
        for sheet in &self.sheet_sizes {
            sheet.validate()?;
        }
        for op in &self.finishing_operations {
            op.validate()?;
        }
        self.pricing.validate()?;

        ensure_unique("paper type", self.paper_types.iter().map(|p| p.id.as_str()))?;
        ensure_unique("sheet size", self.sheet_sizes.iter().map(|s| s.id.as_str()))?;
        ensure_unique(
            "finishing operation",
            self.finishing_operations.iter().map(|f| f.id.as_str()),
        )?;

        Ok(())
    }

    pub fn paper_type(&self, id: &str) -> Option<&PaperType> {
        self.paper_types.iter().find(|p| p.id == id)
    }

    pub fn sheet_size(&self, id: &str) -> Option<&SheetSize> {
        self.sheet_sizes.iter().find(|s| s.id == id)
    }

    pub fn finishing_operation(&self, id: &str) -> Option<&FinishingOperation> {
        self.finishing_operations.iter().find(|f| f.id == id)
    }
}

fn ensure_unique<'a>(label: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(EngineError::Config(format!("Duplicate {} id: {}", label, id)));
        }
    }
    Ok(())
}

pub(crate) fn fits_either_way(width: f64, height: f64, bound_w: f64, bound_h: f64) -> bool {
    (width <= bound_w + EPSILON && height <= bound_h + EPSILON)
        || (height <= bound_w + EPSILON && width <= bound_h + EPSILON)
}

// serde default helpers

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}
#[cfg(feature = "serde")]
fn default_gripper_margin_cm() -> f64 {
    DEFAULT_GRIPPER_MARGIN_CM
}
#[cfg(feature = "serde")]
fn default_item_gap_cm() -> f64 {
    DEFAULT_ITEM_GAP_CM
}
#[cfg(feature = "serde")]
fn default_machine_max_width_cm() -> f64 {
    DEFAULT_MACHINE_MAX_WIDTH_CM
}
#[cfg(feature = "serde")]
fn default_machine_max_height_cm() -> f64 {
    DEFAULT_MACHINE_MAX_HEIGHT_CM
}
#[cfg(feature = "serde")]
fn default_bleed_cm() -> f64 {
    DEFAULT_BLEED_CM
}
#[cfg(feature = "serde")]
fn default_margin_percentage() -> f64 {
    DEFAULT_MARGIN_PERCENTAGE
}
#[cfg(feature = "serde")]
fn default_waste_percentage() -> f64 {
    DEFAULT_WASTE_PERCENTAGE
}
#[cfg(feature = "serde")]
fn default_makeready_waste_sheets() -> u32 {
    DEFAULT_MAKEREADY_WASTE_SHEETS
}
#[cfg(feature = "serde")]
fn default_run_waste_percentage() -> f64 {
    DEFAULT_RUN_WASTE_PERCENTAGE
}
#[cfg(feature = "serde")]
fn default_min_text_size_pt() -> f64 {
    DEFAULT_MIN_TEXT_SIZE_PT
}
#[cfg(feature = "serde")]
fn default_min_image_dpi() -> u32 {
    DEFAULT_MIN_IMAGE_DPI
}
#[cfg(feature = "serde")]
fn default_max_shrink_cm() -> f64 {
    DEFAULT_MAX_SHRINK_CM
}
#[cfg(feature = "serde")]
fn default_shrink_step_cm() -> f64 {
    DEFAULT_SHRINK_STEP_CM
}
#[cfg(feature = "serde")]
fn default_shrink_warning_fraction() -> f64 {
    DEFAULT_SHRINK_WARNING_FRACTION
}
#[cfg(feature = "serde")]
fn default_low_utilization_percent() -> f64 {
    DEFAULT_LOW_UTILIZATION_PERCENT
}
#[cfg(feature = "serde")]
fn default_danger_utilization_percent() -> f64 {
    DEFAULT_DANGER_UTILIZATION_PERCENT
}
#[cfg(feature = "serde")]
fn default_offset_marginal_factor() -> f64 {
    DEFAULT_OFFSET_MARGINAL_FACTOR
}
#[cfg(feature = "serde")]
fn default_near_tie_tolerance_percent() -> f64 {
    DEFAULT_NEAR_TIE_TOLERANCE_PERCENT
}
#[cfg(feature = "serde")]
fn default_summary_option_count() -> usize {
    DEFAULT_SUMMARY_OPTION_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(price_per_sheet: Option<f64>, price_per_kg: Option<f64>, gsm: Option<f64>) -> PaperType {
        PaperType {
            id: "coated-300".to_string(),
            category: "coated".to_string(),
            weight_gsm: gsm,
            price_per_sheet,
            price_per_kg,
        }
    }

    #[test]
    fn test_sheet_price_prefers_per_sheet() {
        let sheet = SheetSize::new("full", SheetCategory::FullSheet, 100.0, 70.0);
        let p = paper(Some(1.5), Some(2.0), Some(300.0));
        assert_eq!(p.sheet_price(&sheet), Some(1.5));
    }

    #[test]
    fn test_sheet_price_from_per_kg() {
        // 1.0 m × 0.7 m × 300 g/m² = 0.21 kg
        let sheet = SheetSize::new("full", SheetCategory::FullSheet, 100.0, 70.0);
        let p = paper(None, Some(2.0), Some(300.0));
        let price = p.sheet_price(&sheet).unwrap();
        assert!((price - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_sheet_price_unresolvable() {
        let sheet = SheetSize::new("full", SheetCategory::FullSheet, 100.0, 70.0);
        assert_eq!(paper(None, Some(2.0), None).sheet_price(&sheet), None);
        assert_eq!(paper(None, None, Some(300.0)).sheet_price(&sheet), None);
    }

    #[test]
    fn test_can_hold_either_orientation() {
        let sheet = SheetSize::new("half", SheetCategory::HalfSheet, 50.0, 70.0);
        assert!(sheet.can_hold(70.0, 50.0));
        assert!(sheet.can_hold(50.0, 70.0));
        assert!(!sheet.can_hold(71.0, 50.0));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(PricingConfiguration::default().validate().is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let catalog = Catalog {
            sheet_sizes: vec![
                SheetSize::new("a", SheetCategory::FullSheet, 100.0, 70.0),
                SheetSize::new("a", SheetCategory::HalfSheet, 50.0, 70.0),
            ],
            ..Default::default()
        };
        match catalog.validate() {
            Err(EngineError::Config(msg)) => assert!(msg.contains("Duplicate sheet size")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_shrink_step_rejected() {
        let config = PricingConfiguration {
            shrink_step_cm: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
