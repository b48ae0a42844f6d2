use crate::cost::CostBreakdown;
use crate::layout::{LayoutData, MachineSheet};
use crate::options::ResolvedJob;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Spoiled machine sheets for one option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WasteBreakdown {
    pub makeready_waste_sheets: u32,
    pub run_waste_sheets: u32,
    pub total_waste_sheets: u32,
}

/// One fully priced way to produce the job
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpositionOption {
    /// 1 = cheapest
    pub option_rank: u32,
    pub production_method: ProductionMethod,
    pub paper_type_id: String,
    pub sheet_size_id: String,
    pub sheet_category: SheetCategory,

    // Grid
    pub orientation: Orientation,
    pub cols: u32,
    pub rows: u32,
    pub items_per_sheet: u32,

    // Sheets
    pub machine_sheet: MachineSheet,
    pub net_machine_sheets: u32,
    pub total_machine_sheets: u32,
    pub machine_sheets_per_parent: u32,
    pub parent_sheets_needed: u32,
    pub waste: WasteBreakdown,
    /// Percentage of the machine sheet covered by tiles
    pub sheet_utilization: f64,

    // Shrink
    pub is_shrink_used: bool,
    pub shrink_width_cm: f64,
    pub shrink_height_cm: f64,
    pub final_width_cm: f64,
    pub final_height_cm: f64,

    pub layout_data: LayoutData,
    pub cost: CostBreakdown,

    /// Relative to the most expensive option in the result
    pub cost_saving_amount: f64,
    pub cost_saving_percent: f64,

    pub warnings: Vec<QualityWarning>,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Recommendation {
    pub method: RecommendedMethod,
    pub reason: String,
}

/// Headline price, from the cheapest option
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PricingSummary {
    pub total_cost: f64,
    pub cost_per_unit: f64,
    pub margin_percentage: f64,
    pub selling_price: f64,
    pub selling_price_per_unit: f64,
}

/// The engine's only output
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceCalculationResult {
    /// Normalized input the options were computed from
    pub input: ResolvedJob,
    pub recommendation: Recommendation,
    pub pricing_summary: PricingSummary,
    /// Ascending by total cost
    pub options: Vec<ImpositionOption>,
    /// Deduplicated warnings of the top-ranked options plus engine-level warnings
    pub warnings: Vec<QualityWarning>,
}

impl PriceCalculationResult {
    /// The recommended cheapest option
    pub fn best(&self) -> Option<&ImpositionOption> {
        self.options.first()
    }

    /// Options produced with one method, in rank order
    pub fn options_for(&self, method: ProductionMethod) -> impl Iterator<Item = &ImpositionOption> {
        self.options
            .iter()
            .filter(move |o| o.production_method == method)
    }
}
