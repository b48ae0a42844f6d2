use crate::catalog::*;
use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical and design description of the product being quoted
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct ProductSpec {
    // Trimmed size
    pub width_cm: f64,
    pub height_cm: f64,

    pub quantity: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_one"))]
    pub num_pages: u32,

    // Ink counts per side: 1 = mono, 4 = CMYK
    #[cfg_attr(feature = "serde", serde(default = "default_color_front"))]
    pub color_front: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color_back: Option<u8>,

    /// Falls back to the configured default bleed when absent
    #[cfg_attr(feature = "serde", serde(default))]
    pub bleed_cm: Option<f64>,

    // Design attributes
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_text: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_font_size_pt: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_images: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_dpi: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_folding: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_binding: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_die_cutting: bool,

    // Operation counts for per-fold / per-cut finishing
    #[cfg_attr(feature = "serde", serde(default = "default_one"))]
    pub folds_per_unit: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_one"))]
    pub cuts_per_unit: u32,
}

impl ProductSpec {
    /// A single-page, four-colour, one-sided product
    pub fn new(width_cm: f64, height_cm: f64, quantity: u32) -> Self {
        Self {
            width_cm,
            height_cm,
            quantity,
            num_pages: 1,
            color_front: 4,
            color_back: None,
            bleed_cm: None,
            has_text: false,
            min_font_size_pt: None,
            has_images: false,
            image_dpi: None,
            has_folding: false,
            has_binding: false,
            has_die_cutting: false,
            folds_per_unit: 1,
            cuts_per_unit: 1,
        }
    }

    /// Printed sides per leaf
    pub fn sides(&self) -> u32 {
        if self.color_back.is_some() { 2 } else { 1 }
    }

    /// Total plates an offset run needs (one per ink per side)
    pub fn plate_count(&self) -> u32 {
        u32::from(self.color_front) + u32::from(self.color_back.unwrap_or(0))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width_cm.is_finite() && self.width_cm > 0.0) {
            return Err(EngineError::InvalidInput(
                "width_cm must be positive".to_string(),
            ));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(EngineError::InvalidInput(
                "height_cm must be positive".to_string(),
            ));
        }
        if self.quantity == 0 {
            return Err(EngineError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }
        if self.num_pages == 0 {
            return Err(EngineError::InvalidInput(
                "num_pages must be at least 1".to_string(),
            ));
        }
        if !(1..=6).contains(&self.color_front) {
            return Err(EngineError::InvalidInput(
                "color_front must be between 1 and 6 inks".to_string(),
            ));
        }
        if let Some(back) = self.color_back {
            if !(1..=6).contains(&back) {
                return Err(EngineError::InvalidInput(
                    "color_back must be between 1 and 6 inks".to_string(),
                ));
            }
        }
        if let Some(bleed) = self.bleed_cm {
            if !bleed.is_finite() || bleed < 0.0 {
                return Err(EngineError::InvalidInput(
                    "bleed_cm must be non-negative".to_string(),
                ));
            }
        }
        if let Some(pt) = self.min_font_size_pt {
            if !pt.is_finite() || pt <= 0.0 {
                return Err(EngineError::InvalidInput(
                    "min_font_size_pt must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A quoting request: the product plus per-call selection filters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct QuoteRequest {
    pub product: ProductSpec,

    /// Restrict pricing to one paper; all catalog papers otherwise
    #[cfg_attr(feature = "serde", serde(default))]
    pub paper_type_id: Option<String>,
    /// Empty means every active sheet size
    #[cfg_attr(feature = "serde", serde(default))]
    pub sheet_size_ids: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub finishing_operation_ids: Vec<String>,

    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub allow_shrink: bool,

    // Per-call overrides of configuration defaults
    #[cfg_attr(feature = "serde", serde(default))]
    pub margin_percentage: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub waste_percentage: Option<f64>,
}

impl QuoteRequest {
    pub fn new(product: ProductSpec) -> Self {
        Self {
            product,
            paper_type_id: None,
            sheet_size_ids: Vec::new(),
            finishing_operation_ids: Vec::new(),
            allow_shrink: true,
            margin_percentage: None,
            waste_percentage: None,
        }
    }

    /// Load a request from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let request = serde_json::from_slice(&bytes)
            .map_err(|e| EngineError::Config(format!("Failed to parse request: {}", e)))?;
        Ok(request)
    }

    /// Save the request to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize request: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the request on its own (catalog references are checked in [`resolve`])
    pub fn validate(&self) -> Result<()> {
        self.product.validate()?;

        if let Some(margin) = self.margin_percentage {
            if !margin.is_finite() || margin < 0.0 {
                return Err(EngineError::InvalidInput(
                    "margin_percentage must be non-negative".to_string(),
                ));
            }
        }
        if let Some(waste) = self.waste_percentage {
            if !waste.is_finite() || !(0.0..=100.0).contains(&waste) {
                return Err(EngineError::InvalidInput(
                    "waste_percentage must be between 0 and 100".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Resolved Input
// =============================================================================

/// Press geometry every layout is solved against
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PressSetup {
    pub gripper_margin_cm: f64,
    pub item_gap_cm: f64,
    pub machine_max_width_cm: f64,
    pub machine_max_height_cm: f64,
}

impl PressSetup {
    pub fn fits(&self, width: f64, height: f64) -> bool {
        fits_either_way(
            width,
            height,
            self.machine_max_width_cm,
            self.machine_max_height_cm,
        )
    }
}

/// How far the product may be shrunk to make it fit
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShrinkPolicy {
    pub enabled: bool,
    /// Budget for width shrink + height shrink combined
    pub max_cm: f64,
    pub step_cm: f64,
}

impl ShrinkPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max_cm: 0.0,
            step_cm: DEFAULT_SHRINK_STEP_CM,
        }
    }

    /// Shrink actually available for this call
    pub fn budget_cm(&self) -> f64 {
        if self.enabled { self.max_cm } else { 0.0 }
    }
}

/// Prices the cost model reads
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RateCard {
    pub click_mono: f64,
    pub click_color: f64,
    pub digital_min_charge: f64,
    pub ctp_per_plate: f64,
    pub offset_setup: f64,
    pub offset_per_1000_sheets: f64,
    pub offset_min_sheets: u32,
}

/// Spoilage model per production method
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WastePolicy {
    pub makeready_sheets: u32,
    pub offset_run_percentage: f64,
    pub digital_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QualityThresholds {
    pub min_text_size_pt: f64,
    pub min_image_dpi: u32,
    pub shrink_warning_fraction: f64,
    pub low_utilization_percent: f64,
    pub danger_utilization_percent: f64,
    pub offset_marginal_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankingPolicy {
    pub near_tie_tolerance_percent: f64,
    pub summary_option_count: usize,
}

/// Every effective parameter for one calculation, frozen during validation.
///
/// Nothing past [`resolve`] looks at [`PricingConfiguration`] or the raw
/// request again.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedJob {
    pub product: ProductSpec,
    pub bleed_cm: f64,
    pub margin_percentage: f64,

    // Product plus bleed on every edge
    pub tile_width_cm: f64,
    pub tile_height_cm: f64,

    /// Tiles to print: quantity × leaves per copy
    pub tiles_needed: u32,

    pub press: PressSetup,
    pub shrink: ShrinkPolicy,
    pub rates: RateCard,
    pub waste: WastePolicy,
    pub quality: QualityThresholds,
    pub ranking: RankingPolicy,

    pub paper_types: Vec<PaperType>,
    pub sheet_sizes: Vec<SheetSize>,
    /// Requested by id but too small for the tile
    #[cfg_attr(feature = "serde", serde(default))]
    pub excluded_sheet_ids: Vec<String>,
    pub finishing: Vec<FinishingOperation>,
}

/// Validate a request against a catalog and fold in configuration defaults.
pub fn resolve(request: &QuoteRequest, catalog: &Catalog) -> Result<ResolvedJob> {
    request.validate()?;
    catalog.validate()?;

    let config = &catalog.pricing;
    let product = &request.product;

    let paper_types = match &request.paper_type_id {
        Some(id) => {
            let paper = catalog.paper_type(id).ok_or_else(|| {
                EngineError::InvalidInput(format!("Unknown paper type id: {}", id))
            })?;
            vec![paper.clone()]
        }
        None => catalog.paper_types.clone(),
    };
    if paper_types.is_empty() {
        return Err(EngineError::InvalidInput(
            "Catalog has no paper types".to_string(),
        ));
    }

    let candidates: Vec<SheetSize> = if request.sheet_size_ids.is_empty() {
        catalog
            .sheet_sizes
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect()
    } else {
        let mut selected: Vec<SheetSize> = Vec::new();
        for id in &request.sheet_size_ids {
            let sheet = catalog.sheet_size(id).ok_or_else(|| {
                EngineError::InvalidInput(format!("Unknown sheet size id: {}", id))
            })?;
            if !selected.iter().any(|s| s.id == sheet.id) {
                selected.push(sheet.clone());
            }
        }
        selected
    };

    let mut finishing = Vec::new();
    for id in &request.finishing_operation_ids {
        let op = catalog.finishing_operation(id).ok_or_else(|| {
            EngineError::InvalidInput(format!("Unknown finishing operation id: {}", id))
        })?;
        finishing.push(op.clone());
    }

    let bleed_cm = product.bleed_cm.unwrap_or(config.default_bleed_cm);
    let tile_width_cm = product.width_cm + 2.0 * bleed_cm;
    let tile_height_cm = product.height_cm + 2.0 * bleed_cm;

    let shrink = ShrinkPolicy {
        enabled: request.allow_shrink,
        max_cm: config.max_shrink_cm,
        step_cm: config.shrink_step_cm,
    };

    // A sheet is usable only if the tile, shrunk as far as allowed, can sit on it
    let budget = shrink.budget_cm();
    let min_w = (product.width_cm - budget).max(EPSILON) + 2.0 * bleed_cm;
    let min_h = (product.height_cm - budget).max(EPSILON) + 2.0 * bleed_cm;
    let (sheet_sizes, too_small): (Vec<SheetSize>, Vec<SheetSize>) = candidates
        .into_iter()
        .partition(|s| s.can_hold(min_w, min_h));
    if sheet_sizes.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "No available sheet size can hold a {:.2}×{:.2} cm tile",
            tile_width_cm, tile_height_cm
        )));
    }

    // Sheets the caller asked for by id are reported; catalog defaults are not
    let excluded_sheet_ids: Vec<String> = if request.sheet_size_ids.is_empty() {
        Vec::new()
    } else {
        too_small.into_iter().map(|s| s.id).collect()
    };
    for id in &excluded_sheet_ids {
        log::warn!(
            "Sheet size {} cannot hold a {:.2}×{:.2} cm tile even after shrink; skipped",
            id,
            tile_width_cm,
            tile_height_cm
        );
    }

    for sheet in &sheet_sizes {
        let densest = densest_grid(sheet, tile_width_cm, tile_height_cm, config.item_gap_cm);
        if densest > u64::from(MAX_ITEMS_PER_SHEET) {
            return Err(EngineError::InvalidInput(format!(
                "A {}×{} cm tile packs more than {} per sheet on sheet size {}",
                tile_width_cm, tile_height_cm, MAX_ITEMS_PER_SHEET, sheet.id
            )));
        }
    }

    let leaves_per_copy = product.num_pages.div_ceil(product.sides());
    let tiles_needed = product
        .quantity
        .checked_mul(leaves_per_copy)
        .ok_or_else(|| EngineError::InvalidInput("quantity × pages is too large".to_string()))?;

    let digital_percentage = request
        .waste_percentage
        .unwrap_or(config.default_waste_percentage);
    let offset_run_percentage = request
        .waste_percentage
        .unwrap_or(config.run_waste_percentage);

    // Worst case is one tile per sheet with full waste on top
    let worst_run_percentage = digital_percentage.max(offset_run_percentage);
    let worst_sheets = tiles_needed as f64 * (1.0 + worst_run_percentage / 100.0)
        + config.makeready_waste_sheets as f64;
    if worst_sheets >= u32::MAX as f64 {
        return Err(EngineError::InvalidInput(format!(
            "quantity {} is too large to count machine sheets",
            product.quantity
        )));
    }

    let mut product = product.clone();
    product.bleed_cm = Some(bleed_cm);

    Ok(ResolvedJob {
        product,
        bleed_cm,
        margin_percentage: request
            .margin_percentage
            .unwrap_or(config.default_margin_percentage),
        tile_width_cm,
        tile_height_cm,
        tiles_needed,
        press: PressSetup {
            gripper_margin_cm: config.gripper_margin_cm,
            item_gap_cm: config.item_gap_cm,
            machine_max_width_cm: config.machine_max_width_cm,
            machine_max_height_cm: config.machine_max_height_cm,
        },
        shrink,
        rates: RateCard {
            click_mono: config.digital_cost_per_click_mono,
            click_color: config.digital_cost_per_click_color,
            digital_min_charge: config.digital_min_charge,
            ctp_per_plate: config.offset_ctp_cost_per_plate,
            offset_setup: config.offset_setup_cost,
            offset_per_1000_sheets: config.offset_cost_per_1000_sheets,
            offset_min_sheets: config.offset_min_sheets,
        },
        waste: WastePolicy {
            makeready_sheets: config.makeready_waste_sheets,
            offset_run_percentage,
            digital_percentage,
        },
        quality: QualityThresholds {
            min_text_size_pt: config.min_text_size_pt,
            min_image_dpi: config.min_image_dpi,
            shrink_warning_fraction: config.shrink_warning_fraction,
            low_utilization_percent: config.low_utilization_percent,
            danger_utilization_percent: config.danger_utilization_percent,
            offset_marginal_factor: config.offset_marginal_factor,
        },
        ranking: RankingPolicy {
            near_tie_tolerance_percent: config.near_tie_tolerance_percent,
            summary_option_count: config.summary_option_count,
        },
        paper_types,
        sheet_sizes,
        excluded_sheet_ids,
        finishing,
    })
}

/// Upper bound on tiles per sheet for any machine sheet cut from `sheet`
fn densest_grid(sheet: &SheetSize, tile_width: f64, tile_height: f64, gap: f64) -> u64 {
    let along = |available: f64, tile: f64| u64::from(floor_count((available + gap) / (tile + gap)));
    let normal = along(sheet.width_cm, tile_width) * along(sheet.height_cm, tile_height);
    let rotated = along(sheet.width_cm, tile_height) * along(sheet.height_cm, tile_width);
    normal.max(rotated)
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_one() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn default_color_front() -> u8 {
    4
}
