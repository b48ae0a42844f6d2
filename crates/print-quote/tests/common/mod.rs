#![allow(dead_code)]

use print_quote::*;

pub fn coated_paper() -> PaperType {
    PaperType {
        id: "coated-300".to_string(),
        category: "coated".to_string(),
        weight_gsm: Some(300.0),
        price_per_sheet: Some(0.5),
        price_per_kg: None,
    }
}

/// Priced by weight: 100 × 70 cm at 120 g/m² and 2.00/kg = 0.168 per sheet
pub fn offset_paper() -> PaperType {
    PaperType {
        id: "offset-120".to_string(),
        category: "uncoated".to_string(),
        weight_gsm: Some(120.0),
        price_per_sheet: None,
        price_per_kg: Some(2.0),
    }
}

pub fn shop_catalog() -> Catalog {
    Catalog {
        paper_types: vec![coated_paper(), offset_paper()],
        sheet_sizes: vec![
            SheetSize::new("full", SheetCategory::FullSheet, 100.0, 70.0),
            SheetSize::new("half", SheetCategory::HalfSheet, 70.0, 50.0),
            SheetSize::new("sra3", SheetCategory::QuarterSheet, 32.0, 45.0),
        ],
        finishing_operations: vec![
            FinishingOperation {
                id: "guillotine".to_string(),
                pricing_type: PricingType::Fixed,
                cost: 12.0,
                min_cost: None,
            },
            FinishingOperation {
                id: "lamination".to_string(),
                pricing_type: PricingType::PerSheet,
                cost: 0.08,
                min_cost: Some(20.0),
            },
        ],
        pricing: PricingConfiguration {
            offset_min_sheets: 100,
            ..PricingConfiguration::default()
        },
    }
}

/// One 100 × 70 sheet on a press large enough to take it whole
pub fn full_sheet_catalog(offset_min_sheets: u32) -> Catalog {
    Catalog {
        paper_types: vec![coated_paper()],
        sheet_sizes: vec![SheetSize::new("full", SheetCategory::FullSheet, 100.0, 70.0)],
        finishing_operations: Vec::new(),
        pricing: PricingConfiguration {
            machine_max_width_cm: 100.0,
            machine_max_height_cm: 70.0,
            gripper_margin_cm: 1.0,
            item_gap_cm: 0.2,
            offset_min_sheets,
            ..PricingConfiguration::default()
        },
    }
}

pub fn business_cards(quantity: u32) -> QuoteRequest {
    QuoteRequest::new(ProductSpec::new(9.0, 5.0, quantity))
}
