use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use print_quote::{Catalog, ImpositionOption, PriceCalculationResult, QuoteRequest};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pqt", about = "Print imposition and quoting CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a job against a catalog
    Quote {
        /// Catalog JSON (paper types, sheet sizes, finishing, pricing)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Job JSON (product plus selection filters)
        #[arg(short, long)]
        job: PathBuf,

        /// Write the full result as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the ranked option table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Number of options to print
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Validate a catalog file
    Check {
        #[arg(short, long)]
        catalog: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Quote {
            catalog,
            job,
            json,
            csv,
            top,
        } => {
            let catalog = Catalog::load(&catalog)
                .await
                .with_context(|| format!("loading catalog {}", catalog.display()))?;
            let request = QuoteRequest::load(&job)
                .await
                .with_context(|| format!("loading job {}", job.display()))?;
            log::debug!(
                "Catalog has {} paper types and {} sheet sizes",
                catalog.paper_types.len(),
                catalog.sheet_sizes.len()
            );

            let result = print_quote::calculate_async(&request, &catalog).await?;
            print_summary(&result, top);

            if let Some(path) = json {
                result.save(&path).await?;
                println!("Result → {}", path.display());
            }
            if let Some(path) = csv {
                write_csv(&result.options, &path).await?;
                println!("Options → {}", path.display());
            }
        }

        Commands::Check { catalog } => {
            let path = catalog;
            let catalog = Catalog::load(&path)
                .await
                .with_context(|| format!("loading catalog {}", path.display()))?;
            catalog.validate()?;
            println!("Catalog OK: {}", path.display());
            println!("  Paper types: {}", catalog.paper_types.len());
            println!(
                "  Sheet sizes: {} ({} active)",
                catalog.sheet_sizes.len(),
                catalog.sheet_sizes.iter().filter(|s| s.is_active).count()
            );
            println!(
                "  Finishing operations: {}",
                catalog.finishing_operations.len()
            );
        }
    }

    Ok(())
}

fn print_summary(result: &PriceCalculationResult, top: usize) {
    let summary = &result.pricing_summary;
    println!("Recommendation: {:?}", result.recommendation.method);
    println!("  {}", result.recommendation.reason);
    println!("Pricing:");
    println!("  Cost: {:.2} ({:.4}/unit)", summary.total_cost, summary.cost_per_unit);
    println!(
        "  Selling price at {:.1}% margin: {:.2} ({:.4}/unit)",
        summary.margin_percentage, summary.selling_price, summary.selling_price_per_unit
    );

    println!("Options ({} total):", result.options.len());
    for option in result.options.iter().take(top) {
        println!(
            "  #{} {:<7} {} on {}: {}×{} = {}/sheet, {} sheets, {:.1}% used, {:.2}",
            option.option_rank,
            option.production_method.label(),
            option.paper_type_id,
            option.sheet_size_id,
            option.cols,
            option.rows,
            option.items_per_sheet,
            option.total_machine_sheets,
            option.sheet_utilization,
            option.cost.total_cost
        );
    }

    if !result.warnings.is_empty() {
        println!("Warnings:");
        for warning in &result.warnings {
            println!("  [{:?}] {}", warning.severity, warning.message);
        }
    }
}

async fn write_csv(options: &[ImpositionOption], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "rank",
        "method",
        "paper_type_id",
        "sheet_size_id",
        "orientation",
        "cols",
        "rows",
        "items_per_sheet",
        "machine_width_cm",
        "machine_height_cm",
        "total_machine_sheets",
        "parent_sheets_needed",
        "sheet_utilization",
        "paper_cost",
        "printing_cost",
        "setup_cost",
        "waste_cost",
        "finishing_cost",
        "total_cost",
        "cost_per_unit",
        "cost_saving_percent",
    ])?;

    for o in options {
        writer.write_record([
            o.option_rank.to_string(),
            o.production_method.label().to_string(),
            o.paper_type_id.clone(),
            o.sheet_size_id.clone(),
            format!("{:?}", o.orientation).to_lowercase(),
            o.cols.to_string(),
            o.rows.to_string(),
            o.items_per_sheet.to_string(),
            o.machine_sheet.width_cm.to_string(),
            o.machine_sheet.height_cm.to_string(),
            o.total_machine_sheets.to_string(),
            o.parent_sheets_needed.to_string(),
            format!("{:.2}", o.sheet_utilization),
            format!("{:.2}", o.cost.paper_cost),
            format!("{:.2}", o.cost.printing_cost),
            format!("{:.2}", o.cost.setup_cost),
            format!("{:.2}", o.cost.waste_cost),
            format!("{:.2}", o.cost.finishing_cost),
            format!("{:.2}", o.cost.total_cost),
            format!("{:.2}", o.cost.cost_per_unit),
            format!("{:.2}", o.cost_saving_percent),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
