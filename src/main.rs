//! Coverage System CLI
//!
//! Command-line demo: cascades a sample base level to a requested level count
//! and prints the resulting level table and upsert request envelope.

use clap::Parser;
use coverage_system::cascade::{reconcile, Reconciled};
use coverage_system::level::{
    CoverageFactorCombination, CoverageFactorMapping, CoverageVariantLevel, DimensionEntries,
    FactorValueRef, InsuredLevel, Limit, LimitType,
};
use coverage_system::request::{RequestBuilder, VariantContext};

/// Cascade a sample coverage variant to a target level count
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Target number of coverage levels
    #[arg(short = 'n', long, default_value_t = 3)]
    level_count: usize,

    /// Print the upsert envelope as pretty JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Coverage System v0.1.0");
    println!("======================\n");

    // Sample variant: one base level, AMT aggregate, age x gender factor matrix
    let base = CoverageVariantLevel {
        coverage_variant_level_id: "cvl-1".to_string(),
        description: "Coverage level 1".to_string(),
        multiple_factor: 1,
        aggregate_limit_type: Some(LimitType::Amount),
        aggregate_max_value: 1000.0,
        is_current_version: true,
        dimension: DimensionEntries::Insured(vec![InsuredLevel {
            insured_level_id: "il-1".to_string(),
            insured_type: Some("MAIN_INSURED".to_string()),
            limit: Some(Limit {
                max_limit_type: Some(LimitType::Amount),
                max_amount: 500.0,
                aggregate_limit_type: Some(LimitType::Amount),
                aggregate_max_value: 1000.0,
                ..Default::default()
            }),
            coverage_factor_mapping: Some(CoverageFactorMapping {
                aggregate_limit_type: Some(LimitType::Amount),
                aggregate_max_value: 800.0,
                coverage_factor_combinations: vec![CoverageFactorCombination {
                    coverage_factor_combination_id: Some("cfc-1".to_string()),
                    factor_set: vec![
                        FactorValueRef::new("AGE", "A1"),
                        FactorValueRef::new("GENDER", "G1"),
                    ],
                    limit: Some(Limit {
                        max_amount: 250.0,
                        aggregate_limit_type: Some(LimitType::Amount),
                        aggregate_max_value: 400.0,
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        }]),
        ..Default::default()
    };

    let levels = match reconcile(&[base], args.level_count) {
        Reconciled::Applied(levels) => levels,
        Reconciled::NeedsConfirmation(pending) => {
            println!(
                "Requested count 0 would remove {} stored levels; confirming for the demo.",
                pending.level_count()
            );
            pending.confirm()
        }
    };

    println!("Levels ({}):", levels.len());
    println!(
        "{:>5} {:>8} {:>14} {:<24} {:>8}",
        "Order", "Factor", "AggMaxValue", "Description", "Entries"
    );
    println!("{}", "-".repeat(66));
    for (index, level) in levels.iter().enumerate() {
        println!(
            "{:>5} {:>8} {:>14.2} {:<24} {:>8}",
            level.order(index),
            level.multiple_factor,
            level.aggregate_max_value,
            level.description,
            level.dimension.len(),
        );
    }

    let builder = RequestBuilder::new(VariantContext::default());
    let envelope = builder.upsert_envelope(&levels);
    println!("\nRequest id: {}", envelope.request_id);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }

    Ok(())
}
