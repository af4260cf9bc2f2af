//! Derive additional coverage levels by cascading a base level's amounts
//!
//! Each derived level is a deep copy of the base with identities cleared and
//! aggregate amounts multiplied by its integer multiple factor. Percentage
//! aggregates are relative to another variant and never scale with the level
//! count. Plain `max_amount` fields are never auto-multiplied; only amounts
//! tagged as aggregates cascade.

use crate::level::{
    cascade_factor, description_stem, CoverageVariantLevel, DimensionEntries, Limit,
};

/// Produce levels `2..=target_count` derived from the base (first) level.
/// The base itself is the caller's level 1 and is not modified.
pub fn cascade(base: &CoverageVariantLevel, target_count: usize) -> Vec<CoverageVariantLevel> {
    (2..=target_count as u32)
        .map(|factor| cascade_one(base, factor))
        .collect()
}

/// Derive a single level at the given multiple factor
pub fn cascade_one(base: &CoverageVariantLevel, factor: u32) -> CoverageVariantLevel {
    let mut level = base.clone();

    // New record: the server assigns the identity on create
    level.coverage_variant_level_id = String::new();
    level.description = format!("{} {}", description_stem(&base.description), factor);
    level.multiple_factor = factor;
    level.aggregate_max_value =
        base.aggregate_max_value * cascade_factor(base.aggregate_limit_type, factor) as f64;

    match &mut level.dimension {
        DimensionEntries::Insured(entries) => {
            for entry in entries {
                entry.insured_level_id = String::new();
                if let Some(limit) = entry.limit.as_mut() {
                    scale_aggregate(limit, factor);
                }
                if let Some(mapping) = entry.coverage_factor_mapping.as_mut() {
                    mapping.aggregate_max_value *= cascade_factor(
                        mapping.aggregate_limit_type,
                        factor,
                    ) as f64;
                    for combination in &mut mapping.coverage_factor_combinations {
                        combination.coverage_factor_combination_id = None;
                        if let Some(limit) = combination.limit.as_mut() {
                            scale_aggregate(limit, factor);
                        }
                    }
                }
            }
        }
        DimensionEntries::InsuredObject(entries) => {
            for entry in entries {
                entry.insured_object_level_id = String::new();
                if let Some(limit) = entry.limit.as_mut() {
                    scale_aggregate(limit, factor);
                }
            }
        }
        DimensionEntries::InsuredEvent(entries) => {
            for entry in entries {
                entry.insured_event_level_id = String::new();
                if let Some(limit) = entry.limit.as_mut() {
                    scale_aggregate(limit, factor);
                }
            }
        }
    }

    level
}

/// Multiply a limit's aggregate value by the level factor, gated by the
/// limit's own aggregate type
fn scale_aggregate(limit: &mut Limit, factor: u32) {
    limit.aggregate_max_value *= cascade_factor(limit.aggregate_limit_type, factor) as f64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{
        CoverageFactorCombination, CoverageFactorMapping, FactorValueRef, InsuredLevel,
        InsuredObjectLevel, LimitType,
    };
    use approx::assert_relative_eq;

    fn base_level() -> CoverageVariantLevel {
        CoverageVariantLevel {
            coverage_variant_level_id: "cvl-1".to_string(),
            description: "Coverage level 1".to_string(),
            multiple_factor: 1,
            aggregate_limit_type: Some(LimitType::Amount),
            aggregate_max_value: 1000.0,
            is_current_version: true,
            dimension: DimensionEntries::Insured(vec![InsuredLevel {
                insured_level_id: "il-1".to_string(),
                limit: Some(Limit {
                    max_limit_type: Some(LimitType::Amount),
                    max_amount: 500.0,
                    aggregate_limit_type: Some(LimitType::Amount),
                    aggregate_max_value: 1000.0,
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_cascade_amount_aggregates_multiply() {
        // Scenario: base maxAmount=500, AMT aggregate 1000, cascade to 3 levels
        let base = base_level();
        let derived = cascade(&base, 3);
        assert_eq!(derived.len(), 2);

        assert_eq!(derived[0].description, "Coverage level 2");
        assert_eq!(derived[0].multiple_factor, 2);
        assert_relative_eq!(derived[0].aggregate_max_value, 2000.0);

        assert_eq!(derived[1].description, "Coverage level 3");
        assert_eq!(derived[1].multiple_factor, 3);
        assert_relative_eq!(derived[1].aggregate_max_value, 3000.0);

        // Plain max amounts do not auto-multiply
        let DimensionEntries::Insured(entries) = &derived[0].dimension else {
            panic!("expected insured dimension");
        };
        let limit = entries[0].limit.as_ref().unwrap();
        assert_relative_eq!(limit.max_amount, 500.0);
        assert_relative_eq!(limit.aggregate_max_value, 2000.0);
    }

    #[test]
    fn test_cascade_percentage_aggregate_is_invariant() {
        // Scenario: PERCENTAGE aggregate 75 stays 75 at every level
        let mut base = base_level();
        base.aggregate_limit_type = Some(LimitType::Percentage);
        base.aggregate_max_value = 75.0;
        base.aggregate_coverage_variant_percentage = Some("cv-base".to_string());

        let derived = cascade(&base, 2);
        assert_relative_eq!(derived[0].aggregate_max_value, 75.0);
        assert_eq!(
            derived[0].aggregate_coverage_variant_percentage.as_deref(),
            Some("cv-base")
        );
    }

    #[test]
    fn test_cascade_missing_aggregate_type_multiplies() {
        let mut base = base_level();
        base.aggregate_limit_type = None;

        let derived = cascade(&base, 2);
        assert_relative_eq!(derived[0].aggregate_max_value, 2000.0);
    }

    #[test]
    fn test_cascade_clears_identities() {
        let mut base = base_level();
        let DimensionEntries::Insured(entries) = &mut base.dimension else {
            unreachable!();
        };
        entries[0].coverage_factor_mapping = Some(CoverageFactorMapping {
            aggregate_limit_type: Some(LimitType::Amount),
            aggregate_max_value: 800.0,
            coverage_factor_combinations: vec![CoverageFactorCombination {
                coverage_factor_combination_id: Some("cfc-1".to_string()),
                factor_set: vec![FactorValueRef::new("AGE", "A1")],
                limit: Some(Limit {
                    max_amount: 200.0,
                    aggregate_limit_type: Some(LimitType::Amount),
                    aggregate_max_value: 400.0,
                    ..Default::default()
                }),
                ..Default::default()
            }],
        });

        let derived = cascade_one(&base, 2);
        assert_eq!(derived.coverage_variant_level_id, "");

        let DimensionEntries::Insured(entries) = &derived.dimension else {
            panic!("expected insured dimension");
        };
        assert_eq!(entries[0].insured_level_id, "");

        let mapping = entries[0].coverage_factor_mapping.as_ref().unwrap();
        assert_relative_eq!(mapping.aggregate_max_value, 1600.0);

        let combination = &mapping.coverage_factor_combinations[0];
        assert_eq!(combination.coverage_factor_combination_id, None);
        let limit = combination.limit.as_ref().unwrap();
        assert_relative_eq!(limit.max_amount, 200.0);
        assert_relative_eq!(limit.aggregate_max_value, 800.0);
    }

    #[test]
    fn test_cascade_object_dimension() {
        let mut base = base_level();
        base.dimension = DimensionEntries::InsuredObject(vec![InsuredObjectLevel {
            insured_object_level_id: "iol-1".to_string(),
            limit: Some(Limit {
                max_amount: 300.0,
                aggregate_limit_type: Some(LimitType::Amount),
                aggregate_max_value: 600.0,
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let derived = cascade_one(&base, 3);
        let DimensionEntries::InsuredObject(entries) = &derived.dimension else {
            panic!("expected object dimension");
        };
        assert_eq!(entries[0].insured_object_level_id, "");
        let limit = entries[0].limit.as_ref().unwrap();
        assert_relative_eq!(limit.max_amount, 300.0);
        assert_relative_eq!(limit.aggregate_max_value, 1800.0);
    }

    #[test]
    fn test_cascade_empty_dimension_is_not_an_error() {
        let mut base = base_level();
        base.dimension = DimensionEntries::Insured(Vec::new());

        let derived = cascade(&base, 4);
        assert_eq!(derived.len(), 3);
        assert!(derived.iter().all(|level| level.dimension.is_empty()));
    }

    #[test]
    fn test_cascade_to_one_or_fewer_yields_nothing() {
        let base = base_level();
        assert!(cascade(&base, 1).is_empty());
        assert!(cascade(&base, 0).is_empty());
    }
}
