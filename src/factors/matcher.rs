//! Unordered set-equality matching between factor sets and permutations
//!
//! The same match predicate serves two purposes: looking up the stored
//! combination for an edited table row, and checking whether a factor value
//! is still referenced anywhere before it may be deactivated.

use crate::level::{
    CoverageFactorCombination, CoverageVariantLevel, DimensionEntries, FactorValueRef,
    PermutationFactor,
};

/// Test two factor sets for unordered equality.
///
/// Returns false when the sizes differ or the target is absent. Equal length
/// plus one-directional containment is sufficient because factor sets never
/// repeat a `{factorType, valueId}` pair.
pub fn match_factor_set(candidate: &[FactorValueRef], target: Option<&[FactorValueRef]>) -> bool {
    let Some(target) = target else {
        return false;
    };
    if candidate.len() != target.len() {
        return false;
    }

    candidate.iter().all(|pair| {
        target
            .iter()
            .any(|t| t.factor_type == pair.factor_type && t.value_id == pair.value_id)
    })
}

/// Find the stored combination whose factor set matches a table row's
/// factor values. First match wins; factor sets are unique within a mapping.
pub fn find_combination_for_row<'a>(
    combinations: &'a [CoverageFactorCombination],
    row_factors: &[PermutationFactor],
) -> Option<&'a CoverageFactorCombination> {
    let row_set: Vec<FactorValueRef> = row_factors.iter().map(|f| f.as_ref_pair()).collect();

    combinations
        .iter()
        .find(|combination| match_factor_set(&row_set, Some(&combination.factor_set)))
}

/// Deep scan across all levels for any stored combination that references the
/// given value/type pair. Guards factor-value deactivation and row deletion
/// against orphaning already-saved limits.
pub fn value_exists_in_stored_data(
    levels: &[CoverageVariantLevel],
    value_id: &str,
    factor_type: &str,
) -> bool {
    levels.iter().any(|level| {
        let DimensionEntries::Insured(entries) = &level.dimension else {
            // Object and event dimensions never carry factor mappings
            return false;
        };

        entries.iter().any(|entry| {
            entry
                .coverage_factor_mapping
                .as_ref()
                .map(|mapping| {
                    mapping.coverage_factor_combinations.iter().any(|combination| {
                        combination
                            .factor_set
                            .iter()
                            .any(|pair| pair.value_id == value_id && pair.factor_type == factor_type)
                    })
                })
                .unwrap_or(false)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{CoverageFactorMapping, InsuredLevel};

    fn pair(factor_type: &str, value_id: &str) -> FactorValueRef {
        FactorValueRef::new(factor_type, value_id)
    }

    fn perm_factor(factor_type: &str, value: &str, value_id: &str) -> PermutationFactor {
        PermutationFactor {
            factor_type: factor_type.to_string(),
            value: value.to_string(),
            value_id: value_id.to_string(),
        }
    }

    fn stored_combination(id: &str, factor_set: Vec<FactorValueRef>) -> CoverageFactorCombination {
        CoverageFactorCombination {
            coverage_factor_combination_id: Some(id.to_string()),
            factor_set,
            ..Default::default()
        }
    }

    #[test]
    fn test_match_is_order_independent_and_symmetric() {
        let a = vec![pair("AGE", "A1"), pair("GENDER", "G1")];
        let b = vec![pair("GENDER", "G1"), pair("AGE", "A1")];

        assert!(match_factor_set(&a, Some(&b)));
        assert!(match_factor_set(&b, Some(&a)));
    }

    #[test]
    fn test_match_rejects_size_mismatch_and_missing_target() {
        let a = vec![pair("AGE", "A1"), pair("GENDER", "G1")];
        let short = vec![pair("AGE", "A1")];

        assert!(!match_factor_set(&a, Some(&short)));
        assert!(!match_factor_set(&short, Some(&a)));
        assert!(!match_factor_set(&a, None));
    }

    #[test]
    fn test_match_rejects_differing_value() {
        let a = vec![pair("AGE", "A1"), pair("GENDER", "G1")];
        let b = vec![pair("AGE", "A1"), pair("GENDER", "G2")];

        assert!(!match_factor_set(&a, Some(&b)));
    }

    #[test]
    fn test_empty_sets_match() {
        assert!(match_factor_set(&[], Some(&[])));
    }

    #[test]
    fn test_find_combination_for_row() {
        let combinations = vec![
            stored_combination("cfc-1", vec![pair("AGE", "A1"), pair("GENDER", "G1")]),
            stored_combination("cfc-2", vec![pair("AGE", "A1"), pair("GENDER", "G2")]),
        ];

        let row = vec![
            perm_factor("GENDER", "M", "G1"),
            perm_factor("AGE", "18-25", "A1"),
        ];
        let found = find_combination_for_row(&combinations, &row).unwrap();
        assert_eq!(
            found.coverage_factor_combination_id.as_deref(),
            Some("cfc-1")
        );

        let unmatched_row = vec![
            perm_factor("AGE", "18-25", "A1"),
            perm_factor("GENDER", "F", "G3"),
        ];
        assert!(find_combination_for_row(&combinations, &unmatched_row).is_none());
    }

    #[test]
    fn test_value_exists_in_stored_data() {
        let mapping = CoverageFactorMapping {
            coverage_factor_combinations: vec![stored_combination(
                "cfc-1",
                vec![pair("AGE", "A1"), pair("GENDER", "G1")],
            )],
            ..Default::default()
        };
        let level = CoverageVariantLevel {
            description: "Coverage level 1".to_string(),
            dimension: DimensionEntries::Insured(vec![InsuredLevel {
                coverage_factor_mapping: Some(mapping),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let levels = vec![level];

        assert!(value_exists_in_stored_data(&levels, "A1", "AGE"));
        assert!(value_exists_in_stored_data(&levels, "G1", "GENDER"));
        assert!(!value_exists_in_stored_data(&levels, "A2", "AGE"));
        // Same value id under a different factor type does not count
        assert!(!value_exists_in_stored_data(&levels, "A1", "GENDER"));
    }

    #[test]
    fn test_value_exists_ignores_levels_without_mappings() {
        let level = CoverageVariantLevel {
            dimension: DimensionEntries::Insured(vec![InsuredLevel::default()]),
            ..Default::default()
        };

        assert!(!value_exists_in_stored_data(&[level], "A1", "AGE"));
        assert!(!value_exists_in_stored_data(&[], "A1", "AGE"));
    }
}
