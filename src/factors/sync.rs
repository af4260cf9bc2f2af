//! Reconcile edited factor-table rows against stored combinations
//!
//! The editable table shows one row per active factor permutation. Stored
//! combinations are a sparse subset of those permutations; synchronization
//! updates matched entries in a rebuilt list, appends new ones, and leaves
//! combinations for currently-inactive values untouched.

use super::matcher::{find_combination_for_row, match_factor_set};
use crate::level::{
    CoverageDuration, CoverageFactorCombination, Deductible, FactorValueRef, Limit, Permutation,
};

/// One editable row of the factor-combination table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorRow {
    /// Identity of the backing combination, when one is stored
    pub combination_id: Option<String>,

    /// The permutation this row represents
    pub factors: Permutation,

    pub limit: Option<Limit>,
    pub deductible: Option<Deductible>,
    pub duration: Option<CoverageDuration>,
}

impl FactorRow {
    /// The row's factor values as a matchable factor set
    pub fn factor_set(&self) -> Vec<FactorValueRef> {
        self.factors.iter().map(|f| f.as_ref_pair()).collect()
    }
}

/// Build the editable table model: one row per permutation, pre-filled from
/// the matching stored combination when one exists.
pub fn build_row_table(
    permutations: &[Permutation],
    combinations: &[CoverageFactorCombination],
) -> Vec<FactorRow> {
    permutations
        .iter()
        .map(|permutation| {
            match find_combination_for_row(combinations, permutation) {
                Some(stored) => FactorRow {
                    combination_id: stored.coverage_factor_combination_id.clone(),
                    factors: permutation.clone(),
                    limit: stored.limit.clone(),
                    deductible: stored.deductible.clone(),
                    duration: stored.duration.clone(),
                },
                // No stored limits yet for this permutation
                None => FactorRow {
                    factors: permutation.clone(),
                    ..Default::default()
                },
            }
        })
        .collect()
}

/// Merge edited rows into the stored combination list.
///
/// Returns a rebuilt list: matched combinations keep their identity with
/// mutable fields overwritten, unmatched rows append as new combinations with
/// no id (the server assigns one on create), and stored combinations without
/// a current row survive unchanged.
pub fn sync_combinations(
    existing: &[CoverageFactorCombination],
    rows: &[FactorRow],
) -> Vec<CoverageFactorCombination> {
    let mut merged = existing.to_vec();

    for row in rows {
        let row_set = row.factor_set();
        let matched = merged
            .iter()
            .position(|combination| match_factor_set(&row_set, Some(&combination.factor_set)));

        match matched {
            Some(index) => {
                let combination = &mut merged[index];
                combination.factor_set = row_set;
                combination.limit = row.limit.clone();
                combination.deductible = row.deductible.clone();
                combination.duration = row.duration.clone();
            }
            None => merged.push(CoverageFactorCombination {
                coverage_factor_combination_id: None,
                factor_set: row_set,
                limit: row.limit.clone(),
                deductible: row.deductible.clone(),
                duration: row.duration.clone(),
            }),
        }
    }

    merged
}

/// Single-row edit from a side panel: update exactly the combination with the
/// given id, bypassing the full-table pass. Unknown ids leave the list as-is.
pub fn sync_single_combination(
    existing: &[CoverageFactorCombination],
    combination_id: &str,
    row: &FactorRow,
) -> Vec<CoverageFactorCombination> {
    let mut merged = existing.to_vec();

    if let Some(combination) = merged.iter_mut().find(|c| {
        c.coverage_factor_combination_id.as_deref() == Some(combination_id)
    }) {
        if !row.factors.is_empty() {
            combination.factor_set = row.factor_set();
        }
        combination.limit = row.limit.clone();
        combination.deductible = row.deductible.clone();
        combination.duration = row.duration.clone();
    }

    merged
}
