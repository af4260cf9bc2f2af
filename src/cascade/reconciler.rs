//! Grow or shrink the cascaded-level collection to a requested count
//!
//! Growth derives the missing levels from the base level; shrink truncates by
//! display order without renumbering survivors. Reducing the count to zero is
//! destructive (it removes all stored levels, not just local state), so that
//! path returns a pending reset that the caller must explicitly confirm.

use super::cascader::cascade_one;
use crate::level::CoverageVariantLevel;

/// Outcome of a count reconciliation
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// The reconciled, order-sorted level set
    Applied(Vec<CoverageVariantLevel>),
    /// A shrink to zero awaiting explicit confirmation
    NeedsConfirmation(PendingReset),
}

impl Reconciled {
    /// The reconciled levels, if no confirmation is pending
    pub fn applied(self) -> Option<Vec<CoverageVariantLevel>> {
        match self {
            Reconciled::Applied(levels) => Some(levels),
            Reconciled::NeedsConfirmation(_) => None,
        }
    }
}

/// A destructive count reduction held back until the caller confirms
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReset {
    levels: Vec<CoverageVariantLevel>,
}

impl PendingReset {
    /// Proceed with the reset, discarding every level
    pub fn confirm(self) -> Vec<CoverageVariantLevel> {
        log::info!("level reset confirmed, discarding {} levels", self.levels.len());
        Vec::new()
    }

    /// Abandon the reset, returning the untouched level set
    pub fn cancel(self) -> Vec<CoverageVariantLevel> {
        self.levels
    }

    /// Number of levels that would be removed
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// The levels held back from removal
    pub fn levels(&self) -> &[CoverageVariantLevel] {
        &self.levels
    }
}

/// Re-derive each level's order from its description and sort ascending.
/// Stored order fields are never trusted.
pub fn sort_by_order(levels: Vec<CoverageVariantLevel>) -> Vec<CoverageVariantLevel> {
    let mut keyed: Vec<(u32, CoverageVariantLevel)> = levels
        .into_iter()
        .enumerate()
        .map(|(index, level)| (level.order(index), level))
        .collect();
    keyed.sort_by_key(|(order, _)| *order);
    keyed.into_iter().map(|(_, level)| level).collect()
}

/// Reconcile the level set to the requested count.
///
/// Equal count is a no-op beyond re-sorting. Growth cascades the base (first)
/// level once per missing index; shrink truncates the ordered set without
/// renumbering survivors' multiple factors. A shrink to zero of a non-empty
/// set is returned as [`Reconciled::NeedsConfirmation`].
pub fn reconcile(levels: &[CoverageVariantLevel], requested_count: usize) -> Reconciled {
    let mut sorted = sort_by_order(levels.to_vec());

    if requested_count == 0 && !sorted.is_empty() {
        return Reconciled::NeedsConfirmation(PendingReset { levels: sorted });
    }

    if requested_count > sorted.len() {
        let Some(base) = sorted.first().cloned() else {
            // Nothing to cascade from
            log::warn!("cannot grow an empty level set to {} levels", requested_count);
            return Reconciled::Applied(sorted);
        };
        log::debug!(
            "growing level set from {} to {} levels",
            sorted.len(),
            requested_count
        );
        for factor in (sorted.len() as u32 + 1)..=(requested_count as u32) {
            sorted.push(cascade_one(&base, factor));
        }
        sorted = sort_by_order(sorted);
    } else if requested_count < sorted.len() {
        log::debug!(
            "shrinking level set from {} to {} levels",
            sorted.len(),
            requested_count
        );
        sorted.truncate(requested_count);
    }

    Reconciled::Applied(sorted)
}
