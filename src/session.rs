//! Edit-session orchestration over an in-memory working copy
//!
//! All mutation happens against one [`LevelSet`] before a single batch
//! persist call, so callers never observe partial-write state: either the
//! whole reconciled level set is submitted or none of it is. A transport
//! failure leaves the working copy as the "to retry" state; the next persist
//! reattempts with current local edits. The engine issues one request at a
//! time and implements no retry, timeout, or cancellation of its own.

use crate::cascade::{reconcile, sort_by_order, PendingReset, Reconciled};
use crate::factors::{
    build_row_table, sync_combinations, value_exists_in_stored_data, FactorRow,
};
use crate::level::{CoverageVariantLevel, DimensionEntries, Permutation};
use crate::request::{RequestBuilder, UpsertEnvelope, VariantContext};
use thiserror::Error;

/// Error from the external fetch/upsert/delete collaborator
#[derive(Debug, Clone, Error)]
#[error("transport request failed: {0}")]
pub struct TransportError(pub String);

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The working copy contains a prior-version level and is read-only
    #[error("coverage variant levels are not the current version and cannot be edited")]
    ReadOnly,

    #[error("no coverage variant level at index {0}")]
    LevelNotFound(usize),

    /// Factor-combination edits only apply to the insured dimension
    #[error("level '{0}' does not carry an insured dimension entry at index {1}")]
    DimensionMismatch(String, usize),
}

/// Message severity for the display collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Validation-message display collaborator, supplied by the caller
pub trait MessageSink {
    fn show_message(&self, severity: Severity, text: &str);
}

/// External REST transport collaborator. Retry and timeout semantics live
/// behind this boundary, not in the engine.
pub trait LevelTransport {
    fn fetch_levels(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Vec<CoverageVariantLevel>, TransportError>;

    fn fetch_permutations(
        &self,
        product_id: &str,
        variant_id: &str,
    ) -> Result<Vec<Permutation>, TransportError>;

    fn upsert(&self, envelope: &UpsertEnvelope) -> Result<(), TransportError>;

    fn delete_level(&self, level_id: &str) -> Result<(), TransportError>;
}

/// The explicit working-copy value object passed through engine operations.
/// Levels are kept sorted by derived order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelSet {
    levels: Vec<CoverageVariantLevel>,
}

impl LevelSet {
    pub fn new(levels: Vec<CoverageVariantLevel>) -> Self {
        Self {
            levels: sort_by_order(levels),
        }
    }

    pub fn levels(&self) -> &[CoverageVariantLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn into_levels(self) -> Vec<CoverageVariantLevel> {
        self.levels
    }

    /// Whether every level belongs to the current version
    pub fn is_editable(&self) -> bool {
        self.levels.iter().all(|level| level.is_editable())
    }

    /// Whether any stored combination still references the value/type pair
    pub fn value_in_use(&self, value_id: &str, factor_type: &str) -> bool {
        value_exists_in_stored_data(&self.levels, value_id, factor_type)
    }

    /// Reconcile to the requested level count
    pub fn reconcile(&self, requested_count: usize) -> Reconciled {
        reconcile(&self.levels, requested_count)
    }

    /// Rebuild with one insured entry's combinations replaced by the result
    /// of synchronizing the given table rows
    pub fn with_synced_combinations(
        &self,
        level_index: usize,
        entry_index: usize,
        rows: &[FactorRow],
    ) -> Result<LevelSet, ConfigError> {
        let mut levels = self.levels.clone();
        let level = levels
            .get_mut(level_index)
            .ok_or(ConfigError::LevelNotFound(level_index))?;

        let DimensionEntries::Insured(entries) = &mut level.dimension else {
            return Err(ConfigError::DimensionMismatch(
                level.description.clone(),
                entry_index,
            ));
        };
        let entry = entries.get_mut(entry_index).ok_or_else(|| {
            ConfigError::DimensionMismatch(level.description.clone(), entry_index)
        })?;

        let mapping = entry.coverage_factor_mapping.get_or_insert_with(Default::default);
        mapping.coverage_factor_combinations =
            sync_combinations(&mapping.coverage_factor_combinations, rows);

        Ok(LevelSet::new(levels))
    }
}

/// Outcome of a count change request
#[derive(Debug, Clone, PartialEq)]
pub enum CountChange {
    /// The working copy now holds this many levels
    Applied(usize),
    /// Shrinking to zero awaits explicit confirmation
    ConfirmationRequired(PendingReset),
}

/// Outcome of a single-level delete request
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    /// Removing the last level triggers the full-reset confirmation flow
    ConfirmationRequired(PendingReset),
}

/// Drives one coverage-variant edit: fetch, reconcile, synchronize, persist.
/// The working copy belongs exclusively to this session.
pub struct EditSession<T: LevelTransport, M: MessageSink> {
    transport: T,
    messages: M,
    product_id: String,
    variant_id: String,
    builder: RequestBuilder,
    working: LevelSet,
    permutations: Vec<Permutation>,
}

impl<T: LevelTransport, M: MessageSink> EditSession<T, M> {
    pub fn new(
        transport: T,
        messages: M,
        product_id: impl Into<String>,
        variant_id: impl Into<String>,
        context: VariantContext,
    ) -> Self {
        Self {
            transport,
            messages,
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            builder: RequestBuilder::new(context),
            working: LevelSet::default(),
            permutations: Vec::new(),
        }
    }

    /// Fetch the variant's stored levels and factor cross-product
    pub fn load(&mut self) -> Result<(), ConfigError> {
        let levels = self
            .transport
            .fetch_levels(&self.product_id, &self.variant_id)
            .map_err(|e| self.report(e))?;
        let permutations = self
            .transport
            .fetch_permutations(&self.product_id, &self.variant_id)
            .map_err(|e| self.report(e))?;

        log::debug!(
            "loaded {} levels and {} permutations for variant {}",
            levels.len(),
            permutations.len(),
            self.variant_id
        );
        self.working = LevelSet::new(levels);
        self.permutations = permutations;
        Ok(())
    }

    pub fn working_copy(&self) -> &LevelSet {
        &self.working
    }

    pub fn permutations(&self) -> &[Permutation] {
        &self.permutations
    }

    /// Editable table for one insured entry's factor matrix: one row per
    /// active permutation, pre-filled from stored combinations
    pub fn row_table(&self, level_index: usize, entry_index: usize) -> Result<Vec<FactorRow>, ConfigError> {
        let level = self
            .working
            .levels()
            .get(level_index)
            .ok_or(ConfigError::LevelNotFound(level_index))?;

        let DimensionEntries::Insured(entries) = &level.dimension else {
            return Err(ConfigError::DimensionMismatch(
                level.description.clone(),
                entry_index,
            ));
        };
        let entry = entries.get(entry_index).ok_or_else(|| {
            ConfigError::DimensionMismatch(level.description.clone(), entry_index)
        })?;

        let combinations = entry
            .coverage_factor_mapping
            .as_ref()
            .map(|mapping| mapping.coverage_factor_combinations.as_slice())
            .unwrap_or(&[]);
        Ok(build_row_table(&self.permutations, combinations))
    }

    /// Merge edited table rows into the working copy
    pub fn apply_rows(
        &mut self,
        level_index: usize,
        entry_index: usize,
        rows: &[FactorRow],
    ) -> Result<(), ConfigError> {
        self.ensure_editable()?;
        self.working = self
            .working
            .with_synced_combinations(level_index, entry_index, rows)?;
        Ok(())
    }

    /// Grow or shrink the working copy to the requested level count
    pub fn set_level_count(&mut self, requested_count: usize) -> Result<CountChange, ConfigError> {
        self.ensure_editable()?;

        match self.working.reconcile(requested_count) {
            Reconciled::Applied(levels) => {
                self.working = LevelSet::new(levels);
                Ok(CountChange::Applied(self.working.len()))
            }
            Reconciled::NeedsConfirmation(pending) => {
                self.messages.show_message(
                    Severity::Warn,
                    "Reducing the level count to zero removes all stored coverage levels.",
                );
                Ok(CountChange::ConfirmationRequired(pending))
            }
        }
    }

    /// Apply a confirmed reset, emptying the working copy
    pub fn apply_reset(&mut self, pending: PendingReset) {
        self.working = LevelSet::new(pending.confirm());
    }

    /// Whether a factor value can be deactivated without orphaning stored
    /// limits. Proceeding despite in-use data is the user's explicit choice.
    pub fn can_deactivate_value(&self, value_id: &str, factor_type: &str) -> bool {
        !self.working.value_in_use(value_id, factor_type)
    }

    /// Delete one level by id. Deleting the last remaining level is returned
    /// as a pending full reset instead of being executed.
    pub fn delete_level(&mut self, level_id: &str) -> Result<DeleteOutcome, ConfigError> {
        self.ensure_editable()?;

        if self.working.len() <= 1 {
            self.messages.show_message(
                Severity::Warn,
                "Deleting the last level resets the coverage variant.",
            );
            return match self.working.reconcile(0) {
                Reconciled::NeedsConfirmation(pending) => {
                    Ok(DeleteOutcome::ConfirmationRequired(pending))
                }
                // Empty working copy: nothing to delete
                Reconciled::Applied(_) => Ok(DeleteOutcome::Deleted),
            };
        }

        self.transport
            .delete_level(level_id)
            .map_err(|e| self.report(e))?;

        let remaining: Vec<CoverageVariantLevel> = self
            .working
            .levels()
            .iter()
            .filter(|level| level.coverage_variant_level_id != level_id)
            .cloned()
            .collect();
        self.working = LevelSet::new(remaining);
        Ok(DeleteOutcome::Deleted)
    }

    /// Execute a confirmed full reset: delete every stored level, then empty
    /// the working copy. A transport failure keeps the copy untouched.
    pub fn confirm_full_reset(&mut self, pending: PendingReset) -> Result<(), ConfigError> {
        for level in pending.levels() {
            if !level.coverage_variant_level_id.is_empty() {
                self.transport
                    .delete_level(&level.coverage_variant_level_id)
                    .map_err(|e| self.report(e))?;
            }
        }
        self.apply_reset(pending);
        Ok(())
    }

    /// Submit the whole working copy in one upsert. On failure the copy is
    /// kept as-is so local edits survive and the next persist retries.
    pub fn persist(&mut self) -> Result<(), ConfigError> {
        let envelope = self.builder.upsert_envelope(self.working.levels());
        log::info!(
            "persisting {} levels for variant {} (request {})",
            self.working.len(),
            self.variant_id,
            envelope.request_id
        );

        match self.transport.upsert(&envelope) {
            Ok(()) => {
                self.messages
                    .show_message(Severity::Info, "Coverage levels saved.");
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    fn ensure_editable(&self) -> Result<(), ConfigError> {
        if self.working.is_editable() {
            Ok(())
        } else {
            Err(ConfigError::ReadOnly)
        }
    }

    fn report(&self, error: TransportError) -> ConfigError {
        log::warn!("transport failure for variant {}: {}", self.variant_id, error);
        self.messages.show_message(Severity::Error, &error.to_string());
        ConfigError::Transport(error)
    }
}
