//! Assemble wire-level upsert requests from reconciled coverage levels
//!
//! PATCH records reuse or mint the level identity; POST records leave it for
//! the server to assign. Aggregate values resolve from the variant-level
//! override first, then the stored prior value, then zero; on a first-time
//! save the base level's aggregates are copied verbatim with no multiplier.

use crate::level::{CoverageVariantLevel, LevelRecord};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request envelope submitted to the upsert operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertEnvelope {
    /// Idempotency token for the transport layer, fresh per request
    pub request_id: String,
    pub coverage_variant_levels: Vec<LevelRecord>,
}

/// Product/variant context feeding aggregate resolution
#[derive(Debug, Clone, Default)]
pub struct VariantContext {
    /// First stored level of the variant, the base for first-time saves
    pub base_level: Option<CoverageVariantLevel>,

    /// Explicit per-variant aggregate override from the product context
    pub variant_aggregate_override: Option<f64>,
}

/// Builds PATCH/POST level records and upsert envelopes
pub struct RequestBuilder {
    context: VariantContext,
}

impl RequestBuilder {
    pub fn new(context: VariantContext) -> Self {
        Self { context }
    }

    /// Shape a level for a PATCH request. The identity comes from the prior
    /// stored level when one exists, otherwise a fresh one is minted so the
    /// server treats the record as addressable.
    pub fn build_patch(
        &self,
        level: &CoverageVariantLevel,
        prior: Option<&CoverageVariantLevel>,
        is_save: bool,
    ) -> CoverageVariantLevel {
        let mut record = level.clone();

        record.coverage_variant_level_id = prior
            .map(|p| p.coverage_variant_level_id.clone())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        record.aggregate_max_value = self.resolve_aggregate(level, prior, is_save);

        record
    }

    /// Shape a level for a POST request, leaving the identity server-assigned
    pub fn build_post(&self, level: &CoverageVariantLevel, is_save: bool) -> CoverageVariantLevel {
        let mut record = level.clone();

        record.coverage_variant_level_id = String::new();
        record.aggregate_max_value = self.resolve_aggregate(level, None, is_save);

        record
    }

    /// Wrap the reconciled level set in a request envelope with a fresh
    /// request id
    pub fn upsert_envelope(&self, levels: &[CoverageVariantLevel]) -> UpsertEnvelope {
        UpsertEnvelope {
            request_id: Uuid::new_v4().to_string(),
            coverage_variant_levels: levels.iter().map(LevelRecord::from_level).collect(),
        }
    }

    /// Final aggregate value for an outgoing record.
    ///
    /// A first-time save copies the base level's value verbatim (the base
    /// already carries the product default). On the cascading path the
    /// level's own multiplied value wins; levels without one fall back to the
    /// variant override, then the prior stored value, then zero.
    fn resolve_aggregate(
        &self,
        level: &CoverageVariantLevel,
        prior: Option<&CoverageVariantLevel>,
        is_save: bool,
    ) -> f64 {
        if is_save {
            if let Some(base) = &self.context.base_level {
                return base.aggregate_max_value;
            }
        }

        if level.aggregate_max_value != 0.0 {
            return level.aggregate_max_value;
        }
        if let Some(override_value) = self.context.variant_aggregate_override {
            return override_value;
        }
        prior.map(|p| p.aggregate_max_value).unwrap_or(0.0)
    }
}
