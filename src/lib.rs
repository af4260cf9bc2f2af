//! Coverage System - Combination matching and cascading-limit engine for
//! multi-level insurance coverage variants
//!
//! This library provides:
//! - Factor-set matching between stored combinations and rating permutations
//! - Synchronization of edited factor-table rows against stored combinations
//! - Cascading of base-level limits into derived coverage levels
//! - Level-count reconciliation with a destructive-reset confirmation gate
//! - Wire-level request shaping for the batch upsert operation

pub mod cascade;
pub mod factors;
pub mod level;
pub mod request;
pub mod session;

// Re-export commonly used types
pub use cascade::{cascade, reconcile, PendingReset, Reconciled};
pub use factors::{match_factor_set, sync_combinations, FactorRow};
pub use level::{CoverageVariantLevel, DimensionEntries, LimitType, Permutation};
pub use request::{RequestBuilder, UpsertEnvelope, VariantContext};
pub use session::{EditSession, LevelSet, LevelTransport, MessageSink};
