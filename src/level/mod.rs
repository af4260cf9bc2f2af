//! Coverage variant level data model and wire format handling

pub mod data;
pub mod loader;

pub use data::{
    cascade_factor, derive_order, description_stem, CoverageDuration, CoverageFactorCombination,
    CoverageFactorMapping, CoverageVariantLevel, Deductible, DimensionEntries, FactorValueRef,
    InsuredEventLevel, InsuredLevel, InsuredObjectLevel, Limit, LimitType, Permutation,
    PermutationFactor,
};
pub use loader::{load_levels_from_reader, load_permutations_from_reader, LevelRecord};
