//! Coverage variant level data structures matching the configuration wire format

use serde::{Deserialize, Serialize};

/// How a limit amount is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitType {
    /// Absolute monetary amount
    #[serde(rename = "AMT")]
    Amount,
    /// Percentage of another coverage variant's amount
    #[serde(rename = "PERCENTAGE")]
    Percentage,
    /// Any other type code carried on the wire
    #[serde(other)]
    Other,
}

impl LimitType {
    /// Cascading multiplier for this limit type.
    /// Percentage-of-variant values do not scale with level count.
    pub fn cascade_factor(self, factor: u32) -> u32 {
        match self {
            LimitType::Percentage => 1,
            _ => factor,
        }
    }
}

/// Multiplier to apply when cascading an amount governed by an optional
/// aggregate limit type. An absent type is treated as non-percentage.
pub fn cascade_factor(limit_type: Option<LimitType>, factor: u32) -> u32 {
    limit_type.unwrap_or(LimitType::Amount).cascade_factor(factor)
}

/// One `{factorType, valueId}` pair of a combination's factor set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorValueRef {
    /// Rating dimension code, e.g. "AGE" or "GENDER"
    pub factor_type: String,
    /// Identifier of the selected value within the dimension
    pub value_id: String,
}

impl FactorValueRef {
    pub fn new(factor_type: impl Into<String>, value_id: impl Into<String>) -> Self {
        Self {
            factor_type: factor_type.into(),
            value_id: value_id.into(),
        }
    }
}

/// One factor value within a fetched permutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermutationFactor {
    /// Rating dimension code, e.g. "AGE"
    pub factor_type: String,
    /// Display value, e.g. "18-25"
    pub value: String,
    /// Identifier of the value
    pub value_id: String,
}

impl PermutationFactor {
    /// The `{factorType, valueId}` key of this factor, as used for matching
    pub fn as_ref_pair(&self) -> FactorValueRef {
        FactorValueRef::new(self.factor_type.clone(), self.value_id.clone())
    }
}

/// One concrete combination of active factor values (e.g. "18-25" x "M")
pub type Permutation = Vec<PermutationFactor>;

/// Duration or waiting-period value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDuration {
    #[serde(default)]
    pub value: u32,
    /// Unit code, e.g. "DAYS" or "MONTHS"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Limit carried by a dimension entry or factor combination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_limit_type: Option<LimitType>,

    #[serde(default)]
    pub min_amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_limit_type: Option<LimitType>,

    #[serde(default)]
    pub max_amount: f64,

    /// Governs how `aggregate_max_value` cascades across levels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_limit_type: Option<LimitType>,

    #[serde(default)]
    pub aggregate_max_value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<CoverageDuration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_period: Option<CoverageDuration>,
}

/// Deductible carried by a dimension entry or factor combination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deductible {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible_type: Option<String>,

    #[serde(default)]
    pub amount: f64,
}

/// Stored limit/deductible/duration record for one factor permutation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageFactorCombination {
    /// Stable identity; `None` until the server assigns one on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_factor_combination_id: Option<String>,

    /// The defining key: unordered set of factor value references
    #[serde(default)]
    pub factor_set: Vec<FactorValueRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible: Option<Deductible>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<CoverageDuration>,
}

/// Factor-matrix specialization of an insured entry's limits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageFactorMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_limit_type: Option<LimitType>,

    #[serde(default)]
    pub aggregate_max_value: f64,

    #[serde(default)]
    pub coverage_factor_combinations: Vec<CoverageFactorCombination>,
}

/// Per-person entry within a level (main insured, spouse, dependent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredLevel {
    /// Stable identity, empty until persisted
    #[serde(default)]
    pub insured_level_id: String,

    /// Person-type code, e.g. "MAIN_INSURED" or "SPOUSE"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insured_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible: Option<Deductible>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<CoverageDuration>,

    /// Present only when the variant rates on coverage factors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_factor_mapping: Option<CoverageFactorMapping>,
}

/// Per-object entry within a level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredObjectLevel {
    #[serde(default)]
    pub insured_object_level_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insured_object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible: Option<Deductible>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<CoverageDuration>,
}

/// Per-event entry within a level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredEventLevel {
    #[serde(default)]
    pub insured_event_level_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insured_event_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible: Option<Deductible>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<CoverageDuration>,
}

/// The one populated dimension of a level.
///
/// The wire format carries three parallel arrays; a variant uses exactly one
/// of them. Modeling the choice as a sum type makes that exclusivity a
/// compile-time fact instead of a convention.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionEntries {
    Insured(Vec<InsuredLevel>),
    InsuredObject(Vec<InsuredObjectLevel>),
    InsuredEvent(Vec<InsuredEventLevel>),
}

impl DimensionEntries {
    /// Number of entries in whichever dimension is populated
    pub fn len(&self) -> usize {
        match self {
            DimensionEntries::Insured(entries) => entries.len(),
            DimensionEntries::InsuredObject(entries) => entries.len(),
            DimensionEntries::InsuredEvent(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DimensionEntries {
    fn default() -> Self {
        DimensionEntries::Insured(Vec::new())
    }
}

/// One tier of a coverage variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageVariantLevel {
    /// Stable identity, empty until persisted
    pub coverage_variant_level_id: String,

    /// Human label ending in the level number, e.g. "Coverage level 2"
    pub description: String,

    /// Cascading multiplier relative to level 1 (level 1 is implicitly 1)
    pub multiple_factor: u32,

    /// Governs how `aggregate_max_value` cascades across levels
    pub aggregate_limit_type: Option<LimitType>,

    pub aggregate_max_value: f64,

    /// Referenced variant, used only when the aggregate type is percentage
    pub aggregate_coverage_variant_percentage: Option<String>,

    /// False means the level belongs to a prior version and is read-only
    pub is_current_version: bool,

    /// The single populated insured dimension
    pub dimension: DimensionEntries,
}

impl CoverageVariantLevel {
    /// Display order, always recomputed from the description suffix.
    /// `fallback_index` is the level's position in its containing array.
    pub fn order(&self, fallback_index: usize) -> u32 {
        derive_order(&self.description, fallback_index)
    }

    /// Whether the level may be edited in the current session
    pub fn is_editable(&self) -> bool {
        self.is_current_version
    }
}

/// Parse the display order from a level description's trailing number.
/// "Coverage level 2" yields 2; an unparseable suffix falls back to
/// `fallback_index + 1`.
pub fn derive_order(description: &str, fallback_index: usize) -> u32 {
    let trimmed = description.trim_end();
    let digits: String = trimmed
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    digits
        .parse::<u32>()
        .unwrap_or(fallback_index as u32 + 1)
}

/// Description with the trailing level number stripped, used as the stem
/// when naming cascaded levels. "Coverage level 1" yields "Coverage level".
pub fn description_stem(description: &str) -> &str {
    description
        .trim_end()
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end()
}
