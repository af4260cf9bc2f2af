//! Load coverage variant levels and factor permutations from the JSON wire format

use super::data::{
    CoverageVariantLevel, DimensionEntries, InsuredEventLevel, InsuredLevel, InsuredObjectLevel,
    LimitType, Permutation,
};
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Raw wire record for one coverage variant level.
///
/// The service carries the insured dimension as three parallel arrays, of
/// which at most one is populated per variant. Conversion to the domain type
/// enforces that exclusivity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    #[serde(default)]
    pub coverage_variant_level_id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub multiple_factor: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_limit_type: Option<LimitType>,

    #[serde(default)]
    pub aggregate_max_value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_coverage_variant_percentage: Option<String>,

    #[serde(default = "default_current_version")]
    pub is_current_version: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insured_level: Vec<InsuredLevel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insured_object_level: Vec<InsuredObjectLevel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insured_event_level: Vec<InsuredEventLevel>,
}

fn default_current_version() -> bool {
    true
}

impl LevelRecord {
    /// Convert into the domain type, enforcing the one-dimension invariant
    pub fn into_level(self) -> Result<CoverageVariantLevel, Box<dyn Error>> {
        let populated = [
            !self.insured_level.is_empty(),
            !self.insured_object_level.is_empty(),
            !self.insured_event_level.is_empty(),
        ]
        .iter()
        .filter(|&&p| p)
        .count();

        if populated > 1 {
            return Err(format!(
                "level '{}' populates {} insured dimensions, expected at most one",
                self.description, populated
            )
            .into());
        }

        let dimension = if !self.insured_object_level.is_empty() {
            DimensionEntries::InsuredObject(self.insured_object_level)
        } else if !self.insured_event_level.is_empty() {
            DimensionEntries::InsuredEvent(self.insured_event_level)
        } else {
            // Covers both the insured dimension and the no-entries edge case
            DimensionEntries::Insured(self.insured_level)
        };

        Ok(CoverageVariantLevel {
            coverage_variant_level_id: self.coverage_variant_level_id,
            description: self.description,
            multiple_factor: self.multiple_factor,
            aggregate_limit_type: self.aggregate_limit_type,
            aggregate_max_value: self.aggregate_max_value,
            aggregate_coverage_variant_percentage: self.aggregate_coverage_variant_percentage,
            is_current_version: self.is_current_version,
            dimension,
        })
    }

    /// Build a wire record from a domain level
    pub fn from_level(level: &CoverageVariantLevel) -> Self {
        let mut record = Self {
            coverage_variant_level_id: level.coverage_variant_level_id.clone(),
            description: level.description.clone(),
            multiple_factor: level.multiple_factor,
            aggregate_limit_type: level.aggregate_limit_type,
            aggregate_max_value: level.aggregate_max_value,
            aggregate_coverage_variant_percentage: level
                .aggregate_coverage_variant_percentage
                .clone(),
            is_current_version: level.is_current_version,
            ..Default::default()
        };

        match &level.dimension {
            DimensionEntries::Insured(entries) => record.insured_level = entries.clone(),
            DimensionEntries::InsuredObject(entries) => {
                record.insured_object_level = entries.clone()
            }
            DimensionEntries::InsuredEvent(entries) => record.insured_event_level = entries.clone(),
        }

        record
    }
}

/// Load a batch of coverage variant levels from JSON
pub fn load_levels_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<CoverageVariantLevel>, Box<dyn Error>> {
    let records: Vec<LevelRecord> = serde_json::from_reader(reader)?;
    records.into_iter().map(LevelRecord::into_level).collect()
}

/// Load the factor value cross-product from JSON
pub fn load_permutations_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<Permutation>, Box<dyn Error>> {
    let permutations: Vec<Permutation> = serde_json::from_reader(reader)?;
    Ok(permutations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_dimension_accepted() {
        let json = r#"[{
            "coverageVariantLevelId": "cvl-1",
            "description": "Coverage level 1",
            "multipleFactor": 1,
            "aggregateLimitType": "AMT",
            "aggregateMaxValue": 1000.0,
            "isCurrentVersion": true,
            "insuredLevel": [{"insuredLevelId": "il-1", "insuredType": "MAIN_INSURED"}]
        }]"#;

        let levels = load_levels_from_reader(json.as_bytes()).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].coverage_variant_level_id, "cvl-1");
        match &levels[0].dimension {
            DimensionEntries::Insured(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].insured_level_id, "il-1");
            }
            other => panic!("expected insured dimension, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_dimensions_rejected() {
        let json = r#"[{
            "description": "Coverage level 1",
            "insuredLevel": [{"insuredLevelId": "il-1"}],
            "insuredObjectLevel": [{"insuredObjectLevelId": "iol-1"}]
        }]"#;

        assert!(load_levels_from_reader(json.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_dimensions_default_to_insured() {
        let json = r#"[{"description": "Coverage level 1"}]"#;

        let levels = load_levels_from_reader(json.as_bytes()).unwrap();
        assert_eq!(levels[0].dimension, DimensionEntries::Insured(Vec::new()));
        // isCurrentVersion defaults to editable
        assert!(levels[0].is_current_version);
    }

    #[test]
    fn test_round_trip_preserves_dimension_array() {
        let json = r#"[{
            "description": "Coverage level 1",
            "insuredEventLevel": [{"insuredEventLevelId": "iel-1", "insuredEventId": "evt-9"}]
        }]"#;

        let levels = load_levels_from_reader(json.as_bytes()).unwrap();
        let record = LevelRecord::from_level(&levels[0]);
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("insuredEventLevel").is_some());
        assert!(value.get("insuredLevel").is_none());
        assert!(value.get("insuredObjectLevel").is_none());
    }

    #[test]
    fn test_load_permutations() {
        let json = r#"[
            [
                {"factorType": "AGE", "value": "18-25", "valueId": "A1"},
                {"factorType": "GENDER", "value": "M", "valueId": "G1"}
            ],
            [
                {"factorType": "AGE", "value": "18-25", "valueId": "A1"},
                {"factorType": "GENDER", "value": "F", "valueId": "G2"}
            ]
        ]"#;

        let permutations = load_permutations_from_reader(json.as_bytes()).unwrap();
        assert_eq!(permutations.len(), 2);
        assert_eq!(permutations[0][1].value, "M");
        assert_eq!(permutations[1][1].value_id, "G2");
    }
}
