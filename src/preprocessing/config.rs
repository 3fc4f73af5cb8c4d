//! Feature pipeline configuration

use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// What to do when a column cannot be rescaled because its spread is zero
/// (or it holds no values at all)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Fail with an arithmetic error
    Fail,
    /// Emit 0.0 for every row of the column
    Zero,
}

/// Configuration for encoding and scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Gender value that encodes as 1
    pub gender_reference: String,

    /// Output column for the gender indicator
    pub sex_column: String,

    /// Output column for the ordinal age band
    pub age_column: String,

    /// Output column for years in the current city
    pub years_column: String,

    /// Indicator prefix for occupation codes
    pub occupation_prefix: String,

    /// Indicator prefix for city categories
    pub city_prefix: String,

    /// Indicator prefixes for product categories 1, 2 and 3
    pub product_prefixes: [String; 3],

    /// Label used for the generated missing-value indicator
    pub missing_label: String,

    /// Suffix appended to min-max normalized columns
    pub norm_suffix: String,

    /// Target column, standardized and returned apart from the features
    pub target_column: String,

    /// Item count column, min-max normalized
    pub count_column: String,

    /// Delta degrees of freedom for the target standard deviation
    pub std_ddof: u8,

    /// Policy for zero variance / zero range columns
    pub degenerate_policy: DegeneratePolicy,

    /// Encode independent fields on the rayon pool
    pub parallel: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            gender_reference: "F".to_string(),
            sex_column: "sex".to_string(),
            age_column: "age".to_string(),
            years_column: "years".to_string(),
            occupation_prefix: "occ".to_string(),
            city_prefix: "citycat".to_string(),
            product_prefixes: ["pc1".to_string(), "pc2".to_string(), "pc3".to_string()],
            missing_label: "nan".to_string(),
            norm_suffix: "_norm".to_string(),
            target_column: "Purchase".to_string(),
            count_column: "num_items".to_string(),
            std_ddof: 0,
            degenerate_policy: DegeneratePolicy::Fail,
            parallel: true,
        }
    }
}

impl FeatureConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the gender reference category
    pub fn with_gender_reference(mut self, reference: impl Into<String>) -> Self {
        self.gender_reference = reference.into();
        self
    }

    /// Builder method to set the degenerate scaling policy
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate_policy = policy;
        self
    }

    /// Builder method to set the standard deviation ddof
    pub fn with_std_ddof(mut self, ddof: u8) -> Self {
        self.std_ddof = ddof;
        self
    }

    /// Builder method to toggle column-parallel encoding
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder method to set the min-max suffix
    pub fn with_norm_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.norm_suffix = suffix.into();
        self
    }

    /// Name of the min-max output for `column`
    pub fn norm_name(&self, column: &str) -> String {
        format!("{}{}", column, self.norm_suffix)
    }

    /// Columns the scaler min-max normalizes, in output order
    pub fn minmax_columns(&self) -> [&str; 3] {
        [
            self.count_column.as_str(),
            self.age_column.as_str(),
            self.years_column.as_str(),
        ]
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("gender_reference", &self.gender_reference),
            ("sex_column", &self.sex_column),
            ("age_column", &self.age_column),
            ("years_column", &self.years_column),
            ("occupation_prefix", &self.occupation_prefix),
            ("city_prefix", &self.city_prefix),
            ("product_prefixes[0]", &self.product_prefixes[0]),
            ("product_prefixes[1]", &self.product_prefixes[1]),
            ("product_prefixes[2]", &self.product_prefixes[2]),
            ("missing_label", &self.missing_label),
            ("norm_suffix", &self.norm_suffix),
            ("target_column", &self.target_column),
            ("count_column", &self.count_column),
        ];
        for (field, value) in names {
            if value.is_empty() {
                return Err(FeatureError::ConfigError(format!("{} must not be empty", field)));
            }
        }

        if self.std_ddof > 1 {
            return Err(FeatureError::ConfigError(format!(
                "std_ddof must be 0 or 1, got {}",
                self.std_ddof
            )));
        }

        let mut seen = HashSet::new();
        let outputs = [
            &self.sex_column,
            &self.age_column,
            &self.years_column,
            &self.target_column,
            &self.count_column,
        ];
        for name in outputs {
            if !seen.insert(name.as_str()) {
                return Err(FeatureError::ConfigError(format!(
                    "column name {} is used twice",
                    name
                )));
            }
        }

        let prefixes = [
            &self.occupation_prefix,
            &self.city_prefix,
            &self.product_prefixes[0],
            &self.product_prefixes[1],
            &self.product_prefixes[2],
        ];
        let mut seen = HashSet::new();
        for prefix in prefixes {
            if !seen.insert(prefix.as_str()) {
                return Err(FeatureError::ConfigError(format!(
                    "indicator prefix {} is used twice",
                    prefix
                )));
            }
        }

        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeatureConfig::default();
        assert_eq!(config.gender_reference, "F");
        assert_eq!(config.std_ddof, 0);
        assert_eq!(config.degenerate_policy, DegeneratePolicy::Fail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FeatureConfig::new()
            .with_gender_reference("M")
            .with_degenerate_policy(DegeneratePolicy::Zero)
            .with_std_ddof(1)
            .with_parallel(false);

        assert_eq!(config.gender_reference, "M");
        assert_eq!(config.degenerate_policy, DegeneratePolicy::Zero);
        assert_eq!(config.std_ddof, 1);
        assert!(!config.parallel);
    }

    #[test]
    fn test_norm_names() {
        let config = FeatureConfig::default();
        let names: Vec<String> = config
            .minmax_columns()
            .iter()
            .map(|c| config.norm_name(c))
            .collect();
        assert_eq!(names, vec!["num_items_norm", "age_norm", "years_norm"]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FeatureConfig::default();
        config.std_ddof = 2;
        assert!(matches!(config.validate(), Err(FeatureError::ConfigError(_))));

        let mut config = FeatureConfig::default();
        config.years_column = "age".to_string();
        assert!(config.validate().is_err());

        let mut config = FeatureConfig::default();
        config.city_prefix = "occ".to_string();
        assert!(config.validate().is_err());

        let config = FeatureConfig::default().with_norm_suffix("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FeatureConfig =
            serde_json::from_str(r#"{"gender_reference": "M", "degenerate_policy": "zero"}"#)
                .unwrap();
        assert_eq!(config.gender_reference, "M");
        assert_eq!(config.degenerate_policy, DegeneratePolicy::Zero);
        assert_eq!(config.sex_column, "sex");
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "retail_features_config_{}.json",
            std::process::id()
        ));
        let config = FeatureConfig::default().with_gender_reference("M");
        config.save(&path).unwrap();
        let loaded = FeatureConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
