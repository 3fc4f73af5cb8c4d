//! Categorical encoding of raw transaction fields

use super::bands::{band_lower_bound, stay_years, BAND_PATTERN, STAY_PATTERN};
use super::categories::{category_labels, OneHotEncoding};
use super::config::FeatureConfig;
use super::{
    require_columns, series, AGE, CITY_CATEGORY, GENDER, OCCUPATION, PRODUCT_CATEGORIES,
    RAW_COLUMNS, STAY_YEARS,
};
use crate::error::{FeatureError, Result};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info};

/// Raw fields in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Gender,
    Age,
    Occupation,
    City,
    Stay,
    Product(usize),
}

const FIELDS: [Field; 8] = [
    Field::Gender,
    Field::Age,
    Field::Occupation,
    Field::City,
    Field::Stay,
    Field::Product(0),
    Field::Product(1),
    Field::Product(2),
];

fn missing_value(column: &str, expected: &'static str) -> FeatureError {
    FeatureError::FormatError {
        column: column.to_string(),
        value: "null".to_string(),
        expected,
    }
}

/// Ordinal codes for age bands, ranked by their numeric lower bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBands {
    bands: Vec<String>,
}

impl AgeBands {
    fn fit(labels: &[Option<String>]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut keyed: Vec<(u32, String)> = Vec::new();
        for label in labels {
            let label = label
                .as_deref()
                .ok_or_else(|| missing_value(AGE, BAND_PATTERN))?;
            if seen.insert(label) {
                keyed.push((band_lower_bound(AGE, label)?, label.to_string()));
            }
        }
        // Ties on the lower bound fall back to label order
        keyed.sort();

        Ok(Self {
            bands: keyed.into_iter().map(|(_, label)| label).collect(),
        })
    }

    /// Band labels, lowest rank first
    pub fn bands(&self) -> &[String] {
        &self.bands
    }

    /// Rank of a band label
    pub fn rank(&self, label: &str) -> Option<i64> {
        self.bands.iter().position(|b| b == label).map(|i| i as i64)
    }

    fn ranks(&self) -> HashMap<&str, i64> {
        self.bands
            .iter()
            .enumerate()
            .map(|(i, band)| (band.as_str(), i as i64))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncoderState {
    age_bands: AgeBands,
    occupation: OneHotEncoding,
    city: OneHotEncoding,
    products: Vec<OneHotEncoding>,
}

impl EncoderState {
    fn one_hot_groups(&self) -> impl Iterator<Item = &OneHotEncoding> {
        [&self.occupation, &self.city]
            .into_iter()
            .chain(self.products.iter())
    }
}

/// Encoder for the raw transaction columns.
///
/// `fit` learns the age band ranks and the category sets of the one-hot
/// fields; `transform` replaces every raw column with its derived numeric
/// columns and passes all other columns through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEncoder {
    config: FeatureConfig,
    state: Option<EncoderState>,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl FeatureEncoder {
    /// Create a new encoder
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Whether `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.config.validate()?;
        require_columns(df, &RAW_COLUMNS)?;
        let config = &self.config;

        let age_bands = AgeBands::fit(&category_labels(series(df, AGE)?)?)?;
        debug!(bands = ?age_bands.bands(), "Fitted age bands");

        let occupation = OneHotEncoding::fit(
            OCCUPATION,
            &config.occupation_prefix,
            &category_labels(series(df, OCCUPATION)?)?,
            true,
            None,
        )?;
        let city = OneHotEncoding::fit(
            CITY_CATEGORY,
            &config.city_prefix,
            &category_labels(series(df, CITY_CATEGORY)?)?,
            true,
            None,
        )?;

        // Product categories 2 and 3 are sparse and carry a missing indicator
        let products = PRODUCT_CATEGORIES
            .iter()
            .zip(config.product_prefixes.iter())
            .enumerate()
            .map(|(i, (column, prefix))| {
                let labels = category_labels(series(df, column)?)?;
                let missing = (i > 0).then_some(config.missing_label.as_str());
                OneHotEncoding::fit(column, prefix, &labels, false, missing)
            })
            .collect::<Result<Vec<_>>>()?;

        let state = EncoderState {
            age_bands,
            occupation,
            city,
            products,
        };
        for group in state.one_hot_groups() {
            debug!(
                column = group.column(),
                categories = group.categories().len(),
                reference = ?group.reference_level(),
                "Fitted one-hot encoding"
            );
        }

        self.state = Some(state);
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let start = Instant::now();
        let state = self.state.as_ref().ok_or(FeatureError::NotFitted)?;
        require_columns(df, &RAW_COLUMNS)?;

        let groups: Vec<Vec<Column>> = if self.config.parallel {
            FIELDS
                .as_slice()
                .par_iter()
                .map(|field| self.encode_field(state, df, *field))
                .collect::<Result<Vec<_>>>()?
        } else {
            FIELDS
                .iter()
                .map(|field| self.encode_field(state, df, *field))
                .collect::<Result<Vec<_>>>()?
        };

        let mut columns: Vec<Column> = df
            .get_columns()
            .iter()
            .filter(|column| !RAW_COLUMNS.contains(&column.name().as_str()))
            .cloned()
            .collect();
        columns.extend(groups.into_iter().flatten());

        let result = DataFrame::new(columns)?;
        info!(
            rows = result.height(),
            columns = result.width(),
            excluded = ?self.excluded_columns(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Encoded feature table"
        );
        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    fn encode_field(&self, state: &EncoderState, df: &DataFrame, field: Field) -> Result<Vec<Column>> {
        let config = &self.config;
        match field {
            Field::Gender => {
                let labels = category_labels(series(df, GENDER)?)?;
                let reference = Some(config.gender_reference.as_str());
                let values: Vec<i32> = labels
                    .iter()
                    .map(|v| i32::from(v.as_deref() == reference))
                    .collect();
                Ok(vec![Series::new(config.sex_column.as_str().into(), values).into_column()])
            }
            Field::Age => {
                let labels = category_labels(series(df, AGE)?)?;
                let ranks = state.age_bands.ranks();
                let values = labels
                    .iter()
                    .map(|label| {
                        let label = label
                            .as_deref()
                            .ok_or_else(|| missing_value(AGE, BAND_PATTERN))?;
                        ranks.get(label).copied().ok_or_else(|| {
                            // Malformed labels report the format, well-formed ones are unseen
                            band_lower_bound(AGE, label).err().unwrap_or_else(|| {
                                FeatureError::UnknownCategory {
                                    column: AGE.to_string(),
                                    value: label.to_string(),
                                }
                            })
                        })
                    })
                    .collect::<Result<Vec<i64>>>()?;
                Ok(vec![Series::new(config.age_column.as_str().into(), values).into_column()])
            }
            Field::Occupation => {
                let labels = category_labels(series(df, OCCUPATION)?)?;
                Ok(state.occupation.transform(&labels))
            }
            Field::City => {
                let labels = category_labels(series(df, CITY_CATEGORY)?)?;
                Ok(state.city.transform(&labels))
            }
            Field::Stay => {
                let labels = category_labels(series(df, STAY_YEARS)?)?;
                let values = labels
                    .iter()
                    .map(|label| match label.as_deref() {
                        Some(value) => stay_years(STAY_YEARS, value),
                        None => Err(missing_value(STAY_YEARS, STAY_PATTERN)),
                    })
                    .collect::<Result<Vec<i64>>>()?;
                Ok(vec![Series::new(config.years_column.as_str().into(), values).into_column()])
            }
            Field::Product(i) => {
                let encoding = &state.products[i];
                let labels = category_labels(series(df, encoding.column())?)?;
                Ok(encoding.transform(&labels))
            }
        }
    }

    /// Learned age bands
    pub fn age_bands(&self) -> Option<&AgeBands> {
        self.state.as_ref().map(|s| &s.age_bands)
    }

    /// Learned one-hot encoding for a raw column
    pub fn one_hot(&self, column: &str) -> Option<&OneHotEncoding> {
        self.state
            .as_ref()?
            .one_hot_groups()
            .find(|group| group.column() == column)
    }

    /// Generated columns deliberately left out of the output
    pub fn excluded_columns(&self) -> Vec<String> {
        self.state
            .iter()
            .flat_map(|s| s.one_hot_groups())
            .flat_map(|group| group.excluded_names())
            .collect()
    }

    /// Derived column names in output order
    pub fn feature_names(&self) -> Vec<String> {
        let Some(state) = &self.state else {
            return Vec::new();
        };
        let config = &self.config;
        let mut names = vec![config.sex_column.clone(), config.age_column.clone()];
        names.extend(state.occupation.retained_names());
        names.extend(state.city.retained_names());
        names.push(config.years_column.clone());
        for product in &state.products {
            names.extend(product.retained_names());
        }
        names
    }
}

/// Encode a raw transaction table with the default configuration
pub fn encode(df: &DataFrame) -> Result<DataFrame> {
    FeatureEncoder::default().fit_transform(df)
}
