//! Retail transaction preprocessing
//!
//! Turns a raw transaction table into a numeric feature matrix:
//! - Categorical encoding (gender indicator, ordinal bands, one-hot groups)
//! - Feature scaling (standardized target, min-max normalized features)
//! - A pipeline chaining both and handing the result to a model

mod bands;
mod categories;
mod config;
mod encoder;
mod pipeline;
mod scaler;

pub use bands::{band_lower_bound, stay_years};
pub use categories::OneHotEncoding;
pub use config::{DegeneratePolicy, FeatureConfig};
pub use encoder::{encode, AgeBands, FeatureEncoder};
pub use pipeline::{FeaturePipeline, FeatureSet};
pub use scaler::{scale, FeatureScaler, ScaledTable, ScalerType};

use crate::error::{FeatureError, Result};
use polars::prelude::*;

/// Raw gender column
pub const GENDER: &str = "Gender";
/// Raw age band column
pub const AGE: &str = "Age";
/// Raw occupation code column
pub const OCCUPATION: &str = "Occupation";
/// Raw city category column
pub const CITY_CATEGORY: &str = "City_Category";
/// Raw years-in-city column
pub const STAY_YEARS: &str = "Stay_In_Current_City_Years";
/// Raw product category columns
pub const PRODUCT_CATEGORIES: [&str; 3] = [
    "Product_Category_1",
    "Product_Category_2",
    "Product_Category_3",
];

/// Every raw column the encoder consumes
pub const RAW_COLUMNS: [&str; 8] = [
    GENDER,
    AGE,
    OCCUPATION,
    CITY_CATEGORY,
    STAY_YEARS,
    PRODUCT_CATEGORIES[0],
    PRODUCT_CATEGORIES[1],
    PRODUCT_CATEGORIES[2],
];

/// Fail with `ColumnNotFound` for the first absent column
pub(crate) fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    for name in columns {
        if df.column(name).is_err() {
            return Err(FeatureError::missing(name));
        }
    }
    Ok(())
}

/// Fetch a column as a materialized series
pub(crate) fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| FeatureError::missing(name))
}
