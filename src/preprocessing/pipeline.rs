//! Encode-then-scale pipeline producing model-ready features

use super::config::FeatureConfig;
use super::encoder::FeatureEncoder;
use super::scaler::{FeatureScaler, ScaledTable};
use crate::error::{FeatureError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::info;

/// Final pipeline output handed to a model
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Numeric feature table
    pub features: DataFrame,
    /// Standardized target, row-aligned with `features`
    pub target: Series,
}

impl From<ScaledTable> for FeatureSet {
    fn from(table: ScaledTable) -> Self {
        Self {
            features: table.features,
            target: table.target,
        }
    }
}

impl FeatureSet {
    /// Number of rows
    pub fn n_samples(&self) -> usize {
        self.features.height()
    }

    /// Feature column names in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Row-major feature matrix and target vector.
    ///
    /// Fails if any feature or target value is null.
    pub fn to_ndarray(&self) -> Result<(Array2<f64>, Array1<f64>)> {
        let (n_rows, n_cols) = self.features.shape();
        let mut matrix = Array2::<f64>::zeros((n_rows, n_cols));

        for (j, column) in self.features.get_columns().iter().enumerate() {
            let casted = column.cast(&DataType::Float64)?;
            for (i, value) in casted.f64()?.into_iter().enumerate() {
                matrix[[i, j]] = value.ok_or_else(|| null_value(column.name().as_str(), i))?;
            }
        }

        let casted = self.target.cast(&DataType::Float64)?;
        let target = casted
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(i, value)| value.ok_or_else(|| null_value(self.target.name().as_str(), i)))
            .collect::<Result<Vec<f64>>>()?;

        Ok((matrix, Array1::from(target)))
    }
}

fn null_value(column: &str, row: usize) -> FeatureError {
    FeatureError::DataError(format!("null value in column {} at row {}", column, row))
}

/// Encoder and scaler applied in sequence
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    encoder: FeatureEncoder,
    scaler: FeatureScaler,
    is_fitted: bool,
    /// Timing: seconds spent in last fit call
    fit_time: Option<f64>,
    /// Timing: seconds spent in last transform call
    transform_time: Option<f64>,
    /// Total number of rows fitted
    samples_processed: usize,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePipeline {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self::with_config(FeatureConfig::default())
    }

    /// Create a new pipeline with custom configuration
    pub fn with_config(config: FeatureConfig) -> Self {
        Self {
            encoder: FeatureEncoder::new(config.clone()),
            scaler: FeatureScaler::new(config),
            is_fitted: false,
            fit_time: None,
            transform_time: None,
            samples_processed: 0,
        }
    }

    /// Fit encoder and scaler to the data.
    ///
    /// Both stages are fitted on copies; on error the previously fitted
    /// state is left untouched.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();

        let mut encoder = self.encoder.clone();
        let mut scaler = self.scaler.clone();
        let encoded = encoder.fit_transform(df)?;
        scaler.fit(&encoded)?;

        self.encoder = encoder;
        self.scaler = scaler;
        self.is_fitted = true;
        self.samples_processed += df.height();
        self.fit_time = Some(start.elapsed().as_secs_f64());
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureSet> {
        if !self.is_fitted {
            return Err(FeatureError::NotFitted);
        }

        let encoded = self.encoder.transform(df)?;
        let scaled = self.scaler.transform(&encoded)?;
        Ok(scaled.into())
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<FeatureSet> {
        self.fit(df)?;
        let start = Instant::now();
        let result = self.transform(df)?;
        self.transform_time = Some(start.elapsed().as_secs_f64());

        info!(
            rows = result.n_samples(),
            features = result.features.width(),
            fit_secs = self.fit_time.unwrap_or_default(),
            "Feature pipeline complete"
        );
        Ok(result)
    }

    /// Fitted encoder
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Fitted scaler
    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    /// Map standardized target values back to original units
    pub fn inverse_target(&self, values: &Series) -> Result<Series> {
        self.scaler.inverse_target(values)
    }

    /// Timing and throughput of the last runs.
    ///
    /// `total_samples_processed` counts rows passed to `fit` (including via
    /// `fit_transform`). `transform_time_secs` is only recorded by
    /// `fit_transform`; a standalone `transform` borrows immutably and is
    /// not timed.
    pub fn performance_metrics(&self) -> HashMap<String, f64> {
        let mut metrics = HashMap::new();
        if let Some(t) = self.fit_time {
            metrics.insert("fit_time_secs".to_string(), t);
        }
        if let Some(t) = self.transform_time {
            metrics.insert("transform_time_secs".to_string(), t);
        }
        metrics.insert(
            "total_samples_processed".to_string(),
            self.samples_processed as f64,
        );
        metrics
    }
}
