//! Feature scaling of the target and the engineered numeric columns

use super::config::{DegeneratePolicy, FeatureConfig};
use super::series;
use crate::error::{FeatureError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Type of scaling applied to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
}

/// Parameters for a fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    column: String,
    scaler_type: ScalerType,
    center: f64, // mean or min
    scale: f64,  // std or range
    /// Zero spread under `DegeneratePolicy::Zero`; every value scales to 0
    degenerate: bool,
}

impl ScalerParams {
    fn apply(&self, value: f64) -> f64 {
        if self.degenerate {
            0.0
        } else {
            (value - self.center) / self.scale
        }
    }

    fn invert(&self, value: f64) -> f64 {
        if self.degenerate {
            self.center
        } else {
            value * self.scale + self.center
        }
    }
}

/// Scaled output: the feature table plus the separately held target
#[derive(Debug, Clone)]
pub struct ScaledTable {
    /// Passthrough columns followed by the min-max normalized columns
    pub features: DataFrame,
    /// Standardized target column
    pub target: Series,
}

/// Scaler for the encoded transaction table.
///
/// The target column is standardized and removed from the features; the
/// item count, age band and years columns are min-max normalized into
/// `<column><suffix>` columns that replace the originals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    config: FeatureConfig,
    target: Option<ScalerParams>,
    minmax: Vec<ScalerParams>,
}

impl Default for FeatureScaler {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl FeatureScaler {
    /// Create a new scaler
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            target: None,
            minmax: Vec::new(),
        }
    }

    /// Whether `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.target.is_some()
    }

    /// Fitted target mean and standard deviation
    pub fn target_params(&self) -> Option<(f64, f64)> {
        self.target.as_ref().map(|p| (p.center, p.scale))
    }

    /// Fitted minimum and range of a min-max column
    pub fn minmax_params(&self, column: &str) -> Option<(f64, f64)> {
        self.minmax
            .iter()
            .find(|p| p.column == column)
            .map(|p| (p.center, p.scale))
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.config.validate()?;
        self.check_schema(df)?;

        let target = self.compute_params(df, &self.config.target_column, ScalerType::Standard)?;
        let minmax = self
            .config
            .minmax_columns()
            .iter()
            .map(|column| self.compute_params(df, column, ScalerType::MinMax))
            .collect::<Result<Vec<_>>>()?;

        self.target = Some(target);
        self.minmax = minmax;
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, df: &DataFrame) -> Result<ScaledTable> {
        let start = Instant::now();
        let target_params = self.target.as_ref().ok_or(FeatureError::NotFitted)?;
        self.check_schema(df)?;

        let target = scale_series(
            &numeric(df, &target_params.column)?,
            target_params,
            &target_params.column,
        )?;

        let scaled: Vec<Column> = self
            .minmax
            .iter()
            .map(|params| {
                let name = self.config.norm_name(&params.column);
                scale_series(&numeric(df, &params.column)?, params, &name).map(|s| s.into_column())
            })
            .collect::<Result<Vec<_>>>()?;

        let consumed = self.consumed_columns();
        let mut columns: Vec<Column> = df
            .get_columns()
            .iter()
            .filter(|column| !consumed.contains(&column.name().as_str()))
            .cloned()
            .collect();
        columns.extend(scaled);

        let features = DataFrame::new(columns)?;
        info!(
            rows = features.height(),
            columns = features.width(),
            target_column = %target_params.column,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scaled feature table"
        );
        Ok(ScaledTable { features, target })
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<ScaledTable> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Map standardized target values back to original units
    pub fn inverse_target(&self, values: &Series) -> Result<Series> {
        let params = self.target.as_ref().ok_or(FeatureError::NotFitted)?;
        let casted = values.cast(&DataType::Float64)?;
        let restored: Float64Chunked = casted
            .f64()?
            .into_iter()
            .map(|opt| opt.map(|v| params.invert(v)))
            .collect();
        Ok(restored.with_name(params.column.as_str().into()).into_series())
    }

    fn consumed_columns(&self) -> Vec<&str> {
        let mut consumed = vec![self.config.target_column.as_str()];
        consumed.extend(self.config.minmax_columns());
        consumed
    }

    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        for name in self.consumed_columns() {
            let column = series(df, name)?;
            if !is_numeric(column.dtype()) {
                return Err(FeatureError::NonNumericColumn {
                    column: name.to_string(),
                    dtype: column.dtype().to_string(),
                });
            }
        }
        Ok(())
    }

    fn compute_params(&self, df: &DataFrame, column: &str, scaler_type: ScalerType) -> Result<ScalerParams> {
        let values = numeric(df, column)?;
        let ca = values.f64()?;
        let empty = || FeatureError::ArithmeticError {
            column: column.to_string(),
            reason: "column has no values".to_string(),
        };

        let (center, scale) = match scaler_type {
            ScalerType::Standard => {
                let mean = ca.mean().ok_or_else(empty)?;
                let std = ca.std(self.config.std_ddof).ok_or_else(empty)?;
                (mean, std)
            }
            ScalerType::MinMax => {
                let min = ca.min().ok_or_else(empty)?;
                let max = ca.max().ok_or_else(empty)?;
                (min, max - min)
            }
        };

        let mut degenerate = false;
        if !(scale.is_finite() && scale > 0.0) {
            let reason = match scaler_type {
                ScalerType::Standard => "zero variance",
                ScalerType::MinMax => "zero range",
            };
            match self.config.degenerate_policy {
                DegeneratePolicy::Fail => {
                    return Err(FeatureError::ArithmeticError {
                        column: column.to_string(),
                        reason: reason.to_string(),
                    })
                }
                DegeneratePolicy::Zero => {
                    warn!(column, reason, "Degenerate column scaled to zero");
                    degenerate = true;
                }
            }
        }

        debug!(column, ?scaler_type, center, scale, "Fitted scaler");
        Ok(ScalerParams {
            column: column.to_string(),
            scaler_type,
            center,
            scale,
            degenerate,
        })
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 |
        DataType::Float32 | DataType::Float64
    )
}

/// Column as `f64` with `NaN` turned into null, so statistics skip it and
/// the scaled output keeps it missing
fn numeric(df: &DataFrame, column: &str) -> Result<Series> {
    let casted = series(df, column)?.cast(&DataType::Float64)?;
    let values: Float64Chunked = casted
        .f64()?
        .into_iter()
        .map(|opt| opt.filter(|v| !v.is_nan()))
        .collect();
    Ok(values.with_name(column.into()).into_series())
}

fn scale_series(values: &Series, params: &ScalerParams, name: &str) -> Result<Series> {
    let scaled: Float64Chunked = values
        .f64()?
        .into_iter()
        .map(|opt| opt.map(|v| params.apply(v)))
        .collect();

    Ok(scaled.with_name(name.into()).into_series())
}

/// Scale an encoded table with the default configuration
pub fn scale(df: &DataFrame) -> Result<ScaledTable> {
    FeatureScaler::default().fit_transform(df)
}
