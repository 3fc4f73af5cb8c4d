//! Category label extraction and one-hot expansion

use crate::error::{FeatureError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Normalize a column to text labels, `None` for missing values.
///
/// Integer codes print as-is, integral floats drop their fractional part
/// (`4.0` becomes `"4"`), and `NaN` counts as missing.
pub(crate) fn category_labels(series: &Series) -> Result<Vec<Option<String>>> {
    let labels: Vec<Option<String>> = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 => {
            let casted = series.cast(&DataType::Int64)?;
            casted
                .i64()?
                .into_iter()
                .map(|v| v.map(|x| x.to_string()))
                .collect()
        }
        DataType::UInt64 => series
            .u64()?
            .into_iter()
            .map(|v| v.map(|x| x.to_string()))
            .collect(),
        DataType::Float32 | DataType::Float64 => {
            let casted = series.cast(&DataType::Float64)?;
            casted
                .f64()?
                .into_iter()
                .map(|v| v.and_then(float_label))
                .collect()
        }
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map(|x| x.to_string()))
            .collect(),
        DataType::Null => vec![None; series.len()],
        other => {
            let casted = series.cast(&DataType::String).map_err(|_| {
                FeatureError::DataError(format!(
                    "column {} has unsupported dtype {}",
                    series.name(),
                    other
                ))
            })?;
            casted
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect()
        }
    };
    Ok(labels)
}

fn float_label(value: f64) -> Option<String> {
    if value.is_nan() {
        None
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        Some(format!("{}", value as i64))
    } else {
        Some(value.to_string())
    }
}

/// Sort labels numerically when every label is a number, otherwise
/// lexicographically.
pub(crate) fn sort_categories(labels: &mut [String]) {
    let numeric: Option<Vec<f64>> = labels.iter().map(|l| l.parse::<f64>().ok()).collect();
    match numeric {
        Some(_) => labels.sort_by(|a, b| {
            let (x, y) = (a.parse::<f64>().unwrap_or(0.0), b.parse::<f64>().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b))
        }),
        None => labels.sort(),
    }
}

/// Fitted one-hot expansion for a single categorical column.
///
/// Indicator columns are named `<prefix>_<category>`. With `drop_reference`
/// the last category in sort order gets no indicator. With a missing label
/// an extra `<prefix>_<missing_label>` column is part of the expansion but
/// excluded from the retained output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoding {
    column: String,
    prefix: String,
    categories: Vec<String>,
    drop_reference: bool,
    missing_label: Option<String>,
}

impl OneHotEncoding {
    /// Learn the sorted category set from observed labels.
    ///
    /// A category spelled like the missing label would share its indicator
    /// name and is rejected with `FormatError`.
    pub(crate) fn fit(
        column: &str,
        prefix: &str,
        labels: &[Option<String>],
        drop_reference: bool,
        missing_label: Option<&str>,
    ) -> Result<Self> {
        let distinct: BTreeSet<&str> = labels.iter().flatten().map(String::as_str).collect();
        if let Some(label) = missing_label.filter(|label| distinct.contains(label)) {
            return Err(FeatureError::FormatError {
                column: column.to_string(),
                value: label.to_string(),
                expected: "a category distinct from the missing label",
            });
        }
        let mut categories: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        sort_categories(&mut categories);

        Ok(Self {
            column: column.to_string(),
            prefix: prefix.to_string(),
            categories,
            drop_reference,
            missing_label: missing_label.map(str::to_string),
        })
    }

    /// Source column name
    pub fn column(&self) -> &str {
        &self.column
    }

    /// All observed categories in sort order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Category without an indicator column, if one is dropped
    pub fn reference_level(&self) -> Option<&str> {
        if self.drop_reference {
            self.categories.last().map(String::as_str)
        } else {
            None
        }
    }

    fn indicator_name(&self, label: &str) -> String {
        format!("{}_{}", self.prefix, label)
    }

    /// Every column the expansion generates, in order
    pub fn generated_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .categories
            .iter()
            .filter(|c| Some(c.as_str()) != self.reference_level())
            .map(|c| self.indicator_name(c))
            .collect();
        if let Some(label) = &self.missing_label {
            names.push(self.indicator_name(label));
        }
        names
    }

    /// Generated columns that never reach the output
    pub fn excluded_names(&self) -> Vec<String> {
        self.missing_label
            .iter()
            .map(|label| self.indicator_name(label))
            .collect()
    }

    /// Columns kept in the output, in order
    pub fn retained_names(&self) -> Vec<String> {
        let excluded = self.excluded_names();
        self.generated_names()
            .into_iter()
            .filter(|name| !excluded.contains(name))
            .collect()
    }

    /// Full expansion, including the missing indicator
    pub(crate) fn expand(&self, labels: &[Option<String>]) -> Vec<Column> {
        let kept: Vec<&String> = self
            .categories
            .iter()
            .filter(|c| Some(c.as_str()) != self.reference_level())
            .collect();
        let index: HashMap<&str, usize> = kept
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut indicators = vec![vec![0i32; labels.len()]; kept.len()];
        let mut missing = vec![0i32; labels.len()];
        for (row, label) in labels.iter().enumerate() {
            match label {
                Some(value) => {
                    if let Some(&i) = index.get(value.as_str()) {
                        indicators[i][row] = 1;
                    }
                }
                None => missing[row] = 1,
            }
        }

        let mut columns: Vec<Column> = kept
            .iter()
            .zip(indicators)
            .map(|(category, values)| {
                Series::new(self.indicator_name(category).into(), values).into_column()
            })
            .collect();
        if let Some(label) = &self.missing_label {
            columns.push(Series::new(self.indicator_name(label).into(), missing).into_column());
        }
        columns
    }

    /// Retained indicator columns for the given labels
    pub(crate) fn transform(&self, labels: &[Option<String>]) -> Vec<Column> {
        let excluded = self.excluded_names();
        self.expand(labels)
            .into_iter()
            .filter(|column| !excluded.iter().any(|name| name == column.name().as_str()))
            .collect()
    }
}
