//! Retail features - feature engineering for retail transaction tables
//!
//! Turns a raw transaction table (gender, age band, occupation, city,
//! tenure, product categories, purchase amount) into a numeric feature
//! matrix and a standardized target for a downstream model.
//!
//! # Modules
//!
//! - [`preprocessing`] - Categorical encoding, scaling and the pipeline
//! - [`utils`] - Synthetic transaction tables
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use retail_features::prelude::*;
//!
//! let raw = retail_features::utils::sample_transactions(1_000, 42)?;
//! let mut pipeline = FeaturePipeline::new();
//! let set = pipeline.fit_transform(&raw)?;
//! let (x, y) = set.to_ndarray()?;
//! assert_eq!(x.nrows(), y.len());
//! # Ok::<(), retail_features::FeatureError>(())
//! ```

// Core error handling
pub mod error;

// Encoding and scaling
pub mod preprocessing;

// Utilities
pub mod utils;

// Services
pub mod cli;

pub use error::{FeatureError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ErrorKind, FeatureError, Result};

    // Preprocessing
    pub use crate::preprocessing::{
        encode, scale, DegeneratePolicy, FeatureConfig, FeatureEncoder, FeaturePipeline,
        FeatureScaler, FeatureSet, ScaledTable,
    };
}
