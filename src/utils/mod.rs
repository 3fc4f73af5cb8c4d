//! Utility functions and types

pub mod synthetic;

pub use synthetic::{sample_transactions, AGE_BANDS};
