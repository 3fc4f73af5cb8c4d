//! Integration test: categorical encoding of raw transactions

use retail_features::prelude::*;
use retail_features::preprocessing::{RAW_COLUMNS, PRODUCT_CATEGORIES};
use retail_features::utils::sample_transactions;
use polars::prelude::*;

fn scenario_df() -> DataFrame {
    df!(
        "Gender" => &["F", "M", "M", "F"],
        "Age" => &["26-35", "55+", "0-17", "18-25"],
        "Occupation" => &[4i64, 12, 0, 17],
        "City_Category" => &["B", "A", "C", "A"],
        "Stay_In_Current_City_Years" => &["3", "4+", "0", "1"],
        "Product_Category_1" => &[5i64, 1, 8, 5],
        "Product_Category_2" => &[None, Some(6.0), Some(14.0), Some(6.0)],
        "Product_Category_3" => &[None, Some(16.0), None, Some(5.0)],
        "num_items" => &[11i64, 4, 27, 9],
        "Purchase" => &[8000i64, 15200, 1422, 9877],
    )
    .unwrap()
}

fn int_at(df: &DataFrame, column: &str, row: usize) -> i64 {
    df.column(column)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .get(row)
        .unwrap()
}

fn group_columns(df: &DataFrame, prefix: &str) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|n| n.to_string())
        .filter(|n| n.starts_with(&format!("{}_", prefix)))
        .collect()
}

fn group_sum(df: &DataFrame, prefix: &str, row: usize) -> i64 {
    group_columns(df, prefix)
        .iter()
        .map(|c| int_at(df, c, row))
        .sum()
}

#[test]
fn test_example_scenario_row() {
    let encoded = encode(&scenario_df()).unwrap();

    // Row 0: F, 26-35, occupation 4, city B, 3 years, pc1 5, no pc2/pc3
    assert_eq!(int_at(&encoded, "sex", 0), 1);
    assert_eq!(int_at(&encoded, "age", 0), 2);
    assert_eq!(int_at(&encoded, "occ_4", 0), 1);
    assert_eq!(group_sum(&encoded, "occ", 0), 1);
    assert_eq!(int_at(&encoded, "citycat_B", 0), 1);
    assert_eq!(int_at(&encoded, "citycat_A", 0), 0);
    assert!(encoded.column("citycat_C").is_err());
    assert_eq!(int_at(&encoded, "years", 0), 3);
    assert_eq!(int_at(&encoded, "pc1_5", 0), 1);
    assert_eq!(group_sum(&encoded, "pc1", 0), 1);
    assert_eq!(group_sum(&encoded, "pc2", 0), 0);
    assert_eq!(group_sum(&encoded, "pc3", 0), 0);
    assert_eq!(int_at(&encoded, "Purchase", 0), 8000);
}

#[test]
fn test_row_count_preserved() {
    let raw = sample_transactions(500, 3).unwrap();
    let encoded = encode(&raw).unwrap();
    assert_eq!(encoded.height(), raw.height());
}

#[test]
fn test_passthrough_columns_unchanged() {
    let raw = sample_transactions(200, 11).unwrap();
    let encoded = encode(&raw).unwrap();

    for name in ["User_ID", "Product_ID", "Marital_Status", "num_items", "Purchase"] {
        let before = raw.column(name).unwrap();
        let after = encoded.column(name).unwrap();
        assert!(before.as_materialized_series().equals(after.as_materialized_series()));
    }
    for raw_name in RAW_COLUMNS {
        assert!(encoded.column(raw_name).is_err());
    }
}

#[test]
fn test_age_rank_ignores_input_order() {
    let orders = [
        ["0-17", "18-25", "55+"],
        ["55+", "0-17", "18-25"],
        ["18-25", "55+", "0-17"],
    ];

    for order in orders {
        let mut df = scenario_df().head(Some(3));
        df.with_column(Series::new("Age".into(), &order)).unwrap();
        let mut encoder = FeatureEncoder::default();
        let encoded = encoder.fit_transform(&df).unwrap();

        for (row, label) in order.iter().enumerate() {
            let expected = match *label {
                "0-17" => 0,
                "18-25" => 1,
                "55+" => 2,
                _ => unreachable!(),
            };
            assert_eq!(int_at(&encoded, "age", row), expected, "order {:?}", order);
        }
        let bands = encoder.age_bands().unwrap();
        assert_eq!(bands.bands(), &["0-17", "18-25", "55+"]);
    }
}

#[test]
fn test_one_hot_groups_drop_reference() {
    let raw = sample_transactions(400, 5).unwrap();
    let mut encoder = FeatureEncoder::default();
    let encoded = encoder.fit_transform(&raw).unwrap();

    for (column, prefix) in [("Occupation", "occ"), ("City_Category", "citycat")] {
        let group = encoder.one_hot(column).unwrap();
        let reference = group.reference_level().unwrap().to_string();
        assert_eq!(group_columns(&encoded, prefix).len(), group.categories().len() - 1);

        let labels = raw
            .column(column)
            .unwrap()
            .cast(&DataType::String)
            .unwrap();
        let labels = labels.str().unwrap();
        for row in 0..encoded.height() {
            let sum = group_sum(&encoded, prefix, row);
            if labels.get(row) == Some(reference.as_str()) {
                assert_eq!(sum, 0);
            } else {
                assert_eq!(sum, 1);
            }
        }
    }
}

#[test]
fn test_product_category_missing_rows_are_zero() {
    let raw = sample_transactions(300, 9).unwrap();
    let mut encoder = FeatureEncoder::default();
    let encoded = encoder.fit_transform(&raw).unwrap();

    assert_eq!(encoder.excluded_columns(), vec!["pc2_nan", "pc3_nan"]);
    for (column, prefix) in PRODUCT_CATEGORIES.iter().zip(["pc1", "pc2", "pc3"]) {
        let group = encoder.one_hot(column).unwrap();
        assert!(group.reference_level().is_none());
        assert_eq!(group_columns(&encoded, prefix).len(), group.categories().len());

        let source = raw.column(column).unwrap();
        for row in 0..encoded.height() {
            let expected = if source.get(row).unwrap().is_null() { 0 } else { 1 };
            assert_eq!(group_sum(&encoded, prefix, row), expected);
        }
    }
}

#[test]
fn test_gender_reference_is_configurable() {
    let config = FeatureConfig::default().with_gender_reference("M");
    let encoded = FeatureEncoder::new(config)
        .fit_transform(&scenario_df())
        .unwrap();
    assert_eq!(int_at(&encoded, "sex", 0), 0);
    assert_eq!(int_at(&encoded, "sex", 1), 1);
}

#[test]
fn test_missing_raw_column() {
    let df = scenario_df().drop("City_Category").unwrap();
    let err = encode(&df).unwrap_err();
    assert!(matches!(err, FeatureError::ColumnNotFound(ref c) if c == "City_Category"));
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(err.is_validation());
}

#[test]
fn test_malformed_age_band() {
    let mut df = scenario_df();
    df.with_column(Series::new("Age".into(), &["26-35", "old", "0-17", "18-25"]))
        .unwrap();
    let err = encode(&df).unwrap_err();
    assert!(matches!(err, FeatureError::FormatError { ref value, .. } if value == "old"));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_malformed_stay_value() {
    let mut df = scenario_df();
    df.with_column(Series::new(
        "Stay_In_Current_City_Years".into(),
        &["3", "4+", "two", "1"],
    ))
    .unwrap();
    let err = encode(&df).unwrap_err();
    assert!(matches!(err, FeatureError::FormatError { ref column, .. } if column == "Stay_In_Current_City_Years"));
}

#[test]
fn test_integer_stay_column() {
    let mut df = scenario_df();
    df.with_column(Series::new("Stay_In_Current_City_Years".into(), &[3i64, 4, 0, 1]))
        .unwrap();
    let encoded = encode(&df).unwrap();
    assert_eq!(int_at(&encoded, "years", 1), 4);
}

#[test]
fn test_fitted_categories_apply_to_new_rows() {
    let mut encoder = FeatureEncoder::default();
    let train = encoder.fit_transform(&scenario_df()).unwrap();

    let mut test = scenario_df().head(Some(2));
    test.with_column(Series::new("Occupation".into(), &[99i64, 12]))
        .unwrap();
    let encoded = encoder.transform(&test).unwrap();

    assert_eq!(encoded.width(), train.width());
    assert_eq!(group_sum(&encoded, "occ", 0), 0);
}

#[test]
fn test_literal_missing_label_category_rejected() {
    let mut df = scenario_df();
    df.with_column(Series::new(
        "Product_Category_2".into(),
        &[None, Some("6"), Some("nan"), Some("6")],
    ))
    .unwrap();

    let mut encoder = FeatureEncoder::default();
    let err = encoder.fit(&df).unwrap_err();
    assert!(matches!(err, FeatureError::FormatError { ref column, ref value, .. }
        if column == "Product_Category_2" && value == "nan"));
    assert!(!encoder.is_fitted());
}
