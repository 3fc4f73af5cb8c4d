//! Synthetic transaction tables for demos, tests and benchmarks

use crate::error::Result;
use polars::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Age bands in the shape retail datasets publish them
pub const AGE_BANDS: [&str; 7] = ["0-17", "18-25", "26-35", "36-45", "46-50", "51-55", "55+"];

const CITY_CATEGORIES: [&str; 3] = ["A", "B", "C"];
const STAY_VALUES: [&str; 5] = ["0", "1", "2", "3", "4+"];

/// Generate `n_rows` raw transactions.
///
/// The table has every raw column the encoder needs plus `User_ID`,
/// `Product_ID`, `Marital_Status`, `num_items` and `Purchase`. Product
/// categories 2 and 3 are sparse, like in real exports.
pub fn sample_transactions(n_rows: usize, seed: u64) -> Result<DataFrame> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut user_id = Vec::with_capacity(n_rows);
    let mut product_id = Vec::with_capacity(n_rows);
    let mut gender = Vec::with_capacity(n_rows);
    let mut age = Vec::with_capacity(n_rows);
    let mut occupation = Vec::with_capacity(n_rows);
    let mut city = Vec::with_capacity(n_rows);
    let mut stay = Vec::with_capacity(n_rows);
    let mut marital = Vec::with_capacity(n_rows);
    let mut pc1 = Vec::with_capacity(n_rows);
    let mut pc2: Vec<Option<f64>> = Vec::with_capacity(n_rows);
    let mut pc3: Vec<Option<f64>> = Vec::with_capacity(n_rows);
    let mut num_items = Vec::with_capacity(n_rows);
    let mut purchase = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        user_id.push(1_000_001 + rng.gen_range(0..6_000i64));
        product_id.push(format!("P00{:06}", rng.gen_range(0..400_000u32)));
        gender.push(if rng.gen_bool(0.75) { "M" } else { "F" });
        age.push(AGE_BANDS[rng.gen_range(0..AGE_BANDS.len())]);
        occupation.push(rng.gen_range(0..21i64));
        city.push(CITY_CATEGORIES[rng.gen_range(0..CITY_CATEGORIES.len())]);
        stay.push(STAY_VALUES[rng.gen_range(0..STAY_VALUES.len())]);
        marital.push(rng.gen_range(0..2i64));

        let category = rng.gen_range(1..=20i64);
        pc1.push(category);
        pc2.push(rng.gen_bool(0.68).then(|| rng.gen_range(2..=18) as f64));
        pc3.push(rng.gen_bool(0.30).then(|| rng.gen_range(3..=18) as f64));

        num_items.push(rng.gen_range(1..=120i64));
        // Cheaper categories sell for less
        let base = 12_000.0 - 450.0 * category as f64;
        let amount = base + rng.gen_range(-4_000.0..4_000.0);
        purchase.push(amount.max(185.0).round() as i64);
    }

    let df = df!(
        "User_ID" => user_id,
        "Product_ID" => product_id,
        "Gender" => gender,
        "Age" => age,
        "Occupation" => occupation,
        "City_Category" => city,
        "Stay_In_Current_City_Years" => stay,
        "Marital_Status" => marital,
        "Product_Category_1" => pc1,
        "Product_Category_2" => pc2,
        "Product_Category_3" => pc3,
        "num_items" => num_items,
        "Purchase" => purchase,
    )?;
    Ok(df)
}
