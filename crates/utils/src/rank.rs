//! Ranking utilities.

use polars::prelude::*;

use crate::{UtilsError, numeric_column};

/// Percentile rank of a column: average-method rank divided by the count of
/// non-missing values. Missing and non-finite cells stay `None`.
///
/// # Errors
/// Returns error if the column is missing or non-numeric.
pub fn pct_rank(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, UtilsError> {
    let values = numeric_column(df, column)?;
    let frame = DataFrame::new(vec![Column::new("value".into(), values)])?;

    let ranked = frame
        .lazy()
        .select([(col("value")
            .rank(RankOptions { method: RankMethod::Average, descending: false }, None)
            .cast(DataType::Float64)
            / col("value").count().cast(DataType::Float64))
        .alias("pct")])
        .collect()?;

    Ok(ranked.column("pct")?.f64()?.into_iter().collect())
}

/// Keep the `n` rows with the largest `rank_var`, sorted descending; nulls sort last.
pub fn top_n(df: LazyFrame, n: u32, rank_var: &str) -> LazyFrame {
    let sort_options =
        SortMultipleOptions::new().with_order_descending(true).with_nulls_last(true).with_maintain_order(true);
    df.sort([rank_var], sort_options).limit(n)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn pct_rank_averages_ties() {
        let df = df! {
            "metric" => &[Some(3.0), Some(1.0), None, Some(3.0), Some(2.0)],
        }
        .unwrap();

        let ranks = pct_rank(&df, "metric").unwrap();
        assert_relative_eq!(ranks[0].unwrap(), 3.5 / 4.0);
        assert_relative_eq!(ranks[1].unwrap(), 1.0 / 4.0);
        assert!(ranks[2].is_none());
        assert_relative_eq!(ranks[3].unwrap(), 3.5 / 4.0);
        assert_relative_eq!(ranks[4].unwrap(), 2.0 / 4.0);
    }

    #[test]
    fn top_n_keeps_highest_scores() {
        let df = df! {
            "Ticker" => &["A", "B", "C", "D"],
            "Score" => &[Some(0.1), None, Some(2.0), Some(-1.0)],
        }
        .unwrap()
        .lazy();

        let result = top_n(df, 2, "Score").collect().unwrap();
        assert_eq!(result.height(), 2);
        let tickers: Vec<&str> = result.column("Ticker").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(tickers, vec!["C", "A"]);
    }
}
