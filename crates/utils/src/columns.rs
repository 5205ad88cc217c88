//! Column extraction helpers.

use ndarray::Array2;
use polars::prelude::*;

use crate::UtilsError;

const fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Names of all numeric columns, in frame order.
#[must_use]
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Column values as `f64`, with nulls and non-finite values mapped to `None`.
///
/// # Errors
/// Returns error if the column is missing or cannot be cast to `Float64`.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, UtilsError> {
    let column = df.column(name).map_err(|_| UtilsError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::Float64)?;
    let values = cast.f64()?.into_iter().map(|v| v.filter(|x| x.is_finite())).collect();
    Ok(values)
}

/// Column values as strings; nulls stay `None`.
///
/// # Errors
/// Returns error if the column is missing or cannot be cast to `String`.
pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, UtilsError> {
    let column = df.column(name).map_err(|_| UtilsError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::String)?;
    let values = cast.str()?.into_iter().map(|v| v.map(str::to_string)).collect();
    Ok(values)
}

/// Dense `rows x names.len()` matrix of the named columns, missing cells as NaN.
///
/// # Errors
/// Returns error if any column is missing or non-numeric.
pub fn numeric_matrix(df: &DataFrame, names: &[String]) -> Result<Array2<f64>, UtilsError> {
    let mut matrix = Array2::from_elem((df.height(), names.len()), f64::NAN);
    for (j, name) in names.iter().enumerate() {
        for (i, value) in numeric_column(df, name)?.into_iter().enumerate() {
            if let Some(v) = value {
                matrix[[i, j]] = v;
            }
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataFrame {
        df! {
            "Ticker" => &["AAA", "BBB", "CCC"],
            "PE" => &[Some(10.0), None, Some(f64::INFINITY)],
            "Count" => &[1i64, 2, 3],
        }
        .unwrap()
    }

    #[test]
    fn numeric_names_skip_strings() {
        assert_eq!(numeric_column_names(&table()), vec!["PE".to_string(), "Count".to_string()]);
    }

    #[test]
    fn non_finite_becomes_missing() {
        assert_eq!(numeric_column(&table(), "PE").unwrap(), vec![Some(10.0), None, None]);
        assert_eq!(numeric_column(&table(), "Count").unwrap(), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn missing_column_is_reported() {
        assert!(matches!(numeric_column(&table(), "ROE"), Err(UtilsError::MissingColumn(_))));
    }

    #[test]
    fn matrix_uses_nan_for_missing() {
        let m = numeric_matrix(&table(), &["PE".to_string(), "Count".to_string()]).unwrap();
        assert_eq!(m.dim(), (3, 2));
        assert!(m[[1, 0]].is_nan());
        assert_eq!(m[[2, 1]], 3.0);
    }

    #[test]
    fn strings_round_trip() {
        let tickers = string_column(&table(), "Ticker").unwrap();
        assert_eq!(tickers[1].as_deref(), Some("BBB"));
    }
}
