//! Design data extraction: complete-case rows and encoded predictors

use polars::prelude::*;
use tracing::debug;

use crate::pipeline::error::{PipelineError, PipelineResult};

/// Response and predictor columns ready for fitting.
///
/// Predictors are stored column-major, one `Vec<f64>` per encoded feature.
#[derive(Debug, Clone)]
pub struct DesignData {
    pub target: String,
    /// Source predictor columns, before encoding
    pub predictors: Vec<String>,
    /// Encoded feature names (string predictors expand into dummies)
    pub feature_names: Vec<String>,
    pub columns: Vec<Vec<f64>>,
    pub response: Vec<f64>,
    pub rows_omitted: usize,
}

impl DesignData {
    pub fn n_rows(&self) -> usize {
        self.response.len()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Values of one row across all encoded features.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|col| col[i]).collect()
    }

    /// `target ~ a + b + ...` for summaries
    pub fn formula(&self) -> String {
        format!("{} ~ {}", self.target, self.predictors.join(" + "))
    }
}

enum RawPredictor {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

fn read_numeric(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FieldNotFound(name.to_string()))?;
    if !(column.dtype().is_primitive_numeric() || column.dtype() == &DataType::Boolean) {
        return Err(PipelineError::TypeMismatch {
            column: name.to_string(),
            expected: "numeric".to_string(),
            found: column.dtype().to_string(),
        });
    }
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn read_predictor(df: &DataFrame, name: &str) -> PipelineResult<RawPredictor> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FieldNotFound(name.to_string()))?;

    match column.dtype() {
        DataType::String => Ok(RawPredictor::Categorical(
            column
                .str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect(),
        )),
        _ => read_numeric(df, name).map(RawPredictor::Numeric),
    }
}

/// Extract the response and predictors, omitting rows with any null among them.
///
/// String predictors are treatment-coded: levels are sorted, the first level
/// is the baseline, and each other level becomes a dummy named `<column><level>`.
pub fn build_design(
    df: &DataFrame,
    target: &str,
    predictors: &[String],
) -> PipelineResult<DesignData> {
    if predictors.is_empty() {
        return Err(PipelineError::InvalidConfig(
            "at least one predictor is required".to_string(),
        ));
    }
    if predictors.iter().any(|p| p == target) {
        return Err(PipelineError::InvalidConfig(format!(
            "target '{}' cannot also be a predictor",
            target
        )));
    }

    let response_raw = read_numeric(df, target)?;
    let raw: Vec<(String, RawPredictor)> = predictors
        .iter()
        .map(|name| read_predictor(df, name).map(|p| (name.clone(), p)))
        .collect::<PipelineResult<_>>()?;

    let complete: Vec<usize> = (0..df.height())
        .filter(|&i| {
            response_raw[i].is_some()
                && raw.iter().all(|(_, p)| match p {
                    RawPredictor::Numeric(v) => v[i].is_some(),
                    RawPredictor::Categorical(v) => v[i].is_some(),
                })
        })
        .collect();

    let rows_omitted = df.height() - complete.len();
    if rows_omitted > 0 {
        debug!(response = target, rows_omitted, "omitting rows with missing values");
    }

    if complete.is_empty() {
        return Err(PipelineError::InsufficientData(format!(
            "no complete rows for model of '{}'",
            target
        )));
    }

    let response: Vec<f64> = complete
        .iter()
        .filter_map(|&i| response_raw[i])
        .collect();

    let mut feature_names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (name, predictor) in &raw {
        match predictor {
            RawPredictor::Numeric(values) => {
                feature_names.push(name.clone());
                columns.push(complete.iter().filter_map(|&i| values[i]).collect());
            }
            RawPredictor::Categorical(values) => {
                let mut levels: Vec<&str> = complete
                    .iter()
                    .filter_map(|&i| values[i].as_deref())
                    .collect();
                levels.sort_unstable();
                levels.dedup();

                for level in levels.iter().skip(1) {
                    feature_names.push(format!("{}{}", name, level));
                    columns.push(
                        complete
                            .iter()
                            .map(|&i| {
                                if values[i].as_deref() == Some(*level) {
                                    1.0
                                } else {
                                    0.0
                                }
                            })
                            .collect(),
                    );
                }
            }
        }
    }

    Ok(DesignData {
        target: target.to_string(),
        predictors: predictors.to_vec(),
        feature_names,
        columns,
        response,
        rows_omitted,
    })
}
