//! Ordinary least squares with an intercept
//!
//! Columns that are exact linear combinations of earlier design columns are
//! reported as aliased and left out of the fit. The remaining normal
//! equations are solved through a Cholesky factorization.

use std::fmt::Write as _;

use faer::prelude::SolverCore;
use faer::{Mat, Side};
use serde::Serialize;
use tracing::warn;

use super::design::DesignData;
use super::stats::{f_upper_tail, student_t_two_sided};
use crate::pipeline::error::{PipelineError, PipelineResult};

/// Relative residual norm below which a design column is treated as collinear
const ALIAS_TOLERANCE: f64 = 1e-7;

pub const INTERCEPT: &str = "(Intercept)";

/// One row of the coefficient table. Aliased terms carry no estimate.
#[derive(Debug, Clone, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: Option<f64>,
    pub std_error: Option<f64>,
    pub t_value: Option<f64>,
    pub p_value: Option<f64>,
}

impl Coefficient {
    pub fn is_aliased(&self) -> bool {
        self.estimate.is_none()
    }
}

/// A fitted least-squares model.
#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    pub formula: String,
    pub coefficients: Vec<Coefficient>,
    pub n_obs: usize,
    pub rows_omitted: usize,
    pub df_residual: usize,
    pub residual_std_error: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: Option<f64>,
    pub f_df: (usize, usize),
    pub f_p_value: Option<f64>,
    #[serde(skip)]
    pub residuals: Vec<f64>,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Decide which columns are linearly independent of the columns before them,
/// via modified Gram-Schmidt with one reorthogonalization pass.
fn independent_columns(columns: &[Vec<f64>]) -> Vec<bool> {
    let mut basis: Vec<Vec<f64>> = Vec::new();
    let mut keep = Vec::with_capacity(columns.len());

    for col in columns {
        let norm = dot(col, col).sqrt();
        if norm == 0.0 {
            keep.push(false);
            continue;
        }

        let mut v = col.clone();
        for _ in 0..2 {
            for q in &basis {
                let proj = dot(q, &v);
                for (vi, qi) in v.iter_mut().zip(q) {
                    *vi -= proj * qi;
                }
            }
        }

        let residual = dot(&v, &v).sqrt();
        if residual / norm < ALIAS_TOLERANCE {
            keep.push(false);
        } else {
            v.iter_mut().for_each(|x| *x /= residual);
            basis.push(v);
            keep.push(true);
        }
    }

    keep
}

/// Fit `response ~ 1 + features` by least squares.
pub fn fit_ols(design: &DesignData) -> PipelineResult<OlsFit> {
    let n = design.n_rows();

    let mut names = vec![INTERCEPT.to_string()];
    names.extend(design.feature_names.iter().cloned());
    let mut all_columns = vec![vec![1.0; n]];
    all_columns.extend(design.columns.iter().cloned());

    let keep = independent_columns(&all_columns);
    let used: Vec<usize> = (0..all_columns.len()).filter(|&j| keep[j]).collect();
    let p = used.len();

    for (j, name) in names.iter().enumerate() {
        if !keep[j] {
            warn!(term = %name, "coefficient not defined because of singularities");
        }
    }

    if n <= p {
        return Err(PipelineError::SingularDesign(format!(
            "{} observations for {} coefficients leaves no residual degrees of freedom",
            n, p
        )));
    }

    let mut x = Mat::<f64>::zeros(n, p);
    for (col_idx, &j) in used.iter().enumerate() {
        for (row_idx, &val) in all_columns[j].iter().enumerate() {
            x[(row_idx, col_idx)] = val;
        }
    }

    let xtx = x.transpose() * &x;
    let cholesky = xtx
        .cholesky(Side::Lower)
        .map_err(|e| PipelineError::SingularDesign(format!("{:?}", e)))?;
    let xtx_inv = cholesky.inverse();

    let y = &design.response;
    let xty: Vec<f64> = used.iter().map(|&j| dot(&all_columns[j], y)).collect();
    let beta: Vec<f64> = (0..p)
        .map(|i| (0..p).map(|k| xtx_inv[(i, k)] * xty[k]).sum())
        .collect();

    if beta.iter().any(|b| !b.is_finite()) {
        return Err(PipelineError::SingularDesign(
            "normal equations produced non-finite coefficients".to_string(),
        ));
    }

    let residuals: Vec<f64> = (0..n)
        .map(|i| {
            let fitted: f64 = used
                .iter()
                .zip(&beta)
                .map(|(&j, b)| all_columns[j][i] * b)
                .sum();
            y[i] - fitted
        })
        .collect();

    let rss: f64 = residuals.iter().map(|r| r * r).sum();
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let tss: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();

    let df_residual = n - p;
    let sigma2 = rss / df_residual as f64;

    let mut coefficients = Vec::with_capacity(names.len());
    let mut used_idx = 0usize;
    for (j, name) in names.iter().enumerate() {
        if keep[j] {
            let estimate = beta[used_idx];
            let std_error = (sigma2 * xtx_inv[(used_idx, used_idx)]).max(0.0).sqrt();
            let t_value = estimate / std_error;
            coefficients.push(Coefficient {
                name: name.clone(),
                estimate: Some(estimate),
                std_error: Some(std_error),
                t_value: Some(t_value),
                p_value: Some(student_t_two_sided(t_value, df_residual as f64)),
            });
            used_idx += 1;
        } else {
            coefficients.push(Coefficient {
                name: name.clone(),
                estimate: None,
                std_error: None,
                t_value: None,
                p_value: None,
            });
        }
    }

    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { 0.0 };
    let adj_r_squared =
        1.0 - (1.0 - r_squared) * ((n - 1) as f64 / df_residual as f64);

    let df_model = p - 1;
    let (f_statistic, f_p_value) = if df_model > 0 {
        let f = ((tss - rss) / df_model as f64) / sigma2;
        (Some(f), Some(f_upper_tail(f, df_model as f64, df_residual as f64)))
    } else {
        (None, None)
    };

    Ok(OlsFit {
        formula: design.formula(),
        coefficients,
        n_obs: n,
        rows_omitted: design.rows_omitted,
        df_residual,
        residual_std_error: sigma2.sqrt(),
        r_squared,
        adj_r_squared,
        f_statistic,
        f_df: (df_model, df_residual),
        f_p_value,
        residuals,
    })
}

/// Significance stars in the usual 0.001 / 0.01 / 0.05 / 0.1 bands
pub fn significance_stars(p: f64) -> &'static str {
    if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else if p < 0.1 {
        "."
    } else {
        ""
    }
}

impl OlsFit {
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    pub fn aliased(&self) -> Vec<&str> {
        self.coefficients
            .iter()
            .filter(|c| c.is_aliased())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Plain-text summary in the familiar regression-output layout.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Linear model: {}", self.formula);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<20} {:>14} {:>14} {:>9} {:>11}",
            "", "Estimate", "Std. Error", "t value", "Pr(>|t|)"
        );

        for c in &self.coefficients {
            match (c.estimate, c.std_error, c.t_value, c.p_value) {
                (Some(est), Some(se), Some(t), Some(p)) => {
                    let _ = writeln!(
                        out,
                        "{:<20} {:>14.4e} {:>14.4e} {:>9.3} {:>11.3e} {}",
                        c.name,
                        est,
                        se,
                        t,
                        p,
                        significance_stars(p)
                    );
                }
                _ => {
                    let _ = writeln!(
                        out,
                        "{:<20} {:>14} {:>14} {:>9} {:>11}",
                        c.name, "NA", "NA", "NA", "NA"
                    );
                }
            }
        }

        let aliased = self.aliased();
        if !aliased.is_empty() {
            let _ = writeln!(
                out,
                "({} not defined because of singularities: {})",
                aliased.len(),
                aliased.join(", ")
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Residual standard error: {:.4e} on {} degrees of freedom",
            self.residual_std_error, self.df_residual
        );
        if self.rows_omitted > 0 {
            let _ = writeln!(
                out,
                "  ({} observation(s) deleted due to missingness)",
                self.rows_omitted
            );
        }
        let _ = writeln!(
            out,
            "Multiple R-squared: {:.4},  Adjusted R-squared: {:.4}",
            self.r_squared, self.adj_r_squared
        );
        if let (Some(f), Some(p)) = (self.f_statistic, self.f_p_value) {
            let _ = writeln!(
                out,
                "F-statistic: {:.3} on {} and {} DF,  p-value: {:.3e}",
                f, self.f_df.0, self.f_df.1, p
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(columns: Vec<Vec<f64>>, names: &[&str], response: Vec<f64>) -> DesignData {
        DesignData {
            target: "y".to_string(),
            predictors: names.iter().map(|s| s.to_string()).collect(),
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            columns,
            response,
            rows_omitted: 0,
        }
    }

    #[test]
    fn test_independent_columns_flags_duplicates() {
        let keep = independent_columns(&[
            vec![1.0, 1.0, 1.0],
            vec![1.0, 2.0, 3.0],
            vec![2.0, 4.0, 6.0],
            vec![0.0, 0.0, 0.0],
        ]);
        assert_eq!(keep, vec![true, true, false, false]);
    }

    #[test]
    fn test_simple_regression_with_noise() {
        // y = 1 + 2x with residuals +-0.5
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y = vec![3.5, 4.5, 7.5, 8.5];
        let fit = fit_ols(&design(vec![x], &["x"], y)).unwrap();

        let slope = fit.coefficient("x").unwrap().estimate.unwrap();
        let intercept = fit.coefficient(INTERCEPT).unwrap().estimate.unwrap();
        assert!((slope - 1.8).abs() < 1e-10, "slope = {}", slope);
        assert!((intercept - 1.5).abs() < 1e-10, "intercept = {}", intercept);
        assert_eq!(fit.df_residual, 2);
        assert!(fit.r_squared > 0.9 && fit.r_squared < 1.0);
    }

    #[test]
    fn test_too_few_rows_is_singular() {
        let err = fit_ols(&design(vec![vec![1.0, 2.0]], &["x"], vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(err, PipelineError::SingularDesign(_)));
    }

    #[test]
    fn test_significance_stars() {
        assert_eq!(significance_stars(0.0001), "***");
        assert_eq!(significance_stars(0.03), "*");
        assert_eq!(significance_stars(0.5), "");
    }
}
