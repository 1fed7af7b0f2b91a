//! Model fitting against the cleaned table
//!
//! A [`ModelSpec`] names a family, a target and predictors. [`fit_model`]
//! builds the design data and dispatches to the OLS or tree engine.

pub mod design;
pub mod ols;
pub mod stats;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::schema::PLUS_MINUS;

pub use design::{build_design, DesignData};
pub use ols::{fit_ols, significance_stars, Coefficient, OlsFit};
pub use tree::{
    fit_classification_tree, fit_regression_tree, DecisionTree, TreeConfig, TreeKind, TreeNode,
};

/// Model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFamily {
    Ols,
    RegressionTree,
    ClassificationTree,
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::Ols => write!(f, "ols"),
            ModelFamily::RegressionTree => write!(f, "regression-tree"),
            ModelFamily::ClassificationTree => write!(f, "classification-tree"),
        }
    }
}

impl FromStr for ModelFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ols" | "lm" | "linear" => Ok(ModelFamily::Ols),
            "regression-tree" | "rtree" | "anova" => Ok(ModelFamily::RegressionTree),
            "classification-tree" | "ctree" | "class" => Ok(ModelFamily::ClassificationTree),
            _ => Err(format!(
                "Invalid model family '{}'. Use 'ols', 'regression-tree' or 'classification-tree'",
                s
            )),
        }
    }
}

/// What to fit: family, target, and predictor selection.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSpec {
    pub name: String,
    pub family: ModelFamily,
    pub target: String,
    /// Explicit predictors; empty means every column except the target,
    /// `plus_minus`, and anything in `exclude`
    pub predictors: Vec<String>,
    pub exclude: Vec<String>,
    pub tree: TreeConfig,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, family: ModelFamily, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            family,
            target: target.into(),
            predictors: Vec::new(),
            exclude: Vec::new(),
            tree: TreeConfig::default(),
        }
    }

    pub fn with_predictors<S: AsRef<str>>(mut self, predictors: &[S]) -> Self {
        self.predictors = predictors.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    pub fn excluding<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.exclude = columns.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    pub fn with_tree_config(mut self, config: TreeConfig) -> Self {
        self.tree = config;
        self
    }

    /// Predictor columns selected from `df`, in table order when implicit.
    pub fn resolve_predictors(&self, df: &DataFrame) -> Vec<String> {
        if !self.predictors.is_empty() {
            return self.predictors.clone();
        }
        df.get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| {
                name != &self.target && name != PLUS_MINUS && !self.exclude.contains(name)
            })
            .collect()
    }
}

/// A fitted model of any family.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "family", rename_all = "kebab-case")]
pub enum FittedModel {
    Ols(OlsFit),
    Tree(DecisionTree),
}

impl FittedModel {
    pub fn summary(&self) -> String {
        match self {
            FittedModel::Ols(fit) => fit.summary(),
            FittedModel::Tree(tree) => tree.summary(),
        }
    }

    pub fn to_dot(&self) -> Option<String> {
        match self {
            FittedModel::Tree(tree) => Some(tree.to_dot()),
            FittedModel::Ols(_) => None,
        }
    }

    pub fn n_obs(&self) -> usize {
        match self {
            FittedModel::Ols(fit) => fit.n_obs,
            FittedModel::Tree(tree) => tree.n_obs,
        }
    }

    pub fn formula(&self) -> &str {
        match self {
            FittedModel::Ols(fit) => &fit.formula,
            FittedModel::Tree(tree) => &tree.formula,
        }
    }
}

/// Fit one model against the cleaned table.
pub fn fit_model(df: &DataFrame, spec: &ModelSpec) -> PipelineResult<FittedModel> {
    let predictors = spec.resolve_predictors(df);
    if predictors.is_empty() {
        return Err(PipelineError::InvalidConfig(format!(
            "model '{}' has no predictors",
            spec.name
        )));
    }

    let design = build_design(df, &spec.target, &predictors)?;
    info!(
        model = %spec.name,
        family = %spec.family,
        rows = design.n_rows(),
        features = design.n_features(),
        "fitting model"
    );

    match spec.family {
        ModelFamily::Ols => fit_ols(&design).map(FittedModel::Ols),
        ModelFamily::RegressionTree => {
            fit_regression_tree(&design, spec.tree).map(FittedModel::Tree)
        }
        ModelFamily::ClassificationTree => {
            fit_classification_tree(&design, spec.tree).map(FittedModel::Tree)
        }
    }
}
