//! The standard set of models run by a full analysis

use crate::pipeline::model::{ModelFamily, ModelSpec, TreeConfig};
use crate::pipeline::schema::{
    AGE, ASSISTS, CANADA, GOALS, POINTS, SALARY, SHOTS_PER_GAME, TOI_PER_GAME, WEST,
};

/// Default minimum split size for the finer salary tree
pub const DEFAULT_FINE_MIN_SPLIT: usize = 5;

/// Six models: three OLS subsets, two salary trees, one conference tree.
pub fn standard_plan(fine_min_split: usize) -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("ols_full", ModelFamily::Ols, SALARY),
        ModelSpec::new("ols_scoring", ModelFamily::Ols, SALARY).with_predictors(&[
            AGE,
            GOALS,
            ASSISTS,
            SHOTS_PER_GAME,
            TOI_PER_GAME,
        ]),
        ModelSpec::new("ols_market", ModelFamily::Ols, SALARY)
            .with_predictors(&[AGE, POINTS, TOI_PER_GAME, CANADA, WEST]),
        ModelSpec::new("tree_salary", ModelFamily::RegressionTree, SALARY),
        ModelSpec::new("tree_salary_fine", ModelFamily::RegressionTree, SALARY)
            .with_tree_config(TreeConfig::with_min_split(fine_min_split)),
        ModelSpec::new("tree_conference", ModelFamily::ClassificationTree, WEST)
            .excluding(&[CANADA]),
    ]
}
