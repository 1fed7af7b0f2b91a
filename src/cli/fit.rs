//! `capstat fit`: fit one model against the cleaned table

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::cli::clean::{cleaner_config, load_and_clean};
use crate::cli::{confirm_overwrite, CleaningArgs};
use crate::pipeline::{fit_model, FittedModel, ModelFamily, ModelSpec, TreeConfig};
use crate::report::{display_model, ModelEntry};
use crate::utils::{print_success, with_spinner};

/// Options for the fit subcommand
pub struct FitOptions<'a> {
    pub family: ModelFamily,
    pub target: &'a str,
    pub predictors: &'a [String],
    pub exclude: &'a [String],
    pub min_split: usize,
    pub dot: Option<&'a Path>,
}

impl FitOptions<'_> {
    pub fn to_spec(&self) -> ModelSpec {
        ModelSpec::new(self.family.to_string(), self.family, self.target)
            .with_predictors(self.predictors)
            .excluding(self.exclude)
            .with_tree_config(TreeConfig::with_min_split(self.min_split))
    }
}

/// Write a tree model's Graphviz rendering. OLS models have none.
pub fn write_dot(model: &FittedModel, path: &Path) -> Result<bool> {
    match model.to_dot() {
        Some(dot) => {
            std::fs::write(path, dot)
                .with_context(|| format!("Failed to write Graphviz file {}", path.display()))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Run the fit subcommand
pub fn run_fit(
    input: &Path,
    options: &FitOptions<'_>,
    args: &CleaningArgs,
    no_confirm: bool,
) -> Result<()> {
    let spec = options.to_spec();

    println!(
        "\n {} Fitting {} model for {}",
        style("◆").cyan().bold(),
        style(spec.family).yellow(),
        style(&spec.target).yellow()
    );
    println!("   Input: {}", style(input.display()).dim());
    println!();

    let config = cleaner_config(args)?;
    let cleaned = load_and_clean(input, args, &config)?;

    let model = with_spinner(
        "Fitting model...",
        || fit_model(&cleaned.df, &spec),
        |model| format!("Model fitted on {} rows", model.n_obs()),
    )
    .with_context(|| format!("Failed to fit {} model", spec.family))?;

    let entry = ModelEntry::new(spec.name.clone(), spec.family, Ok(model));
    display_model(&entry);

    if let (Some(dot), Some(model)) = (options.dot, entry.model()) {
        if confirm_overwrite(dot, no_confirm)? && write_dot(model, dot)? {
            println!();
            print_success(&format!("Tree written to {}", dot.display()));
        }
    }

    Ok(())
}
