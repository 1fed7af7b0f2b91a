//! Terminal rendering of fitted models

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::model::{significance_stars, DecisionTree, OlsFit};
use crate::pipeline::{FittedModel, ModelFamily, PipelineError};

/// Outcome of fitting one model of the plan
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ModelStatus {
    Fitted { model: FittedModel },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    pub name: String,
    pub family: ModelFamily,
    #[serde(flatten)]
    pub status: ModelStatus,
}

impl ModelEntry {
    pub fn new(
        name: impl Into<String>,
        family: ModelFamily,
        result: Result<FittedModel, PipelineError>,
    ) -> Self {
        let status = match result {
            Ok(model) => ModelStatus::Fitted { model },
            Err(e) => ModelStatus::Failed {
                error: e.to_string(),
            },
        };
        Self {
            name: name.into(),
            family,
            status,
        }
    }

    pub fn model(&self) -> Option<&FittedModel> {
        match &self.status {
            ModelStatus::Fitted { model } => Some(model),
            ModelStatus::Failed { .. } => None,
        }
    }
}

fn fit_quality(model: &FittedModel) -> String {
    match model {
        FittedModel::Ols(fit) => format!("R² {:.3} (adj {:.3})", fit.r_squared, fit.adj_r_squared),
        FittedModel::Tree(tree) => {
            let leaves = tree.leaf_count();
            if tree.is_classification() {
                format!(
                    "{} leaves, error {:.1}%",
                    leaves,
                    100.0 * tree.training_loss() / tree.n_obs as f64
                )
            } else {
                format!("{} leaves", leaves)
            }
        }
    }
}

/// One line per model: family, rows used, headline fit statistic.
pub fn overview_table(entries: &[ModelEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Model").add_attribute(Attribute::Bold),
        Cell::new("Family").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new("Fit").add_attribute(Attribute::Bold),
    ]);

    for entry in entries {
        match &entry.status {
            ModelStatus::Fitted { model } => table.add_row(vec![
                Cell::new(&entry.name),
                Cell::new(entry.family),
                Cell::new(model.n_obs()).set_alignment(CellAlignment::Right),
                Cell::new(fit_quality(model)).fg(Color::Green),
            ]),
            ModelStatus::Failed { error } => table.add_row(vec![
                Cell::new(&entry.name),
                Cell::new(entry.family),
                Cell::new("-").set_alignment(CellAlignment::Right),
                Cell::new(error).fg(Color::Red),
            ]),
        };
    }

    table
}

/// Coefficient table with significance coloring; aliased terms show NA.
pub fn coefficient_table(fit: &OlsFit) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Term").add_attribute(Attribute::Bold),
        Cell::new("Estimate").add_attribute(Attribute::Bold),
        Cell::new("Std. Error").add_attribute(Attribute::Bold),
        Cell::new("t value").add_attribute(Attribute::Bold),
        Cell::new("Pr(>|t|)").add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);

    for c in &fit.coefficients {
        match (c.estimate, c.std_error, c.t_value, c.p_value) {
            (Some(est), Some(se), Some(t), Some(p)) => {
                let color = if p < 0.05 {
                    Color::Green
                } else if p < 0.1 {
                    Color::Yellow
                } else {
                    Color::White
                };
                table.add_row(vec![
                    Cell::new(&c.name),
                    Cell::new(format!("{:.4e}", est)).set_alignment(CellAlignment::Right),
                    Cell::new(format!("{:.4e}", se)).set_alignment(CellAlignment::Right),
                    Cell::new(format!("{:.3}", t)).set_alignment(CellAlignment::Right),
                    Cell::new(format!("{:.3e}", p))
                        .set_alignment(CellAlignment::Right)
                        .fg(color),
                    Cell::new(significance_stars(p)).fg(color),
                ]);
            }
            _ => {
                table.add_row(vec![
                    Cell::new(&c.name).fg(Color::DarkGrey),
                    Cell::new("NA").set_alignment(CellAlignment::Right),
                    Cell::new("NA").set_alignment(CellAlignment::Right),
                    Cell::new("NA").set_alignment(CellAlignment::Right),
                    Cell::new("NA").set_alignment(CellAlignment::Right),
                    Cell::new(""),
                ]);
            }
        }
    }

    table
}

fn print_indented(text: &str) {
    for line in text.lines() {
        println!("    {}", line);
    }
}

fn display_ols(fit: &OlsFit) {
    println!("      {}", style(&fit.formula).dim());
    print_indented(&coefficient_table(fit).to_string());

    let aliased = fit.aliased();
    if !aliased.is_empty() {
        println!(
            "      {} not defined because of singularities: {}",
            style(aliased.len()).yellow(),
            aliased.join(", ")
        );
    }
    println!(
        "      Residual standard error: {:.4e} on {} degrees of freedom",
        fit.residual_std_error, fit.df_residual
    );
    if fit.rows_omitted > 0 {
        println!(
            "      {}",
            style(format!(
                "({} observation(s) deleted due to missingness)",
                fit.rows_omitted
            ))
            .dim()
        );
    }
    println!(
        "      Multiple R-squared: {}, Adjusted R-squared: {}",
        style(format!("{:.4}", fit.r_squared)).yellow().bold(),
        style(format!("{:.4}", fit.adj_r_squared)).yellow()
    );
    if let (Some(f), Some(p)) = (fit.f_statistic, fit.f_p_value) {
        println!(
            "      F-statistic: {:.3} on {} and {} DF, p-value: {:.3e}",
            f, fit.f_df.0, fit.f_df.1, p
        );
    }
}

fn display_tree(tree: &DecisionTree) {
    for line in tree.summary().lines() {
        println!("      {}", line);
    }
    println!();
    for line in tree.render_text().lines() {
        println!("      {}", style(line).dim());
    }
}

/// Print one model entry in full
pub fn display_model(entry: &ModelEntry) {
    println!();
    println!(
        "    {} {} {}",
        style("◆").cyan().bold(),
        style(&entry.name).white().bold(),
        style(format!("[{}]", entry.family)).dim()
    );

    match &entry.status {
        ModelStatus::Fitted {
            model: FittedModel::Ols(fit),
        } => display_ols(fit),
        ModelStatus::Fitted {
            model: FittedModel::Tree(tree),
        } => display_tree(tree),
        ModelStatus::Failed { error } => {
            println!("      {} {}", style("✗").red().bold(), style(error).red());
        }
    }
}

/// Print the overview table followed by every model
pub fn display_models(entries: &[ModelEntry]) {
    println!();
    println!(
        "    {} {}",
        style("📈").cyan(),
        style("MODEL OVERVIEW").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
    print_indented(&overview_table(entries).to_string());

    for entry in entries {
        display_model(entry);
    }
}
