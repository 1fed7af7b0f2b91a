//! `capstat describe`: distribution of one cleaned field

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::cli::clean::{cleaner_config, load_and_clean};
use crate::cli::{confirm_overwrite, select_field, CleaningArgs};
use crate::pipeline::{describe_field, DescribeField, Distribution, PlotKind};
use crate::utils::print_success;

/// Width of the longest bar in terminal plots
pub const PLOT_WIDTH: usize = 50;

/// Options for the describe subcommand
pub struct DescribeOptions<'a> {
    pub field: Option<&'a str>,
    pub kind: Option<PlotKind>,
    pub bins: Option<usize>,
    pub svg: Option<&'a Path>,
}

/// Map a field argument to a column name and default plot kind.
///
/// Known selectors (`salary`, `points`, ...) map to their columns; anything
/// else is taken as a column name and plotted as a histogram.
pub fn resolve_field(field: &str) -> (String, PlotKind) {
    match field.parse::<DescribeField>() {
        Ok(known) => (known.column().to_string(), known.default_kind()),
        Err(_) => (field.to_string(), PlotKind::Histogram),
    }
}

/// Print a distribution to the terminal
pub fn print_distribution(distribution: &Distribution) {
    let s = &distribution.summary;
    println!();
    println!(
        "    {} {}",
        style("📊").cyan(),
        style(format!("{} of {}", distribution.kind(), distribution.field).to_uppercase())
            .white()
            .bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!(
        "      n = {}  mean = {:.4}  sd = {:.4}",
        style(s.n).yellow(),
        s.mean,
        s.sd
    );
    println!(
        "      min = {:.4}  median = {:.4}  max = {:.4}",
        s.min, s.median, s.max
    );
    println!();
    for line in distribution.render_text(PLOT_WIDTH).lines().skip(1) {
        println!("      {}", line);
    }
}

/// Write a distribution's SVG rendering
pub fn write_svg(distribution: &Distribution, path: &Path) -> Result<()> {
    std::fs::write(path, distribution.to_svg())
        .with_context(|| format!("Failed to write SVG to {}", path.display()))
}

/// Run the describe subcommand
pub fn run_describe(
    input: &Path,
    options: &DescribeOptions<'_>,
    args: &CleaningArgs,
    no_confirm: bool,
) -> Result<()> {
    let (column, default_kind) = match options.field {
        Some(field) => resolve_field(field),
        None if no_confirm => anyhow::bail!(
            "A field is required when using --no-confirm. Use -f/--field to specify."
        ),
        None => {
            let field = select_field()?;
            (field.column().to_string(), field.default_kind())
        }
    };
    let kind = options.kind.unwrap_or(default_kind);

    let config = cleaner_config(args)?;
    let cleaned = load_and_clean(input, args, &config)?;
    let distribution = describe_field(&cleaned.df, &column, kind, options.bins)
        .with_context(|| format!("Failed to describe '{}'", column))?;

    print_distribution(&distribution);

    if let Some(svg) = options.svg {
        if confirm_overwrite(svg, no_confirm)? {
            write_svg(&distribution, svg)?;
            println!();
            print_success(&format!("Plot written to {}", svg.display()));
        }
    }

    Ok(())
}
