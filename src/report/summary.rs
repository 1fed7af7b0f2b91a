//! Cleaning summary report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{CleaningStats, ZeroGamesPolicy};

/// Terminal rendering of a cleaning run
#[derive(Debug)]
pub struct CleaningSummary<'a> {
    pub stats: &'a CleaningStats,
}

impl<'a> CleaningSummary<'a> {
    pub fn new(stats: &'a CleaningStats) -> Self {
        Self { stats }
    }

    /// Build the metric/value table without printing it
    pub fn table(&self) -> Table {
        let stats = self.stats;

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Input Rows"),
            Cell::new(stats.input_rows),
        ]);
        table.add_row(vec![
            Cell::new("📁 Input Columns"),
            Cell::new(stats.input_columns),
        ]);
        table.add_row(vec![
            Cell::new("🔁 Multi-team Rows Dropped"),
            Cell::new(stats.multi_team_rows).fg(if stats.multi_team_rows == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        let zero_games_label = match stats.zero_games_policy {
            ZeroGamesPolicy::Exclude => "dropped",
            ZeroGamesPolicy::Null => "rates null",
            ZeroGamesPolicy::Zero => "rates zero",
        };
        table.add_row(vec![
            Cell::new("🥅 Zero-games Rows"),
            Cell::new(format!("{} ({})", stats.zero_games_rows, zero_games_label)).fg(
                if stats.zero_games_rows == 0 {
                    Color::White
                } else {
                    Color::Yellow
                },
            ),
        ]);
        table.add_row(vec![
            Cell::new("🗑️  Columns Removed"),
            Cell::new(stats.removed_columns.len()),
        ]);
        table.add_row(vec![
            Cell::new("✅ Output Rows"),
            Cell::new(stats.output_rows)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("✅ Output Columns"),
            Cell::new(stats.output_columns)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("CLEANING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        if !self.stats.removed_columns.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Removed columns").yellow(),
                style(format!("({})", self.stats.removed_columns.len())).dim()
            );
            println!(
                "        {} {}",
                style("•").dim(),
                self.stats.removed_columns.join(", ")
            );
        }

        if !self.stats.ignored_columns.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Ignored extra columns").yellow(),
                style(format!("({})", self.stats.ignored_columns.len())).dim()
            );
            for column in &self.stats.ignored_columns {
                println!("        {} {}", style("•").dim(), column);
            }
        }
    }
}
