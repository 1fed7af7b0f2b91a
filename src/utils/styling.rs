//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static TREE: Emoji<'_, '_> = Emoji("🌲 ", "");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Settings shown on the configuration card
pub struct ConfigCard<'a> {
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub report: Option<&'a Path>,
    pub zero_games: String,
    pub fine_min_split: usize,
    pub teams: Option<&'a Path>,
}

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ██████╗ █████╗ ██████╗ ███████╗████████╗ █████╗ ████████╗
    ██╔════╝██╔══██╗██╔══██╗██╔════╝╚══██╔══╝██╔══██╗╚══██╔══╝
    ██║     ███████║██████╔╝███████╗   ██║   ███████║   ██║
    ██║     ██╔══██║██╔═══╝ ╚════██║   ██║   ██╔══██║   ██║
    ╚██████╗██║  ██║██║     ███████║   ██║   ██║  ██║   ██║
     ╚═════╝╚═╝  ╚═╝╚═╝     ╚══════╝   ╚═╝   ╚═╝  ╚═╝   ╚═╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("$").magenta().bold(),
        style("What is a point worth on the cap sheet?").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(card: &ConfigCard<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let none = "(none)".to_string();

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:  {:<39}│",
        FOLDER,
        truncate_path(card.input, 38)
    );
    println!(
        "    │  {} Output: {:<39}│",
        SAVE,
        card.output
            .map(|p| truncate_path(p, 38))
            .unwrap_or_else(|| none.clone())
    );
    println!(
        "    │  {} Report: {:<39}│",
        SAVE,
        card.report
            .map(|p| truncate_path(p, 38))
            .unwrap_or_else(|| none.clone())
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Zero-games policy:     {:<24}│",
        CHART,
        style(&card.zero_games).yellow()
    );
    println!(
        "    │  {} Fine tree min split:   {:<24}│",
        TREE,
        style(card.fine_min_split).yellow()
    );
    println!(
        "    │  {} Team sets:             {:<24}│",
        FOLDER,
        card.teams
            .map(|p| truncate_path(p, 23))
            .unwrap_or_else(|| "built-in".to_string())
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}",
        style(format!("({:.2}s)", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Salary analysis complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a/very/long/path.csv", 10), "...ath.csv");
    }
}
