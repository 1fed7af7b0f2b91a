//! Interactive prompts using dialoguer

use std::path::Path;

use anyhow::Result;
use dialoguer::{Confirm, Select};

use crate::pipeline::DescribeField;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Ask before replacing an existing file. Missing files need no confirmation.
pub fn confirm_overwrite(path: &Path, no_confirm: bool) -> Result<bool> {
    if no_confirm || !path.exists() {
        return Ok(true);
    }
    confirm_step(&format!("{} already exists. Overwrite?", path.display()))
}

/// Pick one of the standard fields to describe
pub fn select_field() -> Result<DescribeField> {
    let labels: Vec<String> = DescribeField::ALL
        .iter()
        .map(|f| format!("{} ({})", f, f.column()))
        .collect();
    let index = Select::new()
        .with_prompt("Field to describe")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(DescribeField::ALL[index])
}
