//! capstat: NHL salary analysis
//!
//! A library for cleaning a season table of player statistics, describing
//! the distributions of key fields, and fitting linear and tree models of
//! salary.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
