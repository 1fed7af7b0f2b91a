//! Dataset loader for CSV and Parquet files

use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use super::error::{PipelineError, PipelineResult};
use crate::utils::with_spinner;

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Parquet,
}

impl InputFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "parquet" => Ok(InputFormat::Parquet),
            _ => Err(PipelineError::data_access(
                path,
                format!(
                    "Unsupported file format: '{}'. Supported formats: csv, parquet",
                    extension
                ),
            )),
        }
    }
}

/// Build a lazy scan over the input file.
///
/// `infer_schema_length` of 0 means a full table scan for CSV type inference.
fn scan_dataset(path: &Path, infer_schema_length: usize) -> PipelineResult<LazyFrame> {
    let format = InputFormat::from_path(path)?;

    if !path.is_file() {
        return Err(PipelineError::data_access(path, "file not found"));
    }

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match format {
        InputFormat::Csv => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(schema_length)
            .finish(),
        InputFormat::Parquet => LazyFrame::scan_parquet(path, Default::default()),
    };

    lf.map_err(|e| PipelineError::data_access(path, e))
}

/// Load a dataset fully into memory.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> PipelineResult<DataFrame> {
    let df = scan_dataset(path, infer_schema_length)?
        .collect()
        .map_err(|e| PipelineError::data_access(path, e))?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "dataset loaded"
    );

    Ok(df)
}

/// Load a dataset with a spinner, returning the frame with its shape and
/// estimated memory footprint in MB.
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> PipelineResult<(DataFrame, usize, usize, f64)> {
    let df = with_spinner(
        &format!("Loading {}...", path.display()),
        || load_dataset(path, infer_schema_length),
        |df| format!("Loaded {} rows", df.height()),
    )?;

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    Ok((df, rows, cols, memory_mb))
}

/// Read only the column names of a dataset (cheap schema resolution).
pub fn get_column_names(path: &Path) -> PipelineResult<Vec<String>> {
    let mut lf = scan_dataset(path, 100)?;
    let schema = lf
        .collect_schema()
        .map_err(|e| PipelineError::data_access(path, e))?;

    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Save a table to CSV or Parquet, based on the output extension.
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> PipelineResult<()> {
    let format = InputFormat::from_path(path)?;
    let file = std::fs::File::create(path).map_err(|e| PipelineError::data_access(path, e))?;

    match format {
        InputFormat::Csv => {
            let mut file = file;
            CsvWriter::new(&mut file).finish(df)?;
        }
        InputFormat::Parquet => {
            ParquetWriter::new(file).finish(df)?;
        }
    }

    debug!(path = %path.display(), rows = df.height(), "dataset saved");
    Ok(())
}
