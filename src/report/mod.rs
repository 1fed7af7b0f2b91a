//! Report module - summarizing cleaning and model results

pub mod analysis_report;
pub mod model_summary;
pub mod summary;

pub use analysis_report::*;
pub use model_summary::*;
pub use summary::*;
