//! Pipeline module - load, clean, describe, and model

pub mod cleaner;
pub mod describe;
pub mod error;
pub mod loader;
pub mod model;
pub mod plan;
pub mod schema;
pub mod teams;

pub use cleaner::{
    clean_dataset, CleanedPlayer, CleanedTable, CleanerConfig, CleaningStats, RawPlayer,
    RecordOutcome, ZeroGamesPolicy,
};
pub use describe::{describe_field, DescribeField, Distribution, PlotKind};
pub use error::{PipelineError, PipelineResult};
pub use loader::*;
pub use model::{fit_model, FittedModel, ModelFamily, ModelSpec, TreeConfig};
pub use plan::{standard_plan, DEFAULT_FINE_MIN_SPLIT};
pub use teams::TeamMembership;
