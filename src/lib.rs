//! Workforce utilisation table: loads the people dataset, projects each
//! active person into a flat display row for a reference date, and renders
//! or exports the result.
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod projector;
pub mod telemetry;
pub mod types;
pub mod util;

pub use projector::{project, project_with_stats, ProjectionStats, HOURS_PER_MONTH};
pub use types::{DisplayRow, SourceRecord, TablePayload, COLUMNS};
