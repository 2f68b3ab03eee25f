#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_dir;
pub mod config;
pub mod error;
pub mod migrator;
pub mod models;
pub mod patch;
pub mod project;
mod scan;

pub use asset_dir::AssetDirResolution;
pub use config::MigrationConfig;
pub use error::MigrateError;
pub use migrator::SiteMigrator;
pub use models::{MigrationReport, Step, StepReport, StepStatus};
pub use project::SiteLayout;
