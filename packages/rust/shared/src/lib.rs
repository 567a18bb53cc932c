//! Shared types, error model, and configuration for the eduscol harvester.
//!
//! This crate is the foundation depended on by all other eduscol crates.
//! It provides:
//! - [`EduscolError`]: the unified error type
//! - Domain types ([`Discipline`], [`ProgramCandidate`], [`DocumentLink`], [`TaxonomyRecord`])
//! - Configuration ([`AppConfig`], [`HarvestConfig`], [`OrganizeConfig`], config loading)
//! - Name normalization ([`sanitize_filename`], [`document_filename`], [`slugify`])

pub mod config;
pub mod error;
pub mod progress;
pub mod text;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlSection, HarvestConfig, OrganizeConfig, OrganizeSection, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{EduscolError, Result};
pub use progress::{ProgressReporter, SilentProgress};
pub use text::{MAX_FILENAME_LEN, document_filename, sanitize_filename, slugify};
pub use types::{Discipline, DocumentLink, Niveau, ProgramCandidate, TaxonomyRecord};
