//! # Storage Layer
//!
//! Projects, configuration and Mtask files on disk.
//!
//! ## Project Structure
//!
//! ```text
//! project/
//! ├── chores.mtask          # Active documents, anywhere below the root
//! ├── garden/plans.mtask
//! └── .taskmage/
//!     ├── config.toml       # Project configuration
//!     ├── .gitignore
//!     ├── chores.mtask      # Archive counterparts, same relative paths
//!     └── garden/plans.mtask
//! ```
//!
//! ## Concurrency Safety
//!
//! [`MtaskStore`] locks files with `fs2` and writes through a temp file and
//! a rename.

mod config;
mod mtask;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, PROJECT_DIR};
pub use mtask::MtaskStore;
pub use project::{Project, ProjectError};
