//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create a `.taskmage/` project |
//! | `open` | Print an Mtask file as TaskList |
//! | `save` | Merge TaskList text into an Mtask file |
//! | `edit` | Round-trip an Mtask file through `$EDITOR` |
//! | `archive` | Move complete task chains into `.taskmage/` |
//! | `check` | Validate a file in either format |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output; `RUST_LOG` controls the
//! library's tracing events:
//! ```bash
//! taskmage --verbose save todo.mtask < todo.tasklist
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod document_cmd;
mod editor;
mod output;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
