//! Services module - the build pipeline.
//!
//! # Components
//!
//! - [`BuildService`]: Runs the four phases (resources, UI forms, translation
//!   update, translation release) for every configured package and collects a
//!   [`BuildReport`](crate::models::BuildReport).
//! - [`find_files`]: Recursive, sorted discovery of `.qrc`, `.ui`, `.py` and `.ts` files.
//! - [`ToolRunner`] / [`ProcessRunner`]: The subprocess seam. `ProcessRunner`
//!   spawns the real Qt tools; tests plug in runners that only record.
//! - [`BindingRewriter`]: Rewrites `from PyQt5 import` lines in generated UI
//!   modules for wrappers such as Qt.py or QtPy.
//!
//! # Failure policy
//!
//! A tool exiting non-zero is logged and recorded, and the build moves on to
//! the next file. A missing package directory stops the run before any tool is
//! started; filesystem errors stop it where they happen.
//!
//! # Usage Example
//!
//! ```ignore
//! use qtbuild::models::{BuildConfig, BuildSettings};
//! use qtbuild::services::BuildService;
//!
//! let config = BuildConfig {
//!     packages: vec!["myapp".into()],
//!     languages: vec!["cs".into(), "de".into()],
//!     ..BuildConfig::default()
//! };
//! let service = BuildService::new(BuildSettings::from_config(&config)?)?;
//! let report = service.run().await?;
//! std::process::exit(report.exit_code());
//! ```

pub mod bindings;
pub mod build;
pub mod discovery;
pub mod runner;

pub use bindings::{BindingRewriter, RewriteError};
pub use build::{BuildError, BuildService, compiled_path, package_name};
pub use discovery::find_files;
pub use runner::{Invocation, ProcessRunner, ToolError, ToolRunner};
