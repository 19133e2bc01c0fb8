//! Data models for qtbuild.
//!
//! - [`BuildConfig`]: options as read from `qtbuild.yaml`, the environment and the command line
//! - [`BuildSettings`]: the validated, immutable form of a [`BuildConfig`] used by a run
//! - [`NameTemplate`]: output file name templates (`qrc_{name}.py`, `{package}_{lang}.ts`)
//! - [`Binding`], [`ToolSpec`], [`Tool`]: which Qt tools run and under what name
//! - [`BuildReport`]: outcome of every tool invocation of a run

pub mod config;
pub mod report;
pub mod template;
pub mod tools;

pub use config::{BuildConfig, BuildSettings, ConfigError};
pub use report::{BuildReport, InvocationOutcome, InvocationStatus, PackageReport};
pub use template::{NameTemplate, Placeholder, TemplateError, TemplateKind};
pub use tools::{Binding, Tool, ToolKind, ToolSpec};
