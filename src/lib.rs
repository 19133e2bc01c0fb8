// qtbuild - Compile Qt resource files, UI files and translations
//
// This is the library crate containing the build pipeline and its configuration.
// The binary crate (main.rs) provides the command line entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{BuildConfig, BuildReport, BuildSettings};
pub use services::BuildService;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
