//! qtbuild - Compile Qt resource files, UI files and translations
//!
//! Main entry point for the command line tool.
//!
//! # Execution Flow
//!
//! 1. Parse the command line
//! 2. Initialize logging (stderr, plus rotating files with `--log-dir`)
//! 3. Load `qtbuild.yaml` layered with `QTBUILD_*` variables and command line overrides
//! 4. Validate into [`BuildSettings`]
//! 5. Run the build on a single-threaded tokio runtime, one tool at a time
//! 6. Exit with 0 when every tool succeeded, 1 when any failed, 2 on fatal errors
//!
//! # Configuration Files
//!
//! `qtbuild.yaml` in the working directory (or `--config <FILE>`):
//!
//! ```yaml
//! packages: [myapp]
//! languages: cs, de
//! replacement-bindings: qtpy
//! ```

use anyhow::Result;
use clap::Parser;
use qtbuild::cli::{BuildArgs, Cli, Command};
use qtbuild::{APP_NAME, BuildConfig, BuildService, BuildSettings, ConfigManager, VERSION};
use std::process::ExitCode;

/// Exit code for configuration errors and aborted runs
const FATAL_EXIT_CODE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match qtbuild::logging::setup_logging(cli.verbose, cli.log_dir.as_deref(), APP_NAME)
    {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(FATAL_EXIT_CODE);
        }
    };

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(FATAL_EXIT_CODE)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    tracing::debug!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&cli.config);

    match cli.resolved_command() {
        Command::Init { force } => {
            config_manager.write_default(force)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::ShowConfig => {
            let config = load_config(&config_manager, &cli.build)?;
            BuildSettings::from_config(&config)?;
            print!("{}", serde_yaml_ng::to_string(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Build => {
            let config = load_config(&config_manager, &cli.build)?;
            build(&config)
        }
    }
}

fn load_config(config_manager: &ConfigManager, args: &BuildArgs) -> Result<BuildConfig> {
    let mut config = config_manager.load()?;
    args.apply(&mut config);
    Ok(config)
}

fn build(config: &BuildConfig) -> Result<ExitCode> {
    let settings = BuildSettings::from_config(config)?;
    if settings.packages().is_empty() {
        tracing::warn!("No packages configured, nothing to build");
        return Ok(ExitCode::SUCCESS);
    }

    // Tools run strictly one after another; a single thread is all it takes
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let service = BuildService::new(settings)?;
    let report = runtime.block_on(service.run())?;

    for failure in report.failures() {
        tracing::error!("{} failed for {}: {:?}", failure.tool, failure.target, failure.status);
    }

    Ok(ExitCode::from(report.exit_code() as u8))
}
