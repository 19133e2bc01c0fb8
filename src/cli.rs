//! Command line interface.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::models::{BuildConfig, ToolSpec, config::split_list};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// qtbuild - compile Qt resource files, UI files and translations
#[derive(Debug, Clone, Parser)]
#[command(
    name = "qtbuild",
    version,
    about = "Compile Qt resource files, UI files and translations for Python Qt projects",
    long_about = None,
)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "QTBUILD_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: Utf8PathBuf,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write daily rotated log files to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Option overrides, accepted before or after the subcommand
    #[command(flatten)]
    pub build: BuildArgs,
}

impl Cli {
    /// The subcommand to run; `build` when none was given
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Build)
    }
}

/// Top-level CLI subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Compile resources, UI files and translations (default)
    Build,

    /// Write a configuration file with the default options
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the resolved configuration as YAML
    ShowConfig,
}

/// Overrides for configuration file options.
///
/// Every option mirrors a key of `qtbuild.yaml`; list options take comma
/// separated values and an empty tool name disables that tool. All of them are
/// global, so `qtbuild --packages app build` and `qtbuild build --packages app`
/// mean the same.
#[derive(Debug, Clone, Default, Args)]
pub struct BuildArgs {
    /// Comma separated packages in which to recursively find .qrc, .ui and .ts files
    #[arg(long, global = true)]
    pub packages: Option<String>,

    /// Comma separated translation languages (could be empty)
    #[arg(long, global = true)]
    pub languages: Option<String>,

    /// Directory with translation files (default is "languages")
    #[arg(long, global = true)]
    pub languages_dir: Option<String>,

    /// Qt binding from which to use pyrcc, pyuic and pylupdate commands (default is PyQt5)
    #[arg(long, global = true)]
    pub bindings: Option<String>,

    /// Qt bindings replacement (e.g. if using wrapper like Qt.py or QtPy)
    #[arg(long, global = true)]
    pub replacement_bindings: Option<String>,

    /// pyrcc command executable
    #[arg(long, global = true)]
    pub pyrcc: Option<String>,

    /// pyuic command executable
    #[arg(long, global = true)]
    pub pyuic: Option<String>,

    /// pylupdate command executable
    #[arg(long, global = true)]
    pub pylupdate: Option<String>,

    /// lrelease command executable
    #[arg(long, global = true)]
    pub lrelease: Option<String>,

    /// Name template for .py files compiled from .qrc files
    #[arg(long, global = true)]
    pub filename_qrc: Option<String>,

    /// Name template for .py files compiled from .ui files
    #[arg(long, global = true)]
    pub filename_ui: Option<String>,

    /// Name template for newly created .ts files
    #[arg(long, global = true)]
    pub filename_ts: Option<String>,

    /// Kill external tools running longer than this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub tool_timeout: Option<u64>,
}

impl BuildArgs {
    /// Apply the options given on the command line to `config`
    pub fn apply(&self, config: &mut BuildConfig) {
        if let Some(packages) = &self.packages {
            config.packages = split_list(packages);
        }
        if let Some(languages) = &self.languages {
            config.languages = split_list(languages);
        }
        if let Some(languages_dir) = &self.languages_dir {
            config.languages_dir = languages_dir.clone();
        }
        if let Some(bindings) = &self.bindings {
            config.bindings = bindings.clone();
        }
        if let Some(replacement) = &self.replacement_bindings {
            config.replacement_bindings = replacement.clone();
        }

        for (value, spec) in [
            (&self.pyrcc, &mut config.pyrcc),
            (&self.pyuic, &mut config.pyuic),
            (&self.pylupdate, &mut config.pylupdate),
            (&self.lrelease, &mut config.lrelease),
        ] {
            if let Some(value) = value {
                *spec = ToolSpec::from_option(value);
            }
        }

        if let Some(template) = &self.filename_qrc {
            config.filename_qrc = template.clone();
        }
        if let Some(template) = &self.filename_ui {
            config.filename_ui = template.clone();
        }
        if let Some(template) = &self.filename_ts {
            config.filename_ts = template.clone();
        }
        if let Some(seconds) = self.tool_timeout {
            config.tool_timeout = Some(seconds);
        }
    }
}
