use crate::models::BuildConfig;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat, Source};
use std::fs;

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "qtbuild.yaml";

/// Prefix of environment variables overriding the file (`QTBUILD_LANGUAGES=cs,de`)
pub const ENV_PREFIX: &str = "QTBUILD";

/// Loads and saves the build configuration.
///
/// Sources are layered, later ones winning:
/// 1. built-in defaults ([`BuildConfig::default`])
/// 2. the YAML configuration file, if it exists
/// 3. `QTBUILD_*` environment variables
///
/// Command line options are applied on top by the caller.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager for the given configuration file.
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            env_prefix: Some(ENV_PREFIX.to_string()),
        }
    }

    /// Read environment variables with `prefix` instead of `QTBUILD`
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Ignore the environment, only the file counts
    pub fn without_environment(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Load the layered configuration.
    ///
    /// # Returns
    /// The merged BuildConfig; defaults if neither file nor environment set anything
    pub fn load(&self) -> Result<BuildConfig> {
        if self.config_path.exists() {
            tracing::info!("Loading config from {}", self.config_path);
        } else {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let file_values = File::from(self.config_path.as_std_path())
            .format(FileFormat::Yaml)
            .required(false)
            .collect()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        // Both layers are keyed by the kebab-case option name so an
        // environment value replaces the file value instead of clashing with it
        let mut builder = Config::builder();
        for (key, value) in file_values {
            builder = builder
                .set_default(option_key(&key), value)
                .with_context(|| format!("Invalid option \"{}\" in {}", key, self.config_path))?;
        }

        if let Some(prefix) = &self.env_prefix {
            let env_values = Environment::with_prefix(prefix)
                .collect()
                .context("Failed to read environment variables")?;
            for (key, value) in env_values {
                builder = builder
                    .set_override(option_key(&key), value)
                    .with_context(|| format!("Invalid environment option \"{}_{}\"", prefix, key))?;
            }
        }

        let layered = builder
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: BuildConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::debug!("Resolved config: {:?}", config);
        Ok(config)
    }

    /// Save the configuration file.
    ///
    /// # Arguments
    /// * `config` - The BuildConfig to save
    pub fn save(&self, config: &BuildConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent()
            && !parent.as_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent))?;
        }

        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Write a configuration file holding the defaults.
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn write_default(&self, force: bool) -> Result<()> {
        if self.config_path.exists() && !force {
            bail!(
                "Config file {} already exists (use --force to overwrite)",
                self.config_path
            );
        }

        self.save(&BuildConfig::default())
    }
}

/// Kebab-case spelling of a file or environment key (`languages_dir` -> `languages-dir`)
fn option_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}
