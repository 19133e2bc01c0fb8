use crate::models::template::{NameTemplate, TemplateError, TemplateKind};
use crate::models::tools::{Binding, Tool, ToolKind, ToolSpec};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Build configuration as read from `qtbuild.yaml`, the environment and the
/// command line.
///
/// Every option is optional. List options accept either a YAML sequence or a
/// comma separated string (`packages: "app, plugins"`). Keys are kebab-case;
/// [`ConfigManager`](crate::ConfigManager) maps `languages_dir` style keys
/// from files and the environment onto them before deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Packages in which to recursively find .qrc, .ui and .ts files
    #[serde(deserialize_with = "string_list")]
    pub packages: Vec<String>,

    /// Translation languages (could be empty)
    #[serde(deserialize_with = "string_list")]
    pub languages: Vec<String>,

    /// Directory with translation files, relative to each package
    pub languages_dir: String,

    /// Qt binding used in generated imports and for preset tool names
    pub bindings: String,

    /// Replacement for `bindings` in generated imports (Qt.py, QtPy, ...)
    pub replacement_bindings: String,

    #[serde(skip_serializing_if = "ToolSpec::is_preset")]
    pub pyrcc: ToolSpec,

    #[serde(skip_serializing_if = "ToolSpec::is_preset")]
    pub pyuic: ToolSpec,

    #[serde(skip_serializing_if = "ToolSpec::is_preset")]
    pub pylupdate: ToolSpec,

    #[serde(skip_serializing_if = "ToolSpec::is_preset")]
    pub lrelease: ToolSpec,

    /// Name template for .py files compiled from .qrc files
    pub filename_qrc: String,

    /// Name template for .py files compiled from .ui files
    pub filename_ui: String,

    /// Name template for newly created .ts files
    pub filename_ts: String,

    /// Seconds after which an external tool is killed (no limit when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_timeout: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            languages: Vec::new(),
            languages_dir: "languages".to_string(),
            bindings: "PyQt5".to_string(),
            replacement_bindings: String::new(),
            pyrcc: ToolSpec::Preset,
            pyuic: ToolSpec::Preset,
            pylupdate: ToolSpec::Preset,
            lrelease: ToolSpec::Preset,
            filename_qrc: "qrc_{name}.py".to_string(),
            filename_ui: "ui_{name}.py".to_string(),
            filename_ts: "{package}_{lang}.ts".to_string(),
            tool_timeout: None,
        }
    }
}

/// Split a comma separated option into trimmed, non-empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringList {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Option::<StringList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringList::Csv(value)) => split_list(&value),
        Some(StringList::List(items)) => items
            .iter()
            .flat_map(|item| split_list(item))
            .collect(),
    })
}

/// Errors found while validating a [`BuildConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {option} template: {source}")]
    InvalidTemplate {
        option: &'static str,
        #[source]
        source: TemplateError,
    },

    #[error("invalid language code \"{0}\"")]
    InvalidLanguage(String),
}

/// Validated, immutable build settings.
///
/// Built once per run from a [`BuildConfig`]; templates are parsed, tools
/// resolved and lists normalized here so the build itself never sees a
/// malformed option.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    packages: Vec<Utf8PathBuf>,
    languages: Vec<String>,
    languages_dir: Utf8PathBuf,
    binding: Option<Binding>,
    replacement_binding: Option<String>,
    resource_compiler: Option<Tool>,
    ui_compiler: Option<Tool>,
    translation_updater: Option<Tool>,
    translation_releaser: Option<Tool>,
    qrc_template: NameTemplate,
    ui_template: NameTemplate,
    ts_template: NameTemplate,
    tool_timeout: Option<Duration>,
}

impl BuildSettings {
    pub fn from_config(config: &BuildConfig) -> Result<Self, ConfigError> {
        let packages: IndexSet<Utf8PathBuf> = config
            .packages
            .iter()
            .map(|package| Utf8PathBuf::from(package.trim()))
            .filter(|package| !package.as_str().is_empty())
            .collect();
        if packages.len() < config.packages.len() {
            tracing::debug!("Ignoring duplicate or empty package entries");
        }

        let languages: IndexSet<String> = config
            .languages
            .iter()
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .collect();
        if let Some(bad) = languages
            .iter()
            .find(|lang| lang.contains(['/', '\\']))
        {
            return Err(ConfigError::InvalidLanguage(bad.clone()));
        }

        let bindings = config.bindings.trim();
        let binding = (!bindings.is_empty()).then(|| Binding::parse(bindings));
        let preset_binding = binding.clone().unwrap_or_default();

        let replacement = config.replacement_bindings.trim();
        let replacement_binding = (!replacement.is_empty()).then(|| replacement.to_string());

        Ok(Self {
            packages: packages.into_iter().collect(),
            languages: languages.into_iter().collect(),
            languages_dir: Utf8PathBuf::from(config.languages_dir.trim()),
            resource_compiler: config
                .pyrcc
                .resolve(ToolKind::ResourceCompiler, &preset_binding),
            ui_compiler: config.pyuic.resolve(ToolKind::UiCompiler, &preset_binding),
            translation_updater: config
                .pylupdate
                .resolve(ToolKind::TranslationUpdater, &preset_binding),
            translation_releaser: config
                .lrelease
                .resolve(ToolKind::TranslationReleaser, &preset_binding),
            binding,
            replacement_binding,
            qrc_template: template("filename-qrc", TemplateKind::Module, &config.filename_qrc)?,
            ui_template: template("filename-ui", TemplateKind::Module, &config.filename_ui)?,
            ts_template: template("filename-ts", TemplateKind::Catalog, &config.filename_ts)?,
            tool_timeout: config.tool_timeout.map(Duration::from_secs),
        })
    }

    pub fn packages(&self) -> &[Utf8PathBuf] {
        &self.packages
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn languages_dir(&self) -> &Utf8Path {
        &self.languages_dir
    }

    /// Binding named in generated imports, `None` when unset
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    pub fn replacement_binding(&self) -> Option<&str> {
        self.replacement_binding.as_deref()
    }

    /// The tool for a phase, `None` when that phase is disabled
    pub fn tool(&self, kind: ToolKind) -> Option<&Tool> {
        match kind {
            ToolKind::ResourceCompiler => self.resource_compiler.as_ref(),
            ToolKind::UiCompiler => self.ui_compiler.as_ref(),
            ToolKind::TranslationUpdater => self.translation_updater.as_ref(),
            ToolKind::TranslationReleaser => self.translation_releaser.as_ref(),
        }
    }

    pub fn qrc_template(&self) -> &NameTemplate {
        &self.qrc_template
    }

    pub fn ui_template(&self) -> &NameTemplate {
        &self.ui_template
    }

    pub fn ts_template(&self) -> &NameTemplate {
        &self.ts_template
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout
    }
}

fn template(
    option: &'static str,
    kind: TemplateKind,
    source: &str,
) -> Result<NameTemplate, ConfigError> {
    NameTemplate::new(kind, source).map_err(|source| ConfigError::InvalidTemplate { option, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let config = BuildConfig::default();
        assert!(config.packages.is_empty());
        assert!(config.languages.is_empty());
        assert_eq!(config.languages_dir, "languages");
        assert_eq!(config.bindings, "PyQt5");
        assert_eq!(config.replacement_bindings, "");
        assert_eq!(config.filename_qrc, "qrc_{name}.py");
        assert_eq!(config.filename_ui, "ui_{name}.py");
        assert_eq!(config.filename_ts, "{package}_{lang}.ts");
    }

    #[test]
    fn test_default_settings_resolve_pyqt5_tools() {
        let settings = BuildSettings::from_config(&BuildConfig::default()).unwrap();

        assert_eq!(
            settings.tool(ToolKind::ResourceCompiler).unwrap().program,
            "pyrcc5"
        );
        assert_eq!(settings.tool(ToolKind::UiCompiler).unwrap().program, "pyuic5");
        assert_eq!(
            settings.tool(ToolKind::TranslationUpdater).unwrap().program,
            "pylupdate5"
        );
        assert_eq!(
            settings.tool(ToolKind::TranslationReleaser).unwrap().program,
            "lrelease"
        );
        assert_eq!(settings.binding(), Some(&Binding::PyQt5));
        assert_eq!(settings.replacement_binding(), None);
        assert_eq!(settings.tool_timeout(), None);
    }

    #[test]
    fn test_yaml_comma_separated_lists() {
        let yaml = "packages: \"app, plugins ,\"\nlanguages: cs,de\n";
        let config: BuildConfig = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.packages, vec!["app", "plugins"]);
        assert_eq!(config.languages, vec!["cs", "de"]);
        assert_eq!(config.languages_dir, "languages");
    }

    #[test]
    fn test_yaml_sequence_lists() {
        let yaml = "packages:\n  - app\n  - tools\nlanguages: [en_US]\n";
        let config: BuildConfig = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.packages, vec!["app", "tools"]);
        assert_eq!(config.languages, vec!["en_US"]);
    }

    #[test]
    fn test_yaml_empty_tool_disables_phase() {
        let yaml = "pyrcc: ''\npyuic: /usr/lib/qt6/bin/uic\n";
        let config: BuildConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let settings = BuildSettings::from_config(&config).unwrap();

        assert!(settings.tool(ToolKind::ResourceCompiler).is_none());
        assert_eq!(
            settings.tool(ToolKind::UiCompiler).unwrap().program,
            "/usr/lib/qt6/bin/uic"
        );
    }

    #[test]
    fn test_binding_selects_presets() {
        let config = BuildConfig {
            bindings: "PySide6".to_string(),
            ..BuildConfig::default()
        };
        let settings = BuildSettings::from_config(&config).unwrap();

        assert_eq!(
            settings.tool(ToolKind::UiCompiler).unwrap().program,
            "pyside6-uic"
        );
    }

    #[test]
    fn test_empty_binding_keeps_default_presets() {
        let config = BuildConfig {
            bindings: String::new(),
            replacement_bindings: "qtpy".to_string(),
            ..BuildConfig::default()
        };
        let settings = BuildSettings::from_config(&config).unwrap();

        assert_eq!(settings.binding(), None);
        assert_eq!(settings.replacement_binding(), Some("qtpy"));
        assert_eq!(
            settings.tool(ToolKind::ResourceCompiler).unwrap().program,
            "pyrcc5"
        );
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        let config = BuildConfig {
            packages: vec!["b".into(), "a".into(), "b".into()],
            languages: vec!["de".into(), "cs".into(), "de".into()],
            ..BuildConfig::default()
        };
        let settings = BuildSettings::from_config(&config).unwrap();

        assert_eq!(settings.packages(), &[Utf8PathBuf::from("b"), Utf8PathBuf::from("a")]);
        assert_eq!(settings.languages(), &["de".to_string(), "cs".to_string()]);
    }

    #[test]
    fn test_invalid_template_rejected() {
        let config = BuildConfig {
            filename_ts: "{lang}.ts".to_string(),
            ..BuildConfig::default()
        };
        let err = BuildSettings::from_config(&config).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidTemplate {
                option: "filename-ts",
                ..
            }
        ));
        assert!(err.to_string().contains("{package}"));
    }

    #[test]
    fn test_language_with_separator_rejected() {
        let config = BuildConfig {
            languages: vec!["../cs".to_string()],
            ..BuildConfig::default()
        };
        assert!(matches!(
            BuildSettings::from_config(&config),
            Err(ConfigError::InvalidLanguage(lang)) if lang == "../cs"
        ));
    }

    #[test]
    fn test_tool_timeout_converted() {
        let config = BuildConfig {
            tool_timeout: Some(90),
            ..BuildConfig::default()
        };
        let settings = BuildSettings::from_config(&config).unwrap();
        assert_eq!(settings.tool_timeout(), Some(Duration::from_secs(90)));
    }
}
