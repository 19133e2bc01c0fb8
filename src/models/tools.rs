use camino::Utf8PathBuf;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The four external Qt tools the build drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Compiles `.qrc` resource definitions (`pyrcc5`)
    ResourceCompiler,
    /// Compiles `.ui` form definitions (`pyuic5`)
    UiCompiler,
    /// Extracts strings into `.ts` catalogs (`pylupdate5`)
    TranslationUpdater,
    /// Compiles `.ts` catalogs to `.qm` (`lrelease`)
    TranslationReleaser,
}

impl ToolKind {
    /// Configuration option naming this tool
    pub fn option_name(self) -> &'static str {
        match self {
            Self::ResourceCompiler => "pyrcc",
            Self::UiCompiler => "pyuic",
            Self::TranslationUpdater => "pylupdate",
            Self::TranslationReleaser => "lrelease",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// Qt bindings for Python.
///
/// Known bindings provide preset tool names; anything else (Qt.py, QtPy, ...)
/// is kept by name and falls back to the PyQt5 presets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Binding {
    PyQt4,
    #[default]
    PyQt5,
    PyQt6,
    PySide,
    PySide2,
    PySide6,
    Other(String),
}

impl Binding {
    pub fn parse(name: &str) -> Self {
        match name {
            "PyQt4" => Self::PyQt4,
            "PyQt5" => Self::PyQt5,
            "PyQt6" => Self::PyQt6,
            "PySide" => Self::PySide,
            "PySide2" => Self::PySide2,
            "PySide6" => Self::PySide6,
            other => Self::Other(other.to_string()),
        }
    }

    /// Module name used in `from <name> import` statements
    pub fn module_name(&self) -> &str {
        match self {
            Self::PyQt4 => "PyQt4",
            Self::PyQt5 => "PyQt5",
            Self::PyQt6 => "PyQt6",
            Self::PySide => "PySide",
            Self::PySide2 => "PySide2",
            Self::PySide6 => "PySide6",
            Self::Other(name) => name,
        }
    }

    /// Default executable for a tool when the configuration doesn't name one
    pub fn preset(&self, kind: ToolKind) -> &'static str {
        use ToolKind::*;

        match (self, kind) {
            (Self::PyQt4, ResourceCompiler) => "pyrcc4",
            (Self::PyQt4, UiCompiler) => "pyuic4",
            (Self::PyQt4, TranslationUpdater) => "pylupdate4",
            // PyQt6 dropped pyrcc; the resource compiler of Qt itself is used
            (Self::PyQt6, ResourceCompiler) => "rcc",
            (Self::PyQt6, UiCompiler) => "pyuic6",
            (Self::PyQt6, TranslationUpdater) => "pylupdate6",
            (Self::PySide, ResourceCompiler) => "pyside-rcc",
            (Self::PySide, UiCompiler) => "pyside-uic",
            (Self::PySide, TranslationUpdater) => "pyside-lupdate",
            (Self::PySide2, ResourceCompiler) => "pyside2-rcc",
            (Self::PySide2, UiCompiler) => "pyside2-uic",
            (Self::PySide2, TranslationUpdater) => "pyside2-lupdate",
            (Self::PySide6, ResourceCompiler) => "pyside6-rcc",
            (Self::PySide6, UiCompiler) => "pyside6-uic",
            (Self::PySide6, TranslationUpdater) => "pyside6-lupdate",
            (Self::PySide6, TranslationReleaser) => "pyside6-lrelease",
            (_, ResourceCompiler) => "pyrcc5",
            (_, UiCompiler) => "pyuic5",
            (_, TranslationUpdater) => "pylupdate5",
            (_, TranslationReleaser) => "lrelease",
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

/// How a tool is selected in the configuration.
///
/// Serialized as a plain string: absent means [`ToolSpec::Preset`], the empty
/// string means [`ToolSpec::Disabled`], anything else is a program name or path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ToolSpec {
    #[default]
    Preset,
    Disabled,
    Program(Utf8PathBuf),
}

impl ToolSpec {
    pub fn from_option(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            Self::Disabled
        } else {
            Self::Program(Utf8PathBuf::from(value))
        }
    }

    pub fn is_preset(&self) -> bool {
        matches!(self, Self::Preset)
    }

    /// Resolve to a runnable tool, `None` when the phase is switched off
    pub fn resolve(&self, kind: ToolKind, binding: &Binding) -> Option<Tool> {
        match self {
            Self::Disabled => None,
            Self::Preset => Some(Tool {
                kind,
                program: Utf8PathBuf::from(binding.preset(kind)),
            }),
            Self::Program(program) => Some(Tool {
                kind,
                program: program.clone(),
            }),
        }
    }
}

impl Serialize for ToolSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Preset => serializer.serialize_none(),
            Self::Disabled => serializer.serialize_str(""),
            Self::Program(program) => serializer.serialize_str(program.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for ToolSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(match value {
            None => Self::Preset,
            Some(value) => Self::from_option(&value),
        })
    }
}

/// A resolved external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub kind: ToolKind,
    pub program: Utf8PathBuf,
}
