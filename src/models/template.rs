//! Output file name templates.
//!
//! Templates use the same placeholder syntax as Python's `str.format`: `{name}`
//! is replaced by a value and `{{` / `}}` produce literal braces. Which
//! placeholders a template may (and must) contain depends on its
//! [`TemplateKind`].

use std::fmt;
use thiserror::Error;

/// A value that can be substituted into a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Stem of the source file (`forms/main.ui` → `main`)
    Name,
    /// Package directory name
    Package,
    /// Translation language code
    Lang,
}

impl Placeholder {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "package" => Some(Self::Package),
            "lang" => Some(Self::Lang),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Package => "package",
            Self::Lang => "lang",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.key())
    }
}

/// What a template names, which fixes its placeholder set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Python module compiled from a `.qrc` or `.ui` file: `{name}`
    Module,
    /// Translation catalog: `{package}` and `{lang}`
    Catalog,
}

impl TemplateKind {
    fn placeholders(self) -> &'static [Placeholder] {
        match self {
            Self::Module => &[Placeholder::Name],
            Self::Catalog => &[Placeholder::Package, Placeholder::Lang],
        }
    }
}

/// Errors raised while parsing a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unbalanced '{brace}' at position {position} in \"{template}\"")]
    UnbalancedBrace {
        template: String,
        brace: char,
        position: usize,
    },

    #[error("unknown placeholder {{{placeholder}}} in \"{template}\"")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("template \"{template}\" must contain {placeholder}")]
    MissingPlaceholder {
        template: String,
        placeholder: Placeholder,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value(Placeholder),
}

/// A parsed and validated file name template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    kind: TemplateKind,
    source: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// Parse `source` and check it against the placeholders of `kind`.
    ///
    /// Every placeholder of the kind must appear at least once and no other
    /// placeholder may appear.
    pub fn new(kind: TemplateKind, source: &str) -> Result<Self, TemplateError> {
        let segments = parse_segments(source)?;

        for segment in &segments {
            if let Segment::Value(placeholder) = segment
                && !kind.placeholders().contains(placeholder)
            {
                return Err(TemplateError::UnknownPlaceholder {
                    template: source.to_string(),
                    placeholder: placeholder.key().to_string(),
                });
            }
        }

        for required in kind.placeholders() {
            if !segments.contains(&Segment::Value(*required)) {
                return Err(TemplateError::MissingPlaceholder {
                    template: source.to_string(),
                    placeholder: *required,
                });
            }
        }

        Ok(Self {
            kind,
            source: source.to_string(),
            segments,
        })
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// The template as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render a module template for a source file stem
    pub fn render_module(&self, name: &str) -> String {
        self.render(|placeholder| match placeholder {
            Placeholder::Name => name,
            Placeholder::Package | Placeholder::Lang => "",
        })
    }

    /// Render a catalog template for a package and language
    pub fn render_catalog(&self, package: &str, lang: &str) -> String {
        self.render(|placeholder| match placeholder {
            Placeholder::Package => package,
            Placeholder::Lang => lang,
            Placeholder::Name => "",
        })
    }

    fn render<'a>(&self, value: impl Fn(Placeholder) -> &'a str) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value(placeholder) => out.push_str(value(*placeholder)),
            }
        }
        out
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    if next == '{' {
                        break;
                    }
                    key.push(next);
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace {
                        template: source.to_string(),
                        brace: '{',
                        position,
                    });
                }
                let placeholder =
                    Placeholder::from_key(&key).ok_or_else(|| TemplateError::UnknownPlaceholder {
                        template: source.to_string(),
                        placeholder: key.clone(),
                    })?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Value(placeholder));
            }
            '}' => {
                return Err(TemplateError::UnbalancedBrace {
                    template: source.to_string(),
                    brace: '}',
                    position,
                });
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}
