//! Metadata catalog — the immutable table of DhrLang constructs.
//!
//! The table is declared in `constructs.yaml`, embedded at compile time and
//! parsed once on first use. Completion and hover both read from the same
//! process-wide instance; nothing mutates it after load.

pub mod template;

use std::collections::HashMap;
use std::sync::LazyLock;

use lsp_types::CompletionItemKind;
use serde::Deserialize;
use thiserror::Error;

pub use template::{Segment, Slot, Template, TemplateError};

const CONSTRUCTS_YAML: &str = include_str!("constructs.yaml");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_yaml(CONSTRUCTS_YAML)
        .unwrap_or_else(|e| panic!("built-in construct catalog is malformed: {e}"))
});

/// The built-in DhrLang catalog.
pub fn builtin() -> &'static Catalog {
    &BUILTIN
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate catalog label: '{0}'")]
    DuplicateLabel(String),
}

/// Which family of language construct an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Type,
    ControlKeyword,
    OopKeyword,
    BuiltinFunction,
    EntryPoint,
}

impl Category {
    /// Display order used by the help guide.
    pub const ALL: [Category; 5] = [
        Category::EntryPoint,
        Category::BuiltinFunction,
        Category::ControlKeyword,
        Category::Type,
        Category::OopKeyword,
    ];

    pub fn completion_kind(self) -> CompletionItemKind {
        match self {
            Category::Type => CompletionItemKind::TYPE_PARAMETER,
            Category::ControlKeyword | Category::OopKeyword => CompletionItemKind::KEYWORD,
            Category::BuiltinFunction | Category::EntryPoint => CompletionItemKind::FUNCTION,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Type => "Data Types - डेटा प्रकार",
            Category::ControlKeyword => "Control Flow - नियंत्रण",
            Category::OopKeyword => "OOP Keywords - OOP शब्द",
            Category::BuiltinFunction => "Built-in Functions - अंतर्निहित फ़ंक्शन",
            Category::EntryPoint => "Entry Point - प्रवेश बिंदु",
        }
    }
}

/// Per-entry icon override, for the few constructs whose editor icon differs
/// from the category default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum KindOverride {
    Class,
    Function,
    Keyword,
    TypeParameter,
}

impl From<KindOverride> for CompletionItemKind {
    fn from(kind: KindOverride) -> Self {
        match kind {
            KindOverride::Class => CompletionItemKind::CLASS,
            KindOverride::Function => CompletionItemKind::FUNCTION,
            KindOverride::Keyword => CompletionItemKind::KEYWORD,
            KindOverride::TypeParameter => CompletionItemKind::TYPE_PARAMETER,
        }
    }
}

/// One recognized construct.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub label: String,
    pub category: Category,
    #[serde(default)]
    kind: Option<KindOverride>,
    /// One-line summary shown next to a completion.
    pub detail: String,
    /// Bilingual explanation shown on hover.
    pub description: String,
    #[serde(deserialize_with = "deserialize_template")]
    pub template: Template,
}

impl CatalogEntry {
    pub fn completion_kind(&self) -> CompletionItemKind {
        self.kind
            .map(CompletionItemKind::from)
            .unwrap_or_else(|| self.category.completion_kind())
    }
}

fn deserialize_template<'de, D>(deserializer: D) -> Result<Template, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Template::try_from(raw).map_err(serde::de::Error::custom)
}

/// Immutable construct table with exact-label lookup.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_label: HashMap<String, usize>,
}

impl Catalog {
    /// Parse a catalog from its YAML declaration. Declaration order is kept.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_yaml::from_str(source)?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut by_label = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if by_label.insert(entry.label.clone(), i).is_some() {
                return Err(CatalogError::DuplicateLabel(entry.label.clone()));
            }
        }
        Ok(Self { entries, by_label })
    }

    /// Exact, case-sensitive match on the full label (spaces included).
    pub fn lookup(&self, label: &str) -> Option<&CatalogEntry> {
        self.by_label.get(label).map(|&i| &self.entries[i])
    }

    /// Every entry in declaration order.
    pub fn all(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }
}
