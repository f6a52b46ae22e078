//! Completion engine — offers every catalog construct as a snippet.
//!
//! No filtering or ranking happens here. The host's fuzzy matcher narrows
//! the list by `document_prefix`; this engine supplies the full universe in
//! catalog declaration order.

use lsp_types::{
    CompletionItem, CompletionItemKind, Documentation, InsertTextFormat, MarkupContent, MarkupKind,
};

use super::QueryContext;
use crate::catalog::{Catalog, CatalogEntry};

/// One completion candidate, borrowed from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateInsertion<'c> {
    pub label: &'c str,
    pub kind: CompletionItemKind,
    pub detail: &'c str,
    pub description: &'c str,
    /// Snippet text with tab stops.
    pub template: &'c str,
}

impl<'c> CandidateInsertion<'c> {
    fn from_entry(entry: &'c CatalogEntry) -> Self {
        Self {
            label: &entry.label,
            kind: entry.completion_kind(),
            detail: &entry.detail,
            description: &entry.description,
            template: entry.template.source(),
        }
    }

    pub fn to_completion_item(&self) -> CompletionItem {
        CompletionItem {
            label: self.label.to_string(),
            kind: Some(self.kind),
            detail: Some(self.detail.to_string()),
            documentation: Some(Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: format!("**{}** - {}", self.label, self.detail),
            })),
            insert_text: Some(self.template.to_string()),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        }
    }
}

pub struct CompletionEngine<'c> {
    catalog: &'c Catalog,
}

impl<'c> CompletionEngine<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// All constructs, in declaration order. `ctx` does not influence the
    /// result yet; it is accepted so position-aware filtering can be added
    /// without changing callers.
    pub fn complete(&self, ctx: &QueryContext) -> Vec<CandidateInsertion<'c>> {
        tracing::trace!(
            offset = ctx.cursor_offset,
            trigger = ?ctx.trigger_char,
            "completion requested"
        );
        self.catalog
            .all()
            .iter()
            .map(CandidateInsertion::from_entry)
            .collect()
    }
}
