//! In-process language intelligence for DhrLang — no JSON-RPC, no transport.
//!
//! Pure functions over the construct catalog. Uses `lsp-types` for the
//! standard data structures (CompletionItem, Hover) so any host can render
//! the results, but everything is called synchronously.

pub mod completion;
pub mod help;
pub mod hover;

use lsp_types::{CompletionItem, Hover, HoverContents, MarkupContent, MarkupKind};

use crate::catalog::{self, Catalog};

pub use completion::{CandidateInsertion, CompletionEngine};
pub use hover::HoverEngine;

/// Characters that make the host re-run completion. They never change the
/// candidate set, only when it is requested.
pub const TRIGGER_CHARACTERS: &[&str] = &[".", "("];

/// Cursor context for a single completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// Byte offset of the cursor in the document.
    pub cursor_offset: usize,
    /// Character that triggered the request, if any.
    pub trigger_char: Option<char>,
    /// Document text before the cursor.
    pub document_prefix: String,
}

impl QueryContext {
    /// Build a context from full document text and a cursor offset. Offsets
    /// past the end, or inside a character, are clamped back to a boundary.
    pub fn at(text: &str, cursor_offset: usize) -> Self {
        let mut end = cursor_offset.min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        Self {
            cursor_offset: end,
            trigger_char: None,
            document_prefix: text[..end].to_string(),
        }
    }

    pub fn with_trigger(mut self, trigger: char) -> Self {
        self.trigger_char = Some(trigger);
        self
    }
}

/// Hover information for a word in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    /// Markdown content.
    pub content: String,
    /// Optional range the hover applies to.
    pub range: Option<lsp_types::Range>,
}

impl HoverInfo {
    pub fn to_hover(&self) -> Hover {
        Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: self.content.clone(),
            }),
            range: self.range,
        }
    }
}

/// Completion and hover for one language, queried synchronously.
pub trait LanguageService {
    /// Compute completions for the given cursor context.
    fn completions(&self, ctx: &QueryContext) -> Vec<CompletionItem>;

    /// Hover for a word already extracted by the host.
    fn hover(&self, word: &str) -> Option<HoverInfo>;
}

/// Language service for `.dhr` files.
pub struct DhrLangService<'c> {
    completion: CompletionEngine<'c>,
    hover: HoverEngine<'c>,
}

impl<'c> DhrLangService<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            completion: CompletionEngine::new(catalog),
            hover: HoverEngine::new(catalog),
        }
    }
}

impl Default for DhrLangService<'static> {
    fn default() -> Self {
        Self::new(catalog::builtin())
    }
}

impl LanguageService for DhrLangService<'_> {
    fn completions(&self, ctx: &QueryContext) -> Vec<CompletionItem> {
        self.completion
            .complete(ctx)
            .iter()
            .map(CandidateInsertion::to_completion_item)
            .collect()
    }

    fn hover(&self, word: &str) -> Option<HoverInfo> {
        self.hover.hover(word)
    }
}

/// Find the word under the cursor in a single line.
///
/// `col` is a character (not byte) column. Words are runs of alphanumerics,
/// combining marks and `_`, so a Devanagari keyword with its vowel signs
/// and virama stays in one piece. Spaces always end a word: two-word
/// constructs such as `नहीं तो` come back as one half and will not match a
/// catalog label.
pub fn word_at(line: &str, col: usize) -> Option<&str> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    if chars.is_empty() {
        return None;
    }
    let col = col.min(chars.len());

    // A cursor just past the last character of a word still hovers it.
    let anchor = if col < chars.len() && is_word_char(chars[col].1) {
        col
    } else if col > 0 && is_word_char(chars[col - 1].1) {
        col - 1
    } else {
        return None;
    };

    let mut start = anchor;
    while start > 0 && is_word_char(chars[start - 1].1) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < chars.len() && is_word_char(chars[end].1) {
        end += 1;
    }

    let from = chars[start].0;
    let to = chars.get(end).map(|&(i, _)| i).unwrap_or(line.len());
    Some(&line[from..to])
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || is_devanagari_mark(c)
}

// Vowel signs, virama and nukta are marks, not alphanumerics.
fn is_devanagari_mark(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{0903}' | '\u{093A}'..='\u{094F}' | '\u{0951}'..='\u{0957}' | '\u{0962}'..='\u{0963}')
}
