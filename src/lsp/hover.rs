//! Hover engine — exact-label lookup of the word under the cursor.

use super::HoverInfo;
use crate::catalog::Catalog;

pub struct HoverEngine<'c> {
    catalog: &'c Catalog,
}

impl<'c> HoverEngine<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Documentation for `word`, or `None` when it is not a construct label.
    ///
    /// `word` is whatever span the host extracted. Multi-word labels only
    /// match if the host hands over the full span, spaces included.
    pub fn hover(&self, word: &str) -> Option<HoverInfo> {
        let entry = self.catalog.lookup(word)?;
        Some(HoverInfo {
            content: format!("**{}**\n\n{}", entry.label, entry.description),
            range: None,
        })
    }
}
