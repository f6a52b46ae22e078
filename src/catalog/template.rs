//! Insertion templates in editor snippet syntax.
//!
//! `${N}` is an empty tab stop, `${N:text}` a tab stop with a default.
//! Slots that share an index are linked: the editor mirrors an edit in one
//! into the others, and `render` writes the same value into all of them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),

    #[error("placeholder at byte {0} has no tab-stop index")]
    MissingIndex(usize),

    #[error("linked slot ${index} has conflicting defaults '{first}' and '{second}'")]
    ConflictingDefaults {
        index: u32,
        first: String,
        second: String,
    },
}

/// One tab stop inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub index: u32,
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Slot(Slot),
}

/// A parsed insertion template. Keeps the original snippet text so it can be
/// handed to the editor unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < source.len() {
            if source[i..].starts_with("${") {
                let start = i;
                let body_start = i + 2;
                let close = source[body_start..]
                    .find('}')
                    .map(|p| body_start + p)
                    .ok_or(TemplateError::Unterminated(start))?;
                let body = &source[body_start..close];
                let (index, default) = match body.split_once(':') {
                    Some((idx, def)) => (idx, def),
                    None => (body, ""),
                };
                let index: u32 = index
                    .parse()
                    .map_err(|_| TemplateError::MissingIndex(start))?;

                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }
                segments.push(Segment::Slot(Slot {
                    index,
                    default: default.to_string(),
                }));
                i = close + 1;
                continue;
            }

            // Advance one whole character; templates are mostly Devanagari.
            let Some(ch) = source[i..].chars().next() else {
                break;
            };
            text.push(ch);
            i += ch.len_utf8();
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        let template = Self {
            source: source.to_string(),
            segments,
        };
        template.check_linked_defaults()?;
        Ok(template)
    }

    /// Snippet text as written in the catalog.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Slots in textual order, including every occurrence of a linked slot.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Slot(slot) => Some(slot),
            Segment::Text(_) => None,
        })
    }

    /// Tab-stop indices that occur more than once, with their occurrence count.
    pub fn linked_groups(&self) -> BTreeMap<u32, usize> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for slot in self.slots() {
            *counts.entry(slot.index).or_default() += 1;
        }
        counts.retain(|_, n| *n > 1);
        counts
    }

    pub fn is_linked(&self, index: u32) -> bool {
        self.linked_groups().contains_key(&index)
    }

    /// Render with caller-supplied slot values. Every slot of an index gets
    /// the same value; indices without a value fall back to their default.
    pub fn render(&self, values: &HashMap<u32, &str>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Slot(slot) => match values.get(&slot.index) {
                    Some(v) => out.push_str(v),
                    None => out.push_str(&slot.default),
                },
            }
        }
        out
    }

    /// Render with defaults only, for editors without snippet support.
    pub fn plain(&self) -> String {
        self.render(&HashMap::new())
    }

    fn check_linked_defaults(&self) -> Result<(), TemplateError> {
        let mut seen: HashMap<u32, &str> = HashMap::new();
        for slot in self.slots() {
            match seen.get(&slot.index) {
                Some(first) if *first != slot.default => {
                    return Err(TemplateError::ConflictingDefaults {
                        index: slot.index,
                        first: first.to_string(),
                        second: slot.default.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(slot.index, &slot.default);
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<String> for Template {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
