//! Legacy key parsing and formatting.
//!
//! Grammar: dot-separated segments. An optional `legacy` root prefix, then a
//! collection name (`equipment.carried`, `equipment.other`, `ads`, `skills`,
//! `spells`, `notes`, `hitlocations`, `move`), then an optional record index,
//! then any number of `contains.<index>` containment steps, then an optional
//! trailing property. Index segments are decimal, conventionally zero-padded
//! to width 5; parsing accepts any width and keeps only the numeric value.
//!
//! No regex here - the domain layer parses by hand, and the grammar is small
//! enough that a manual walk is clearer anyway.

use std::fmt;

use crate::collection::Collection;
use crate::error::DomainError;

/// Conventional zero-pad width for index segments.
pub const INDEX_PAD_WIDTH: usize = 5;

/// Optional root prefix carried by patch keys (`legacy.hitlocations...`).
pub const LEGACY_ROOT: &str = "legacy";

/// Literal segment marking a containment step.
pub const CONTAINS_SEGMENT: &str = "contains";

/// Format one index segment with the conventional zero padding.
pub fn pad_index(index: usize) -> String {
    format!("{index:0width$}", width = INDEX_PAD_WIDTH)
}

/// A parsed legacy key: collection, positional index chain, optional property.
///
/// An empty index chain addresses the collection itself (a valid move target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyKey {
    pub collection: Collection,
    pub indices: Vec<usize>,
    pub property: Option<String>,
}

impl LegacyKey {
    pub fn collection(collection: Collection) -> Self {
        Self {
            collection,
            indices: Vec::new(),
            property: None,
        }
    }

    /// Parse a legacy dotted key.
    pub fn parse(key: &str) -> Result<Self, DomainError> {
        let segments: Vec<&str> = key.split('.').collect();
        let mut rest = segments.as_slice();
        if rest.first() == Some(&LEGACY_ROOT) {
            rest = &rest[1..];
        }

        let (collection, consumed) = Collection::from_legacy_segments(rest).ok_or_else(|| {
            DomainError::malformed(format!("unrecognized legacy collection in '{key}'"))
        })?;
        rest = &rest[consumed..];

        let mut indices = Vec::new();
        let mut property = None;

        if let Some((first, mut tail)) = rest.split_first() {
            indices.push(parse_index(first, key)?);
            loop {
                match tail.split_first() {
                    None => break,
                    Some((&CONTAINS_SEGMENT, after)) => {
                        if !collection.supports_containment() {
                            return Err(DomainError::malformed(format!(
                                "'{key}': the {collection} collection does not nest"
                            )));
                        }
                        let (index, after_index) = after.split_first().ok_or_else(|| {
                            DomainError::malformed(format!(
                                "'{key}': 'contains' must be followed by an index"
                            ))
                        })?;
                        indices.push(parse_index(index, key)?);
                        tail = after_index;
                    }
                    Some(_) => {
                        property = Some(tail.join("."));
                        break;
                    }
                }
            }
        }

        Ok(Self {
            collection,
            indices,
            property,
        })
    }

    /// The same address with any trailing property stripped.
    pub fn record_address(&self) -> Self {
        Self {
            collection: self.collection,
            indices: self.indices.clone(),
            property: None,
        }
    }

    /// Whether the key addresses a collection rather than a record.
    pub fn is_collection(&self) -> bool {
        self.indices.is_empty()
    }
}

fn parse_index(segment: &str, key: &str) -> Result<usize, DomainError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::malformed(format!(
            "'{key}': index segment '{segment}' is not a decimal number"
        )));
    }
    segment.parse::<usize>().map_err(|_| {
        DomainError::malformed(format!("'{key}': index segment '{segment}' is out of range"))
    })
}

impl fmt::Display for LegacyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection.legacy_path())?;
        for (position, index) in self.indices.iter().enumerate() {
            if position > 0 {
                write!(f, ".{CONTAINS_SEGMENT}")?;
            }
            write!(f, ".{}", pad_index(*index))?;
        }
        if let Some(property) = &self.property {
            write!(f, ".{property}")?;
        }
        Ok(())
    }
}
