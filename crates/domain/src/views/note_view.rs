//! Legacy projection of note entries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

use super::{joined_notes, split_children};

/// Legacy note records carry only the joined text plus the child maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteView {
    pub notes: String,
    pub contains: BTreeMap<String, NoteView>,
    pub collapsed: BTreeMap<String, NoteView>,
}

impl NoteView {
    pub fn project(tree: &EntityTree, id: EntityId) -> Result<Self, DomainError> {
        let entity = tree
            .get(id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let Entity::Note(note) = entity else {
            return Err(DomainError::validation(format!(
                "{} is a {}, not a note",
                id,
                entity.kind()
            )));
        };
        let (contains, collapsed) = split_children(tree, id, note.open, Self::project)?;
        Ok(Self {
            notes: joined_notes(&note.text, &note.vtt_notes),
            contains,
            collapsed,
        })
    }
}
