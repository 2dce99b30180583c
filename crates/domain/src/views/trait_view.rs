//! Legacy projection of trait ("ads") entities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

use super::{joined_notes, split_children};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitView {
    pub name: String,
    pub points: i32,
    #[serde(rename = "pageref")]
    pub page_ref: Option<String>,
    pub notes: String,
    pub contains: BTreeMap<String, TraitView>,
    pub collapsed: BTreeMap<String, TraitView>,
}

impl TraitView {
    pub fn project(tree: &EntityTree, id: EntityId) -> Result<Self, DomainError> {
        let entity = tree
            .get(id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let Entity::Trait(entry) = entity else {
            return Err(DomainError::validation(format!(
                "{} is a {}, not a trait",
                id,
                entity.kind()
            )));
        };
        let (contains, collapsed) = split_children(tree, id, entry.open, Self::project)?;
        Ok(Self {
            name: entry.name.clone(),
            points: entry.points,
            page_ref: entry.page_ref.clone(),
            notes: joined_notes(&entry.notes, &entry.vtt_notes),
            contains,
            collapsed,
        })
    }
}
