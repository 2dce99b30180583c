//! Legacy projection of spell entities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

use super::{joined_notes, split_children};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellView {
    pub name: String,
    pub points: i32,
    pub level: Option<i32>,
    pub college: Option<String>,
    #[serde(rename = "pageref")]
    pub page_ref: Option<String>,
    pub notes: String,
    pub contains: BTreeMap<String, SpellView>,
    pub collapsed: BTreeMap<String, SpellView>,
}

impl SpellView {
    pub fn project(tree: &EntityTree, id: EntityId) -> Result<Self, DomainError> {
        let entity = tree
            .get(id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let Entity::Spell(spell) = entity else {
            return Err(DomainError::validation(format!(
                "{} is a {}, not a spell",
                id,
                entity.kind()
            )));
        };
        let (contains, collapsed) = split_children(tree, id, spell.open, Self::project)?;
        Ok(Self {
            name: spell.name.clone(),
            points: spell.points,
            level: spell.level,
            college: spell.college.clone(),
            page_ref: spell.page_ref.clone(),
            notes: joined_notes(&spell.notes, &spell.vtt_notes),
            contains,
            collapsed,
        })
    }
}
