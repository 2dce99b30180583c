//! Legacy projection of skill entities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

use super::{joined_notes, split_children};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillView {
    pub name: String,
    pub points: i32,
    pub level: Option<i32>,
    /// Relative skill level column ("DX+1")
    #[serde(rename = "rsl")]
    pub relative_level: Option<String>,
    #[serde(rename = "pageref")]
    pub page_ref: Option<String>,
    pub notes: String,
    pub contains: BTreeMap<String, SkillView>,
    pub collapsed: BTreeMap<String, SkillView>,
}

impl SkillView {
    pub fn project(tree: &EntityTree, id: EntityId) -> Result<Self, DomainError> {
        let entity = tree
            .get(id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let Entity::Skill(skill) = entity else {
            return Err(DomainError::validation(format!(
                "{} is a {}, not a skill",
                id,
                entity.kind()
            )));
        };
        let (contains, collapsed) = split_children(tree, id, skill.open, Self::project)?;
        Ok(Self {
            name: skill.name.clone(),
            points: skill.points,
            level: skill.level,
            relative_level: skill.relative_level.clone(),
            page_ref: skill.page_ref.clone(),
            notes: joined_notes(&skill.notes, &skill.vtt_notes),
            contains,
            collapsed,
        })
    }
}
