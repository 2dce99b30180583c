//! Legacy projection of equipment entities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;
use crate::tree::EntityTree;

use super::{joined_notes, split_children};

/// Legacy-shaped equipment record, computed eagerly from current tree state.
///
/// Children appear under `contains` while the entity is open and under
/// `collapsed` while it is closed; the other map is always empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentView {
    pub name: String,
    pub count: u32,
    pub cost: f64,
    pub weight: f64,
    pub carried: bool,
    pub equipped: bool,
    pub uses: Option<i32>,
    #[serde(rename = "maxuses")]
    pub max_uses: Option<i32>,
    #[serde(rename = "pageref")]
    pub page_ref: Option<String>,
    pub notes: String,
    pub contains: BTreeMap<String, EquipmentView>,
    pub collapsed: BTreeMap<String, EquipmentView>,
}

impl EquipmentView {
    pub fn project(tree: &EntityTree, id: EntityId) -> Result<Self, DomainError> {
        let entity = tree
            .get(id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let Entity::Equipment(item) = entity else {
            return Err(DomainError::validation(format!(
                "{} is a {}, not equipment",
                id,
                entity.kind()
            )));
        };
        let (contains, collapsed) = split_children(tree, id, item.open, Self::project)?;
        Ok(Self {
            name: item.name.clone(),
            count: item.count,
            cost: item.cost,
            weight: item.weight,
            carried: item.carried,
            equipped: item.equipped,
            uses: item.uses,
            max_uses: item.max_uses,
            page_ref: item.page_ref.clone(),
            notes: joined_notes(&item.notes, &item.vtt_notes),
            contains,
            collapsed,
        })
    }
}
