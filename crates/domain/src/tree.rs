//! Canonical in-memory storage of a sheet's entity forest.
//!
//! The tree owns every invariant the rest of the system relies on:
//!
//! - sibling `sort_index` values form the contiguous set {0..n-1} within any
//!   one parent+collection after every mutation
//! - `contained_by` always references an entity of the same collection family
//! - no entity transitively contains itself
//!
//! Membership is derived from entity state (collection + parent pointer), so
//! there is no secondary index to fall out of sync. Mutating services plan on
//! a [`Clone`] of the tree, turn the plan into an [`EntityBatch`] via
//! [`EntityBatch::diff`], hand the batch to the persistence collaborator, and
//! only then fold it back into the canonical tree with
//! [`EntityTree::apply_batch`]. A rejected batch leaves the tree untouched.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::Collection;
use crate::entities::Entity;
use crate::error::DomainError;
use crate::ids::EntityId;

/// Ordered forest of sheet entities.
#[derive(Debug, Clone, Default)]
pub struct EntityTree {
    entities: HashMap<EntityId, Entity>,
}

impl EntityTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from the modern array-of-records shape.
    ///
    /// Tolerates disorder in the input: dangling parent pointers become roots,
    /// containment cycles are broken at the entity that closes them, and every
    /// sibling list is renumbered to 0..n-1 (stable on the stored order).
    pub fn from_records(records: Vec<Entity>) -> Self {
        let mut tree = Self::new();
        for entity in records {
            tree.entities.insert(entity.id(), entity);
        }

        let ids: Vec<EntityId> = tree.sorted_ids();
        for id in &ids {
            let parent = tree.entities.get(id).and_then(Entity::contained_by);
            if let Some(parent_id) = parent {
                let parent_ok = tree
                    .entities
                    .get(&parent_id)
                    .is_some_and(|p| p.supports_children() && p.family() == tree.entities[id].family());
                if !parent_ok {
                    if let Some(entity) = tree.entities.get_mut(id) {
                        entity.set_contained_by(None);
                    }
                }
            }
        }

        // Break containment cycles: the first node a walk revisits sits on
        // the cycle, so it becomes a root.
        for id in &ids {
            let mut seen = HashSet::new();
            let mut current = *id;
            while let Some(parent) = tree.entities.get(&current).and_then(Entity::contained_by) {
                if !seen.insert(current) {
                    if let Some(entity) = tree.entities.get_mut(&current) {
                        entity.set_contained_by(None);
                    }
                    break;
                }
                current = parent;
            }
        }

        for (collection, parent) in tree.sibling_groups() {
            tree.reindex(collection, parent);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// All records in a deterministic order (by id), for snapshots and
    /// byte-for-byte comparisons in tests.
    pub fn records(&self) -> Vec<&Entity> {
        let mut all: Vec<&Entity> = self.entities.values().collect();
        all.sort_by_key(|e| e.id().to_uuid());
        all
    }

    fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort_by_key(|id| id.to_uuid());
        ids
    }

    fn sibling_groups(&self) -> Vec<(Collection, Option<EntityId>)> {
        let mut groups: Vec<(Collection, Option<EntityId>)> = self
            .entities
            .values()
            .map(|e| (e.collection(), e.contained_by()))
            .collect();
        groups.sort_by_key(|(c, p)| (*c, p.map(EntityId::to_uuid)));
        groups.dedup();
        groups
    }

    /// Ordered ids sharing one parent+collection.
    pub fn siblings_of(&self, collection: Collection, parent: Option<EntityId>) -> Vec<EntityId> {
        let mut siblings: Vec<(u32, EntityId)> = self
            .entities
            .values()
            .filter(|e| e.collection() == collection && e.contained_by() == parent)
            .map(|e| (e.sort_index(), e.id()))
            .collect();
        siblings.sort_by_key(|(index, id)| (*index, id.to_uuid()));
        siblings.into_iter().map(|(_, id)| id).collect()
    }

    pub fn roots_of(&self, collection: Collection) -> Vec<EntityId> {
        self.siblings_of(collection, None)
    }

    pub fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        match self.entities.get(&id) {
            Some(entity) if entity.supports_children() => {
                self.siblings_of(entity.collection(), Some(id))
            }
            _ => Vec::new(),
        }
    }

    /// Rewrite sibling sort indices to 0..n-1 in list order.
    ///
    /// Must run after any insert or remove touching the group.
    pub fn reindex(&mut self, collection: Collection, parent: Option<EntityId>) {
        let siblings = self.siblings_of(collection, parent);
        for (position, id) in siblings.into_iter().enumerate() {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.set_sort_index(position as u32);
            }
        }
    }

    /// Containment chain from `id` (exclusive) to its root, nearest first.
    pub fn ancestors_of(&self, id: EntityId) -> Vec<EntityId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = id;
        while let Some(parent) = self.entities.get(&current).and_then(Entity::contained_by) {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Whether `id` sits (transitively) inside `ancestor`.
    pub fn is_descendant(&self, ancestor: EntityId, id: EntityId) -> bool {
        self.ancestors_of(id).contains(&ancestor)
    }

    /// The root of the containment chain (`id` itself when unparented).
    /// Equipment consumers read carried/equipped here.
    pub fn root_of(&self, id: EntityId) -> EntityId {
        self.ancestors_of(id).last().copied().unwrap_or(id)
    }

    /// Ids of the whole subtree under `id`, preorder, `id` first.
    pub fn descendants_of(&self, id: EntityId) -> Vec<EntityId> {
        let mut ordered = vec![id];
        let mut cursor = 0;
        while cursor < ordered.len() {
            let current = ordered[cursor];
            ordered.extend(self.children_of(current));
            cursor += 1;
        }
        ordered
    }

    /// Resolve a positional index chain to an entity.
    pub fn resolve(&self, collection: Collection, indices: &[usize]) -> Option<EntityId> {
        let (first, rest) = indices.split_first()?;
        let mut current = *self.roots_of(collection).get(*first)?;
        for index in rest {
            current = *self.children_of(current).get(*index)?;
        }
        Some(current)
    }

    /// Inverse of [`resolve`](Self::resolve) for the current snapshot.
    pub fn index_chain_of(&self, id: EntityId) -> Option<Vec<usize>> {
        let entity = self.entities.get(&id)?;
        let collection = entity.collection();
        let mut chain = Vec::new();
        let mut current = id;
        for ancestor in self.ancestors_of(id) {
            let position = self
                .children_of(ancestor)
                .iter()
                .position(|child| *child == current)?;
            chain.push(position);
            current = ancestor;
        }
        let root_position = self
            .roots_of(collection)
            .iter()
            .position(|root| *root == current)?;
        chain.push(root_position);
        chain.reverse();
        Some(chain)
    }

    /// Number of siblings a new entity would join under parent+collection.
    pub fn next_sort_index(&self, collection: Collection, parent: Option<EntityId>) -> u32 {
        self.siblings_of(collection, parent).len() as u32
    }

    /// Append an entity at the end of its sibling list.
    pub fn add(&mut self, mut entity: Entity) -> Result<EntityId, DomainError> {
        let id = entity.id();
        if self.entities.contains_key(&id) {
            return Err(DomainError::validation(format!(
                "entity {id} already exists in the tree"
            )));
        }
        if let Some(parent_id) = entity.contained_by() {
            let parent = self.entities.get(&parent_id).ok_or_else(|| {
                DomainError::not_found("Entity", parent_id.to_string())
            })?;
            if !parent.supports_children() {
                return Err(DomainError::validation(format!(
                    "a {} cannot contain children",
                    parent.kind()
                )));
            }
            if parent.collection() != entity.collection() {
                return Err(DomainError::validation(format!(
                    "parent {} is not in the {} collection",
                    parent_id,
                    entity.collection()
                )));
            }
        }
        let position = self.next_sort_index(entity.collection(), entity.contained_by());
        entity.set_sort_index(position);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Reparent an entity and place it among its new siblings.
    ///
    /// `position` counts within the new sibling list *excluding* the moved
    /// entity; `None` appends. Both vacated and joined sibling lists come out
    /// renumbered 0..n-1.
    pub fn move_node(
        &mut self,
        id: EntityId,
        new_parent: Option<EntityId>,
        collection: Collection,
        position: Option<usize>,
    ) -> Result<(), DomainError> {
        let entity = self
            .entities
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        if entity.family() != collection.family() {
            return Err(DomainError::validation(format!(
                "cannot move a {} into the {collection} collection",
                entity.kind()
            )));
        }
        let old_group = (entity.collection(), entity.contained_by());

        if let Some(parent_id) = new_parent {
            if parent_id == id || self.is_descendant(id, parent_id) {
                return Err(DomainError::cycle(format!(
                    "{} cannot be moved inside its own subtree",
                    entity.name()
                )));
            }
            let parent = self.entities.get(&parent_id).ok_or_else(|| {
                DomainError::not_found("Entity", parent_id.to_string())
            })?;
            if !parent.supports_children() {
                return Err(DomainError::validation(format!(
                    "a {} cannot contain children",
                    parent.kind()
                )));
            }
            if parent.collection() != collection {
                return Err(DomainError::validation(format!(
                    "parent {parent_id} is not in the {collection} collection"
                )));
            }
        }

        if old_group.0 != collection {
            self.set_subtree_collection(id, collection)?;
        }
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.set_contained_by(new_parent);
        }

        let new_group = (collection, new_parent);
        if old_group != new_group {
            self.reindex(old_group.0, old_group.1);
        }

        let mut siblings: Vec<EntityId> = self
            .siblings_of(collection, new_parent)
            .into_iter()
            .filter(|sibling| *sibling != id)
            .collect();
        let position = position.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(position, id);
        for (index, sibling) in siblings.into_iter().enumerate() {
            if let Some(entity) = self.entities.get_mut(&sibling) {
                entity.set_sort_index(index as u32);
            }
        }
        Ok(())
    }

    /// Move the whole subtree into `collection` (equipment bucket changes).
    fn set_subtree_collection(
        &mut self,
        id: EntityId,
        collection: Collection,
    ) -> Result<(), DomainError> {
        for member in self.descendants_of(id) {
            if let Some(entity) = self.entities.get_mut(&member) {
                entity.set_collection(collection)?;
            }
        }
        Ok(())
    }

    /// Remove an entity and every descendant; the vacated sibling list is
    /// renumbered. Returns the removed ids, preorder.
    pub fn remove_subtree(&mut self, id: EntityId) -> Vec<EntityId> {
        let Some(entity) = self.entities.get(&id) else {
            return Vec::new();
        };
        let group = (entity.collection(), entity.contained_by());
        let removed = self.descendants_of(id);
        for member in &removed {
            self.entities.remove(member);
        }
        self.reindex(group.0, group.1);
        removed
    }

    /// Flip the expanded state of a container-capable entity.
    pub fn toggle_open(&mut self, id: EntityId) -> Result<bool, DomainError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let containable = entity.as_containable_mut().ok_or_else(|| {
            DomainError::validation("hit locations and move modes cannot be expanded")
        })?;
        containable.toggle_open();
        Ok(containable.open())
    }

    /// Merge a camelCase field map into an entity (modern field names).
    ///
    /// The `id` and `kind` of a record are immutable through this path.
    pub fn merge_fields(
        &mut self,
        id: EntityId,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<(), DomainError> {
        if fields.contains_key("id") || fields.contains_key("kind") {
            return Err(DomainError::malformed(
                "updates may not change an entity's id or kind",
            ));
        }
        let entity = self
            .entities
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Entity", id.to_string()))?;
        let mut value = serde_json::to_value(entity)
            .map_err(|e| DomainError::malformed(format!("entity does not serialize: {e}")))?;
        let Value::Object(map) = &mut value else {
            return Err(DomainError::malformed("entity is not a JSON object"));
        };
        for (key, field) in fields {
            map.insert(key.clone(), field.clone());
        }
        let updated: Entity = serde_json::from_value(value)
            .map_err(|e| DomainError::malformed(format!("update does not deserialize: {e}")))?;
        self.entities.insert(id, updated);
        Ok(())
    }

    /// Duplicate a subtree with fresh ids. The duplicate root comes back
    /// unparented; the caller decides where it lands.
    pub fn duplicate_subtree(&self, id: EntityId) -> Result<(EntityId, Vec<Entity>), DomainError> {
        let members = self.descendants_of(id);
        if members.is_empty() {
            return Err(DomainError::not_found("Entity", id.to_string()));
        }
        let mut id_map: HashMap<EntityId, EntityId> = HashMap::new();
        let mut duplicates = Vec::with_capacity(members.len());
        for member in members {
            let mut copy = self.entities[&member].clone();
            copy.reissue_id();
            id_map.insert(member, copy.id());
            let parent = copy.contained_by().and_then(|p| id_map.get(&p).copied());
            copy.set_contained_by(parent);
            duplicates.push(copy);
        }
        let new_root = duplicates[0].id();
        Ok((new_root, duplicates))
    }

    /// Fold a batch into the tree: creates, then updates, then deletes.
    pub fn apply_batch(&mut self, batch: &EntityBatch) -> Result<(), DomainError> {
        for entity in &batch.creates {
            if self.entities.contains_key(&entity.id()) {
                return Err(DomainError::validation(format!(
                    "create for {} collides with an existing entity",
                    entity.id()
                )));
            }
            self.entities.insert(entity.id(), entity.clone());
        }
        for update in &batch.updates {
            self.merge_fields(update.id, &update.fields)?;
        }
        for id in &batch.deletes {
            self.entities.remove(id);
        }
        Ok(())
    }
}

/// One update in a batch: merge `fields` (modern camelCase names) into `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityUpdate {
    pub id: EntityId,
    pub fields: serde_json::Map<String, Value>,
}

/// An atomic set of create/update/delete operations against one record.
///
/// This is the only mutation currency in the system: services plan, diff, and
/// ship exactly one batch per user-visible operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBatch {
    pub creates: Vec<Entity>,
    pub updates: Vec<EntityUpdate>,
    pub deletes: Vec<EntityId>,
}

impl EntityBatch {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }

    /// Compute the batch that turns `before` into `after`.
    ///
    /// Updates carry only the top-level fields whose serialized value changed.
    pub fn diff(before: &EntityTree, after: &EntityTree) -> Result<EntityBatch, DomainError> {
        let mut batch = EntityBatch::default();

        for entity in after.records() {
            match before.get(entity.id()) {
                None => batch.creates.push(entity.clone()),
                Some(previous) if previous != entity => {
                    let old = to_object(previous)?;
                    let new = to_object(entity)?;
                    let mut fields = serde_json::Map::new();
                    for (key, value) in &new {
                        if old.get(key) != Some(value) {
                            fields.insert(key.clone(), value.clone());
                        }
                    }
                    for key in old.keys() {
                        if !new.contains_key(key) {
                            fields.insert(key.clone(), Value::Null);
                        }
                    }
                    if !fields.is_empty() {
                        batch.updates.push(EntityUpdate {
                            id: entity.id(),
                            fields,
                        });
                    }
                }
                Some(_) => {}
            }
        }

        for entity in before.records() {
            if !after.contains(entity.id()) {
                batch.deletes.push(entity.id());
            }
        }

        Ok(batch)
    }
}

fn to_object(entity: &Entity) -> Result<serde_json::Map<String, Value>, DomainError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DomainError::malformed("entity is not a JSON object")),
        Err(e) => Err(DomainError::malformed(format!(
            "entity does not serialize: {e}"
        ))),
    }
}
