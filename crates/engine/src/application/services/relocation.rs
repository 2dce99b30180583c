//! Relocation service - move, merge, and split entities across containers.
//!
//! Orchestrates: key resolution, split/merge short-circuits, family and cycle
//! validation, drop-position prompting, and the single atomic batch that
//! carries the whole effect. Planning happens on a snapshot of the tree;
//! prompts resolve before anything mutates, so a dismissal at any prompt
//! leaves the canonical tree byte-for-byte unchanged. The store sees exactly
//! one batch per operation, and the canonical tree only changes after the
//! store accepted it.

use std::sync::Arc;

use tracing::instrument;

use sheetbridge_domain::{
    Collection, DomainError, Entity, EntityBatch, EntityId, EntityTree, LegacyKey, RecordId,
};

use crate::application::ports::{
    DropPosition, LocalizePort, PromptPort, SheetStore, StoreError,
};
use crate::application::registry::SheetRegistry;
use crate::infrastructure::settings::EngineSettings;

const SPLIT_PROMPT_KEY: &str = "SHEETBRIDGE.Prompt.SplitQuantity";
const MERGE_PROMPT_KEY: &str = "SHEETBRIDGE.Prompt.MergeDuplicates";
const POSITION_PROMPT_KEY: &str = "SHEETBRIDGE.Prompt.DropPosition";

/// What a relocation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Ordinary reparent/reorder.
    Moved,
    /// A split created a new entity carrying part of the quantity.
    Split { new_entity: EntityId },
    /// The source merged into an existing same-named entity.
    Merged { target: EntityId },
    /// A prompt was dismissed; nothing changed.
    Cancelled,
    /// Source and target were the same address; nothing to do.
    Noop,
}

/// Errors a relocation can surface. User cancellation is an outcome, not an
/// error; the store rejecting the batch is not retried here.
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown record: {0}")]
    UnknownRecord(RecordId),

    #[error("Persistence rejected the batch: {0}")]
    Persistence(#[from] StoreError),
}

impl From<DomainError> for MoveError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => Self::NotFound(err.to_string()),
            DomainError::Validation(_) | DomainError::Cycle(_) | DomainError::Malformed(_) => {
                Self::Validation(err.to_string())
            }
        }
    }
}

/// Destination of a move: parent container (None = collection roots) and
/// position among the new siblings (None = append).
#[derive(Debug, Clone, Copy)]
struct Placement {
    parent: Option<EntityId>,
    position: Option<usize>,
}

/// Move/merge/split orchestration over one record's tree.
pub struct RelocationService {
    registry: Arc<SheetRegistry>,
    store: Arc<dyn SheetStore>,
    prompts: Arc<dyn PromptPort>,
    localize: Arc<dyn LocalizePort>,
    settings: EngineSettings,
}

impl RelocationService {
    pub fn new(
        registry: Arc<SheetRegistry>,
        store: Arc<dyn SheetStore>,
        prompts: Arc<dyn PromptPort>,
        localize: Arc<dyn LocalizePort>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            store,
            prompts,
            localize,
            settings,
        }
    }

    /// Relocate the entity at `source_key` onto `target_key`.
    ///
    /// `target_key` may address a collection (append at end) or an entity
    /// (insert before, or inside when the target is a container). With
    /// `split_requested` and a quantity above one, the user is asked how much
    /// to split off; a requested amount covering the full quantity degrades
    /// into an ordinary move.
    #[instrument(skip(self), fields(record = %record))]
    pub async fn move_entity(
        &self,
        record: RecordId,
        source_key: &str,
        target_key: &str,
        split_requested: bool,
    ) -> Result<MoveOutcome, MoveError> {
        let source = LegacyKey::parse(source_key).map_err(MoveError::from)?;
        let target = LegacyKey::parse(target_key).map_err(MoveError::from)?;
        if source.is_collection() {
            return Err(MoveError::Validation(format!(
                "source '{source}' does not address an entity"
            )));
        }
        if source.record_address() == target.record_address() {
            return Ok(MoveOutcome::Noop);
        }

        let tree = self
            .registry
            .snapshot(record)
            .ok_or(MoveError::UnknownRecord(record))?;
        let source_id = tree
            .resolve(source.collection, &source.indices)
            .ok_or_else(|| MoveError::NotFound(format!("no entity at {source}")))?;
        let source_name = tree
            .get(source_id)
            .map(|e| e.name().to_string())
            .unwrap_or_default();

        // Split short-circuit: runs before any other validation, and never
        // falls through to the ordinary move once an actual split happens.
        if split_requested {
            if let Some(count) = tree.get(source_id).and_then(Entity::count) {
                if count > 1 {
                    let prompt = format!(
                        "{} ({source_name})",
                        self.localize.localize(SPLIT_PROMPT_KEY)
                    );
                    match self.prompts.ask_split_count(&prompt, count).await {
                        None | Some(0) => return Ok(MoveOutcome::Cancelled),
                        Some(amount) if amount < count => {
                            return self.split(record, &tree, source_id, &target, amount).await;
                        }
                        // Splitting the full quantity is just a move.
                        Some(_) => {}
                    }
                }
            }
        }

        let source_family = tree
            .get(source_id)
            .map(Entity::family)
            .ok_or_else(|| MoveError::NotFound(format!("no entity at {source}")))?;
        if source_family != target.collection.family() {
            return Err(MoveError::Validation(format!(
                "cannot move '{source_name}' ({source_family}) into the {} collection",
                target.collection
            )));
        }

        let target_id = if target.is_collection() {
            None
        } else {
            Some(
                tree.resolve(target.collection, &target.indices)
                    .ok_or_else(|| MoveError::NotFound(format!("no entity at {target}")))?,
            )
        };

        if let Some(target_id) = target_id {
            if target_id == source_id || tree.is_descendant(source_id, target_id) {
                return Err(MoveError::Validation(format!(
                    "'{source_name}' cannot be dropped into its own contents"
                )));
            }

            // Merge short-circuit: same kind, same name.
            let target_entity = tree
                .get(target_id)
                .ok_or_else(|| MoveError::NotFound(format!("no entity at {target}")))?;
            let source_entity = tree
                .get(source_id)
                .ok_or_else(|| MoveError::NotFound(format!("no entity at {source}")))?;
            if target_entity.kind() == source_entity.kind()
                && target_entity.name() == source_entity.name()
            {
                let prompt = format!(
                    "{} ({source_name})",
                    self.localize.localize(MERGE_PROMPT_KEY)
                );
                if self.prompts.confirm_merge(&prompt).await {
                    return self.merge(record, &tree, source_id, target_id).await;
                }
            }
        }

        let placement = match target_id {
            None => Placement {
                parent: None,
                position: None,
            },
            Some(target_id) => {
                let supports_children = tree
                    .get(target_id)
                    .is_some_and(Entity::supports_children);
                if supports_children {
                    let prompt = format!(
                        "{} ({source_name})",
                        self.localize.localize(POSITION_PROMPT_KEY)
                    );
                    match self.prompts.choose_drop_position(&prompt).await {
                        None => return Ok(MoveOutcome::Cancelled),
                        Some(DropPosition::Inside) => Placement {
                            parent: Some(target_id),
                            position: None,
                        },
                        Some(DropPosition::Before) => position_before(&tree, source_id, target_id),
                    }
                } else {
                    position_before(&tree, source_id, target_id)
                }
            }
        };

        let mut plan = tree.clone();
        if self.settings.auto_expand_on_drop {
            if let Some(parent_id) = placement.parent {
                if let Some(container) =
                    plan.get_mut(parent_id).and_then(Entity::as_containable_mut)
                {
                    if !container.open() {
                        container.set_open(true);
                    }
                }
            }
        }
        let crossing_out_of_carried = tree
            .get(source_id)
            .is_some_and(|e| e.collection() == Collection::EquipmentCarried)
            && target.collection == Collection::EquipmentOther;
        plan.move_node(
            source_id,
            placement.parent,
            target.collection,
            placement.position,
        )
        .map_err(MoveError::from)?;
        if crossing_out_of_carried {
            if let Some(Entity::Equipment(item)) = plan.get_mut(source_id) {
                item.equipped = false;
            }
        }

        let batch = EntityBatch::diff(&tree, &plan).map_err(MoveError::from)?;
        if batch.is_empty() {
            return Ok(MoveOutcome::Noop);
        }
        self.commit(record, &batch).await?;
        tracing::info!(
            source = %source,
            target = %target,
            ops = batch.len(),
            "entity moved"
        );
        Ok(MoveOutcome::Moved)
    }

    /// Split `amount` off the source into a duplicate subtree under the
    /// target container. Quantity is conserved: source loses exactly what the
    /// duplicate gains.
    async fn split(
        &self,
        record: RecordId,
        tree: &EntityTree,
        source_id: EntityId,
        target: &LegacyKey,
        amount: u32,
    ) -> Result<MoveOutcome, MoveError> {
        let mut plan = tree.clone();
        let (new_root, mut duplicates) = plan.duplicate_subtree(source_id).map_err(MoveError::from)?;

        let placement = if target.is_collection() {
            Placement {
                parent: None,
                position: None,
            }
        } else {
            let target_id = tree
                .resolve(target.collection, &target.indices)
                .ok_or_else(|| MoveError::NotFound(format!("no entity at {target}")))?;
            let target_entity = tree
                .get(target_id)
                .ok_or_else(|| MoveError::NotFound(format!("no entity at {target}")))?;
            if target_entity.supports_children() {
                Placement {
                    parent: Some(target_id),
                    position: None,
                }
            } else {
                // No removal happens on a split, so the target's position
                // needs no preceding-sibling adjustment.
                let parent = target_entity.contained_by();
                let siblings = tree.siblings_of(target_entity.collection(), parent);
                Placement {
                    parent,
                    position: siblings.iter().position(|id| *id == target_id),
                }
            }
        };

        for duplicate in &mut duplicates {
            duplicate
                .set_collection(target.collection)
                .map_err(MoveError::from)?;
        }
        duplicates[0].set_count(amount);
        duplicates[0].set_contained_by(placement.parent);
        if target.collection == Collection::EquipmentOther {
            if let Entity::Equipment(item) = &mut duplicates[0] {
                item.equipped = false;
            }
        }
        for duplicate in duplicates {
            plan.add(duplicate).map_err(MoveError::from)?;
        }
        if let Some(position) = placement.position {
            plan.move_node(new_root, placement.parent, target.collection, Some(position))
                .map_err(MoveError::from)?;
        }

        let remaining = tree
            .get(source_id)
            .and_then(Entity::count)
            .unwrap_or(amount)
            .saturating_sub(amount);
        if let Some(source) = plan.get_mut(source_id) {
            source.set_count(remaining);
        }

        let batch = EntityBatch::diff(tree, &plan).map_err(MoveError::from)?;
        self.commit(record, &batch).await?;
        tracing::info!(
            source = %source_id,
            new_entity = %new_root,
            amount,
            "entity split"
        );
        Ok(MoveOutcome::Split {
            new_entity: new_root,
        })
    }

    /// Merge the source into a same-named target: quantities add, the source
    /// subtree is cascade-deleted.
    async fn merge(
        &self,
        record: RecordId,
        tree: &EntityTree,
        source_id: EntityId,
        target_id: EntityId,
    ) -> Result<MoveOutcome, MoveError> {
        let mut plan = tree.clone();
        let source_count = tree.get(source_id).and_then(Entity::count);
        let target_count = tree.get(target_id).and_then(Entity::count);
        if let (Some(source_count), Some(target_count)) = (source_count, target_count) {
            if let Some(target) = plan.get_mut(target_id) {
                target.set_count(target_count + source_count);
            }
        }
        plan.remove_subtree(source_id);

        let batch = EntityBatch::diff(tree, &plan).map_err(MoveError::from)?;
        self.commit(record, &batch).await?;
        tracing::info!(source = %source_id, target = %target_id, "entities merged");
        Ok(MoveOutcome::Merged { target: target_id })
    }

    /// Ship the batch to the store, then fold it into the canonical tree.
    /// Store rejection propagates with the tree untouched.
    async fn commit(&self, record: RecordId, batch: &EntityBatch) -> Result<(), MoveError> {
        self.store.apply_batch(record, batch).await?;
        self.registry.commit(record, batch).map_err(MoveError::from)
    }
}

/// Placement for "insert as preceding sibling of target", adjusted for the
/// index shift when the source currently precedes the target in the same
/// sibling list.
fn position_before(tree: &EntityTree, source_id: EntityId, target_id: EntityId) -> Placement {
    let Some(target_entity) = tree.get(target_id) else {
        return Placement {
            parent: None,
            position: None,
        };
    };
    let parent = target_entity.contained_by();
    let siblings = tree.siblings_of(target_entity.collection(), parent);
    let mut position = siblings
        .iter()
        .position(|id| *id == target_id)
        .unwrap_or(siblings.len());
    if let Some(source_position) = siblings.iter().position(|id| *id == source_id) {
        if source_position < position {
            position -= 1;
        }
    }
    Placement {
        parent,
        position: Some(position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockLocalizePort, MockPromptPort, MockSheetStore};
    use sheetbridge_domain::Equipment;

    fn passthrough_localize() -> Arc<MockLocalizePort> {
        let mut localize = MockLocalizePort::new();
        localize.expect_localize().returning(|key| key.to_string());
        Arc::new(localize)
    }

    fn accepting_store() -> MockSheetStore {
        let mut store = MockSheetStore::new();
        store.expect_apply_batch().returning(|_, _| Ok(()));
        store
    }

    fn carried_items(specs: &[(&str, u32)]) -> EntityTree {
        let mut tree = EntityTree::new();
        for (name, count) in specs {
            tree.add(Entity::Equipment(Equipment::new(*name).with_count(*count)))
                .expect("add");
        }
        tree
    }

    fn service(
        tree: EntityTree,
        store: MockSheetStore,
        prompts: MockPromptPort,
    ) -> (RelocationService, RecordId, Arc<SheetRegistry>) {
        let record = RecordId::new();
        let registry = Arc::new(SheetRegistry::new());
        registry.insert(record, tree);
        let service = RelocationService::new(
            registry.clone(),
            Arc::new(store),
            Arc::new(prompts),
            passthrough_localize(),
            EngineSettings::default(),
        );
        (service, record, registry)
    }

    fn fingerprint(registry: &SheetRegistry, record: RecordId) -> serde_json::Value {
        serde_json::to_value(registry.snapshot(record).expect("snapshot").records())
            .expect("serialize")
    }

    fn nest(tree: &mut EntityTree, parent: EntityId, name: &str) -> EntityId {
        let mut child = Entity::new(
            tree.get(parent).expect("parent").collection(),
            name,
        );
        child.set_contained_by(Some(parent));
        tree.add(child).expect("add nested")
    }

    #[tokio::test]
    async fn when_source_equals_target_returns_noop() {
        let tree = carried_items(&[("Rope", 1)]);
        let (service, record, registry) = service(tree, MockSheetStore::new(), MockPromptPort::new());
        let before = fingerprint(&registry, record);

        let outcome = service
            .move_entity(
                record,
                "equipment.carried.00000",
                "equipment.carried.00000.name",
                false,
            )
            .await
            .expect("noop");
        assert_eq!(outcome, MoveOutcome::Noop);
        assert_eq!(fingerprint(&registry, record), before);
    }

    #[tokio::test]
    async fn when_source_does_not_resolve_returns_not_found() {
        let tree = carried_items(&[("Rope", 1)]);
        let (service, record, _) = service(tree, MockSheetStore::new(), MockPromptPort::new());

        let result = service
            .move_entity(record, "equipment.carried.00005", "equipment.other", false)
            .await;
        assert!(matches!(result, Err(MoveError::NotFound(_))));
    }

    #[tokio::test]
    async fn when_families_mismatch_returns_validation() {
        let tree = carried_items(&[("Rope", 1)]);
        let (service, record, registry) = service(tree, MockSheetStore::new(), MockPromptPort::new());
        let before = fingerprint(&registry, record);

        let result = service
            .move_entity(record, "equipment.carried.00000", "skills", false)
            .await;
        assert!(matches!(result, Err(MoveError::Validation(_))));
        assert_eq!(fingerprint(&registry, record), before);
    }

    #[tokio::test]
    async fn when_target_is_inside_source_returns_validation_and_tree_is_untouched() {
        let mut tree = carried_items(&[("Backpack", 1)]);
        let backpack = tree.roots_of(Collection::EquipmentCarried)[0];
        nest(&mut tree, backpack, "Pouch");
        let (service, record, registry) = service(tree, MockSheetStore::new(), MockPromptPort::new());
        let before = fingerprint(&registry, record);

        let result = service
            .move_entity(
                record,
                "equipment.carried.00000",
                "equipment.carried.00000.contains.00000",
                false,
            )
            .await;
        assert!(matches!(result, Err(MoveError::Validation(_))));
        assert_eq!(fingerprint(&registry, record), before);
    }

    #[tokio::test]
    async fn when_split_amount_is_partial_quantity_is_conserved() {
        let tree = carried_items(&[("Arrows", 4)]);
        let mut prompts = MockPromptPort::new();
        prompts
            .expect_ask_split_count()
            .withf(|_, max| *max == 4)
            .returning(|_, _| Some(1));
        let (service, record, registry) = service(tree, accepting_store(), prompts);

        let outcome = service
            .move_entity(record, "equipment.carried.00000", "equipment.other", true)
            .await
            .expect("split");
        let MoveOutcome::Split { new_entity } = outcome else {
            panic!("expected a split, got {outcome:?}");
        };

        let committed = registry.snapshot(record).expect("snapshot");
        let source = committed.roots_of(Collection::EquipmentCarried)[0];
        assert_eq!(committed.get(source).expect("source").count(), Some(3));
        assert_eq!(
            committed.roots_of(Collection::EquipmentOther),
            vec![new_entity]
        );
        let split_off = committed.get(new_entity).expect("duplicate");
        assert_eq!(split_off.count(), Some(1));
        assert_eq!(split_off.name(), "Arrows");
        assert_eq!(split_off.collection(), Collection::EquipmentOther);
    }

    #[tokio::test]
    async fn when_split_prompt_is_dismissed_nothing_changes() {
        let tree = carried_items(&[("Arrows", 4)]);
        let mut prompts = MockPromptPort::new();
        prompts.expect_ask_split_count().returning(|_, _| None);
        let (service, record, registry) = service(tree, MockSheetStore::new(), prompts);
        let before = fingerprint(&registry, record);

        let outcome = service
            .move_entity(record, "equipment.carried.00000", "equipment.other", true)
            .await
            .expect("cancelled");
        assert_eq!(outcome, MoveOutcome::Cancelled);
        assert_eq!(fingerprint(&registry, record), before);
    }

    #[tokio::test]
    async fn when_split_amount_is_zero_treated_as_cancellation() {
        let tree = carried_items(&[("Arrows", 4)]);
        let mut prompts = MockPromptPort::new();
        prompts.expect_ask_split_count().returning(|_, _| Some(0));
        let (service, record, registry) = service(tree, MockSheetStore::new(), prompts);
        let before = fingerprint(&registry, record);

        let outcome = service
            .move_entity(record, "equipment.carried.00000", "equipment.other", true)
            .await
            .expect("cancelled");
        assert_eq!(outcome, MoveOutcome::Cancelled);
        assert_eq!(fingerprint(&registry, record), before);
    }

    #[tokio::test]
    async fn when_split_amount_covers_full_quantity_degrades_to_move() {
        let tree = carried_items(&[("Arrows", 4)]);
        let mut prompts = MockPromptPort::new();
        prompts.expect_ask_split_count().returning(|_, _| Some(4));
        let (service, record, registry) = service(tree, accepting_store(), prompts);

        let outcome = service
            .move_entity(record, "equipment.carried.00000", "equipment.other", true)
            .await
            .expect("move");
        assert_eq!(outcome, MoveOutcome::Moved);

        let committed = registry.snapshot(record).expect("snapshot");
        assert!(committed.roots_of(Collection::EquipmentCarried).is_empty());
        let moved = committed.roots_of(Collection::EquipmentOther)[0];
        assert_eq!(committed.get(moved).expect("moved").count(), Some(4));
    }

    #[tokio::test]
    async fn when_merge_is_confirmed_counts_add_and_source_disappears() {
        let tree = carried_items(&[("Rations", 3), ("Rations", 2)]);
        let mut prompts = MockPromptPort::new();
        prompts.expect_confirm_merge().returning(|_| true);
        let (service, record, registry) = service(tree, accepting_store(), prompts);

        let outcome = service
            .move_entity(
                record,
                "equipment.carried.00000",
                "equipment.carried.00001",
                false,
            )
            .await
            .expect("merge");
        let MoveOutcome::Merged { target } = outcome else {
            panic!("expected a merge, got {outcome:?}");
        };

        let committed = registry.snapshot(record).expect("snapshot");
        let roots = committed.roots_of(Collection::EquipmentCarried);
        assert_eq!(roots, vec![target]);
        assert_eq!(committed.get(target).expect("target").count(), Some(5));
    }

    #[tokio::test]
    async fn when_merge_is_declined_the_move_continues() {
        let tree = carried_items(&[("Rations", 3), ("Rations", 2)]);
        let mut prompts = MockPromptPort::new();
        prompts.expect_confirm_merge().returning(|_| false);
        prompts
            .expect_choose_drop_position()
            .returning(|_| Some(DropPosition::Inside));
        let (service, record, registry) = service(tree, accepting_store(), prompts);

        let outcome = service
            .move_entity(
                record,
                "equipment.carried.00000",
                "equipment.carried.00001",
                false,
            )
            .await
            .expect("move");
        assert_eq!(outcome, MoveOutcome::Moved);

        let committed = registry.snapshot(record).expect("snapshot");
        let roots = committed.roots_of(Collection::EquipmentCarried);
        assert_eq!(roots.len(), 1);
        let children = committed.children_of(roots[0]);
        assert_eq!(children.len(), 1);
        assert_eq!(committed.get(children[0]).expect("child").count(), Some(3));
        // Destination container was collapsed and got expanded on drop
        assert!(committed
            .get(roots[0])
            .and_then(Entity::as_containable)
            .expect("container")
            .open());
    }

    #[tokio::test]
    async fn when_dropping_before_a_later_sibling_order_is_adjusted() {
        let tree = carried_items(&[("A", 1), ("B", 1), ("C", 1)]);
        let mut prompts = MockPromptPort::new();
        prompts
            .expect_choose_drop_position()
            .returning(|_| Some(DropPosition::Before));
        let (service, record, registry) = service(tree, accepting_store(), prompts);

        // Move A before C: removal of A shifts C from index 2 to 1
        let outcome = service
            .move_entity(
                record,
                "equipment.carried.00000",
                "equipment.carried.00002",
                false,
            )
            .await
            .expect("move");
        assert_eq!(outcome, MoveOutcome::Moved);

        let committed = registry.snapshot(record).expect("snapshot");
        let names: Vec<String> = committed
            .roots_of(Collection::EquipmentCarried)
            .iter()
            .map(|id| committed.get(*id).expect("root").name().to_string())
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        for (position, id) in committed
            .roots_of(Collection::EquipmentCarried)
            .iter()
            .enumerate()
        {
            assert_eq!(
                committed.get(*id).expect("root").sort_index(),
                position as u32
            );
        }
    }

    #[tokio::test]
    async fn when_position_prompt_is_dismissed_nothing_changes() {
        let tree = carried_items(&[("Rope", 1), ("Backpack", 1)]);
        let mut prompts = MockPromptPort::new();
        prompts.expect_choose_drop_position().returning(|_| None);
        let (service, record, registry) = service(tree, MockSheetStore::new(), prompts);
        let before = fingerprint(&registry, record);

        let outcome = service
            .move_entity(
                record,
                "equipment.carried.00000",
                "equipment.carried.00001",
                false,
            )
            .await
            .expect("cancelled");
        assert_eq!(outcome, MoveOutcome::Cancelled);
        assert_eq!(fingerprint(&registry, record), before);
    }

    #[tokio::test]
    async fn when_store_rejects_the_batch_tree_is_untouched() {
        let tree = carried_items(&[("Rope", 1)]);
        let mut store = MockSheetStore::new();
        store
            .expect_apply_batch()
            .returning(|_, _| Err(StoreError::rejected("apply_batch", "store offline")));
        let (service, record, registry) = service(tree, store, MockPromptPort::new());
        let before = fingerprint(&registry, record);

        let result = service
            .move_entity(record, "equipment.carried.00000", "equipment.other", false)
            .await;
        assert!(matches!(result, Err(MoveError::Persistence(_))));
        assert_eq!(fingerprint(&registry, record), before);
    }

    #[tokio::test]
    async fn when_crossing_to_other_carried_and_equipped_follow_the_destination() {
        let mut tree = EntityTree::new();
        let mut backpack = Equipment::new("Backpack");
        backpack.equipped = true;
        let backpack_id = tree.add(Entity::Equipment(backpack)).expect("add");
        let rope = nest(&mut tree, backpack_id, "Rope");
        let (service, record, registry) = service(tree, accepting_store(), MockPromptPort::new());

        let outcome = service
            .move_entity(record, "equipment.carried.00000", "equipment.other", false)
            .await
            .expect("move");
        assert_eq!(outcome, MoveOutcome::Moved);

        let committed = registry.snapshot(record).expect("snapshot");
        let Some(Entity::Equipment(moved)) = committed.get(backpack_id) else {
            panic!("backpack survived the move");
        };
        assert!(!moved.carried);
        assert!(!moved.equipped);
        assert_eq!(
            committed.get(rope).expect("rope").collection(),
            Collection::EquipmentOther
        );
    }

    #[tokio::test]
    async fn when_record_is_unknown_returns_unknown_record() {
        let registry = Arc::new(SheetRegistry::new());
        let service = RelocationService::new(
            registry,
            Arc::new(MockSheetStore::new()),
            Arc::new(MockPromptPort::new()),
            passthrough_localize(),
            EngineSettings::default(),
        );

        let result = service
            .move_entity(
                RecordId::new(),
                "equipment.carried.00000",
                "equipment.other",
                false,
            )
            .await;
        assert!(matches!(result, Err(MoveError::UnknownRecord(_))));
    }
}
