//! Legacy patch rewriting - the pre-commit hook.
//!
//! Rewrites a proposed patch (legacy dotted keys -> values) into modern entity
//! operations before the host commits it. Fail-open outside the recognized
//! namespaces: any key this service does not own passes through byte-for-byte,
//! so unrelated edits in the same patch cannot be corrupted. Fail-loud inside
//! them: a recognized namespace with an unresolvable record address is an
//! error, not a guess.
//!
//! Runs synchronously, inline, immediately before the commit. Idempotent by
//! construction - a rewritten patch has no legacy keys left, so a second pass
//! finds nothing to do.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use sheetbridge_domain::{Collection, Entity, EntityBatch, LegacyKey, RecordId, LEGACY_ROOT};

use crate::application::ports::{PatchError, PreCommitHook};
use crate::application::registry::SheetRegistry;
use crate::infrastructure::settings::EngineSettings;

/// Namespaces this rewriter owns. Everything else passes through.
fn namespace_collection(segment: &str) -> Option<Collection> {
    match segment {
        "hitlocations" => Some(Collection::HitLocations),
        "ads" => Some(Collection::Traits),
        "move" => Some(Collection::MoveModes),
        "notes" => Some(Collection::Notes),
        _ => None,
    }
}

/// Legacy column names -> modern field names, per namespace.
fn modern_field(collection: Collection, legacy: &str) -> String {
    match (collection, legacy) {
        (Collection::HitLocations, "where") => "name".into(),
        (Collection::MoveModes, "mode") => "name".into(),
        (Collection::MoveModes, "default") => "defaultMode".into(),
        (Collection::Notes, "notes") => "text".into(),
        (Collection::Notes, "title") => "name".into(),
        (Collection::Traits, "pageref") => "pageRef".into(),
        _ => legacy.into(),
    }
}

/// Pre-commit patch rewriter over one record's tree.
pub struct PatchRewriteService {
    registry: Arc<SheetRegistry>,
    settings: EngineSettings,
}

impl PatchRewriteService {
    pub fn new(registry: Arc<SheetRegistry>, settings: EngineSettings) -> Self {
        Self { registry, settings }
    }

    /// Rewrite `patch` in place and return the equivalent entity batch.
    ///
    /// Translated legacy keys are removed from the patch; deletion sentinels
    /// additionally assign the empty modern array. The caller commits the
    /// batch together with the patch and then folds it into the canonical
    /// tree via [`apply_committed`](Self::apply_committed).
    pub fn rewrite(
        &self,
        record: RecordId,
        patch: &mut Map<String, Value>,
    ) -> Result<EntityBatch, PatchError> {
        let tree = self
            .registry
            .snapshot(record)
            .ok_or(PatchError::UnknownRecord(record))?;
        let mut plan = tree.clone();

        let mut translated: Vec<String> = Vec::new();
        let mut resets: Vec<Collection> = Vec::new();
        // BTreeMap gives ascending record addresses, so creates land in
        // legacy index order and parents sort before their children.
        let mut groups: BTreeMap<(Collection, Vec<usize>), Map<String, Value>> = BTreeMap::new();

        for (key, value) in patch.iter() {
            let Some(rest) = key
                .strip_prefix(LEGACY_ROOT)
                .and_then(|k| k.strip_prefix('.'))
            else {
                continue;
            };
            let namespace = rest.split('.').next().unwrap_or(rest);
            let Some(collection) = namespace_collection(namespace) else {
                continue;
            };

            let remainder = rest.strip_prefix(namespace).and_then(|r| r.strip_prefix('.'));
            match remainder {
                // Deletion sentinel: wipe the whole namespace.
                Some(sentinel) if sentinel.starts_with("-=") => {
                    resets.push(collection);
                    translated.push(key.clone());
                }
                _ => {
                    match self.group_entry(collection, key, rest, value, &mut groups) {
                        Ok(()) => translated.push(key.clone()),
                        Err(err) if self.settings.strict_namespaces => return Err(err),
                        Err(err) => {
                            tracing::warn!(
                                key = %key,
                                error = %err,
                                "leaving malformed legacy key untouched"
                            );
                        }
                    }
                }
            }
        }

        for collection in &resets {
            for root in plan.roots_of(*collection) {
                plan.remove_subtree(root);
            }
        }

        for ((collection, indices), fields) in groups {
            match plan.resolve(collection, &indices) {
                Some(id) => plan.merge_fields(id, &fields)?,
                None => {
                    let parent = match indices.split_last() {
                        Some((_, parents)) if !parents.is_empty() => {
                            Some(plan.resolve(collection, parents).ok_or_else(|| {
                                PatchError::malformed(
                                    LegacyKey {
                                        collection,
                                        indices: indices.clone(),
                                        property: None,
                                    }
                                    .to_string(),
                                    "parent record does not exist",
                                )
                            })?)
                        }
                        _ => None,
                    };
                    let name = fields
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    let mut entity = Entity::new(collection, name);
                    entity.set_contained_by(parent);
                    let id = plan.add(entity)?;
                    plan.merge_fields(id, &fields)?;
                }
            }
        }

        for key in &translated {
            patch.remove(key);
        }
        for collection in &resets {
            patch.insert(collection.modern_path().to_string(), Value::Array(Vec::new()));
        }

        let batch = EntityBatch::diff(&tree, &plan)?;
        if !batch.is_empty() {
            tracing::debug!(
                record = %record,
                creates = batch.creates.len(),
                updates = batch.updates.len(),
                deletes = batch.deletes.len(),
                "legacy patch rewritten"
            );
        }
        Ok(batch)
    }

    /// Fold a batch the host has committed into the canonical tree.
    pub fn apply_committed(
        &self,
        record: RecordId,
        batch: &EntityBatch,
    ) -> Result<(), PatchError> {
        self.registry.commit(record, batch).map_err(PatchError::from)
    }

    /// Parse one key and merge its fields into the per-record group.
    fn group_entry(
        &self,
        collection: Collection,
        key: &str,
        rest: &str,
        value: &Value,
        groups: &mut BTreeMap<(Collection, Vec<usize>), Map<String, Value>>,
    ) -> Result<(), PatchError> {
        let parsed =
            LegacyKey::parse(rest).map_err(|e| PatchError::malformed(key, e.to_string()))?;
        if parsed.indices.is_empty() {
            return Err(PatchError::malformed(key, "no resolvable record index"));
        }
        let entry = groups
            .entry((collection, parsed.indices.clone()))
            .or_default();
        match &parsed.property {
            Some(property) if property.starts_with("-=") => Err(PatchError::malformed(
                key,
                "field deletion inside a record is not supported",
            )),
            Some(property) => {
                entry.insert(modern_field(collection, property), value.clone());
                Ok(())
            }
            None => {
                let Value::Object(fields) = value else {
                    return Err(PatchError::malformed(
                        key,
                        "a record assignment must be an object",
                    ));
                };
                for (field, field_value) in fields {
                    entry.insert(modern_field(collection, field), field_value.clone());
                }
                Ok(())
            }
        }
    }
}

impl PreCommitHook for PatchRewriteService {
    fn pre_commit(
        &self,
        record: RecordId,
        patch: &mut Map<String, Value>,
    ) -> Result<EntityBatch, PatchError> {
        self.rewrite(record, patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheetbridge_domain::{EntityTree, HitLocation};

    fn setup(tree: EntityTree) -> (PatchRewriteService, RecordId, Arc<SheetRegistry>) {
        let record = RecordId::new();
        let registry = Arc::new(SheetRegistry::new());
        registry.insert(record, tree);
        let service = PatchRewriteService::new(registry.clone(), EngineSettings::default());
        (service, record, registry)
    }

    fn patch_of(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn hit_location_tree(names: &[&str]) -> EntityTree {
        let mut tree = EntityTree::new();
        for name in names {
            tree.add(Entity::HitLocation(HitLocation::new(*name)))
                .expect("add");
        }
        tree
    }

    #[test]
    fn when_slot_does_not_exist_a_create_is_synthesized() {
        // Scenario: patching slot 2 of a table that only has slots 0 and 1
        let (service, record, registry) = setup(hit_location_tree(&["Head", "Torso"]));
        let mut patch = patch_of(&[("legacy.hitlocations.00002.dr", json!(5))]);

        let batch = service.rewrite(record, &mut patch).expect("rewrite");
        assert_eq!(batch.creates.len(), 1);
        assert!(batch.updates.is_empty());
        assert!(!patch.contains_key("legacy.hitlocations.00002.dr"));

        service.apply_committed(record, &batch).expect("commit");
        let tree = registry.snapshot(record).expect("snapshot");
        let created = tree
            .resolve(Collection::HitLocations, &[2])
            .expect("slot 2 exists");
        let Some(Entity::HitLocation(row)) = tree.get(created) else {
            panic!("slot 2 is not a hit location");
        };
        assert_eq!(row.dr, 5);
        assert_eq!(row.sort_index, 2);
    }

    #[test]
    fn when_slot_exists_fields_merge_into_an_update() {
        let (service, record, _) = setup(hit_location_tree(&["Head", "Torso"]));
        let mut patch = patch_of(&[
            ("legacy.hitlocations.00001.dr", json!(3)),
            ("legacy.hitlocations.00001.where", json!("Chest")),
        ]);

        let batch = service.rewrite(record, &mut patch).expect("rewrite");
        assert!(batch.creates.is_empty());
        assert_eq!(batch.updates.len(), 1, "one record, one update");
        let update = &batch.updates[0];
        assert_eq!(update.fields.get("dr"), Some(&json!(3)));
        assert_eq!(update.fields.get("name"), Some(&json!("Chest")));
        assert!(patch.is_empty());
    }

    #[test]
    fn when_sentinel_arrives_namespace_is_wiped_and_array_emptied() {
        let mut tree = EntityTree::new();
        for name in ["Lucky", "Combat Reflexes"] {
            tree.add(Entity::new(Collection::Traits, name)).expect("add");
        }
        let (service, record, registry) = setup(tree);
        let mut patch = patch_of(&[("legacy.ads.-=ads", Value::Null)]);

        let batch = service.rewrite(record, &mut patch).expect("rewrite");
        assert_eq!(batch.deletes.len(), 2);
        assert!(!patch.contains_key("legacy.ads.-=ads"));
        assert_eq!(patch.get("adsV2"), Some(&json!([])));

        service.apply_committed(record, &batch).expect("commit");
        let committed = registry.snapshot(record).expect("snapshot");
        assert!(committed.roots_of(Collection::Traits).is_empty());
    }

    #[test]
    fn when_keys_are_outside_recognized_namespaces_they_pass_through() {
        let (service, record, _) = setup(EntityTree::new());
        let mut patch = patch_of(&[
            ("system.hp.value", json!(11)),
            ("legacy.equipment.carried.00000.count", json!(2)),
            ("name", json!("Dai Blackthorn")),
        ]);
        let original = patch.clone();

        let batch = service.rewrite(record, &mut patch).expect("rewrite");
        assert!(batch.is_empty());
        assert_eq!(patch, original);
    }

    #[test]
    fn when_record_address_has_no_index_rewrite_fails_loud() {
        let (service, record, _) = setup(EntityTree::new());
        let mut patch = patch_of(&[("legacy.ads.broken", json!("x"))]);

        let err = service.rewrite(record, &mut patch).expect_err("malformed");
        assert!(matches!(err, PatchError::Malformed { .. }));
    }

    #[test]
    fn when_namespaces_are_lenient_malformed_keys_pass_through() {
        let record = RecordId::new();
        let registry = Arc::new(SheetRegistry::new());
        registry.insert(record, EntityTree::new());
        let service = PatchRewriteService::new(
            registry,
            EngineSettings {
                strict_namespaces: false,
                ..EngineSettings::default()
            },
        );
        let mut patch = patch_of(&[("legacy.ads.broken", json!("x"))]);

        let batch = service.rewrite(record, &mut patch).expect("lenient");
        assert!(batch.is_empty());
        assert!(patch.contains_key("legacy.ads.broken"));
    }

    #[test]
    fn when_rewrite_runs_twice_nothing_doubles() {
        let (service, record, _) = setup(hit_location_tree(&["Head"]));
        let mut patch = patch_of(&[("legacy.hitlocations.00001.dr", json!(2))]);

        let first = service.rewrite(record, &mut patch).expect("first pass");
        assert_eq!(first.creates.len(), 1);
        service.apply_committed(record, &first).expect("commit");

        let second = service.rewrite(record, &mut patch).expect("second pass");
        assert!(second.is_empty());
        assert!(patch.is_empty());
    }

    #[test]
    fn when_record_is_assigned_whole_fields_translate() {
        let (service, record, registry) = setup(EntityTree::new());
        let mut patch = patch_of(&[(
            "legacy.move.00000",
            json!({"mode": "Ground", "basic": 5, "default": true}),
        )]);

        let batch = service.rewrite(record, &mut patch).expect("rewrite");
        assert_eq!(batch.creates.len(), 1);
        service.apply_committed(record, &batch).expect("commit");

        let tree = registry.snapshot(record).expect("snapshot");
        let id = tree.resolve(Collection::MoveModes, &[0]).expect("created");
        let Some(Entity::MoveMode(mode)) = tree.get(id) else {
            panic!("not a move mode");
        };
        assert_eq!(mode.name, "Ground");
        assert_eq!(mode.basic, 5);
        assert!(mode.default_mode);
    }

    #[test]
    fn when_nested_record_has_no_parent_rewrite_fails_loud() {
        let (service, record, _) = setup(EntityTree::new());
        let mut patch = patch_of(&[(
            "legacy.notes.00000.contains.00000.notes",
            json!("orphaned child"),
        )]);

        let err = service.rewrite(record, &mut patch).expect_err("no parent");
        assert!(matches!(err, PatchError::Malformed { .. }));
    }

    #[test]
    fn when_parent_is_created_in_the_same_patch_children_nest_under_it() {
        let (service, record, registry) = setup(EntityTree::new());
        let mut patch = patch_of(&[
            ("legacy.notes.00000.notes", json!("Session log")),
            ("legacy.notes.00000.contains.00000.notes", json!("Day one")),
        ]);

        let batch = service.rewrite(record, &mut patch).expect("rewrite");
        assert_eq!(batch.creates.len(), 2);
        service.apply_committed(record, &batch).expect("commit");

        let tree = registry.snapshot(record).expect("snapshot");
        let parent = tree.resolve(Collection::Notes, &[0]).expect("parent");
        let child = tree.resolve(Collection::Notes, &[0, 0]).expect("child");
        assert_eq!(tree.get(child).expect("child").contained_by(), Some(parent));
        let Some(Entity::Note(note)) = tree.get(child) else {
            panic!("not a note");
        };
        assert_eq!(note.text, "Day one");
    }

    #[test]
    fn when_sentinel_and_writes_share_a_patch_the_namespace_is_rebuilt() {
        let (service, record, registry) = setup(hit_location_tree(&["Head", "Torso"]));
        let mut patch = patch_of(&[
            ("legacy.hitlocations.-=hitlocations", Value::Null),
            (
                "legacy.hitlocations.00000",
                json!({"where": "Skull", "dr": 2}),
            ),
        ]);

        let batch = service.rewrite(record, &mut patch).expect("rewrite");
        assert_eq!(batch.deletes.len(), 2);
        assert_eq!(batch.creates.len(), 1);
        service.apply_committed(record, &batch).expect("commit");

        let tree = registry.snapshot(record).expect("snapshot");
        let roots = tree.roots_of(Collection::HitLocations);
        assert_eq!(roots.len(), 1);
        assert_eq!(tree.get(roots[0]).expect("row").name(), "Skull");
    }
}
