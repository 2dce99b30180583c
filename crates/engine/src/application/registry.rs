//! Per-record sheet state.
//!
//! One owning record (one character) maps to one canonical [`EntityTree`].
//! Mutating services take a snapshot, plan against it, and fold the accepted
//! batch back in with [`SheetRegistry::commit`]; the host serializes writers
//! per record, so a snapshot taken at the start of an operation stays valid
//! until that operation commits. Guards are never held across `.await`.

use anyhow::Context;
use dashmap::DashMap;

use sheetbridge_domain::{
    Collection, DomainError, Entity, EntityBatch, EntityTree, RecordId,
};

use super::ports::SheetStore;

/// Concurrent map of record id to canonical entity tree.
#[derive(Debug, Default)]
pub struct SheetRegistry {
    sheets: DashMap<RecordId, EntityTree>,
}

impl SheetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a record's modern collection arrays from the store and build its
    /// canonical tree, replacing any previous state for the record.
    ///
    /// Returns the number of entities loaded.
    pub async fn hydrate(
        &self,
        store: &dyn SheetStore,
        record: RecordId,
    ) -> anyhow::Result<usize> {
        let mut records: Vec<Entity> = Vec::new();
        for collection in Collection::ALL {
            let path = collection.modern_path();
            let value = store
                .get_property(record, path)
                .await
                .with_context(|| format!("reading {path} for record {record}"))?;
            if let Some(value) = value {
                let mut entities: Vec<Entity> = serde_json::from_value(value)
                    .with_context(|| format!("decoding {path} for record {record}"))?;
                records.append(&mut entities);
            }
        }
        let count = records.len();
        self.sheets.insert(record, EntityTree::from_records(records));
        tracing::debug!(record = %record, entities = count, "sheet hydrated");
        Ok(count)
    }

    /// Register a prebuilt tree for a record (tests, imports).
    pub fn insert(&self, record: RecordId, tree: EntityTree) {
        self.sheets.insert(record, tree);
    }

    pub fn contains(&self, record: RecordId) -> bool {
        self.sheets.contains_key(&record)
    }

    pub fn remove(&self, record: RecordId) -> Option<EntityTree> {
        self.sheets.remove(&record).map(|(_, tree)| tree)
    }

    /// Clone of the record's current tree, for planning and projections.
    pub fn snapshot(&self, record: RecordId) -> Option<EntityTree> {
        self.sheets.get(&record).map(|tree| tree.clone())
    }

    /// Fold an accepted batch into the canonical tree.
    pub fn commit(&self, record: RecordId, batch: &EntityBatch) -> Result<(), DomainError> {
        let mut tree = self
            .sheets
            .get_mut(&record)
            .ok_or_else(|| DomainError::not_found("Record", record.to_string()))?;
        tree.apply_batch(batch)
    }
}
