//! Persistence store port.

use async_trait::async_trait;
use serde_json::Value;

use sheetbridge_domain::{EntityBatch, RecordId};

use super::error::{PatchError, StoreError};

/// Record-keyed persistence collaborator.
///
/// The store owns durability; this subsystem only hands it work. A batch is
/// all-or-nothing: if `apply_batch` returns an error, none of its operations
/// may be observable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read one property of the owning record by dotted path
    /// (e.g. a modern collection array such as `adsV2`).
    async fn get_property(
        &self,
        record: RecordId,
        path: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Apply one atomic create/update/delete batch to the record's entities.
    async fn apply_batch(&self, record: RecordId, batch: &EntityBatch) -> Result<(), StoreError>;
}

/// Contract the host invokes with every proposed patch before committing it.
///
/// The hook may rewrite the patch in place; the returned batch carries the
/// entity operations the host must apply in the same commit.
pub trait PreCommitHook: Send + Sync {
    fn pre_commit(
        &self,
        record: RecordId,
        patch: &mut serde_json::Map<String, Value>,
    ) -> Result<EntityBatch, PatchError>;
}
