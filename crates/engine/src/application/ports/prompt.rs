//! UI prompt port.
//!
//! Prompting is a suspension point: the operation blocks on the human and no
//! tree mutation happens until every required prompt has resolved. `None`
//! always means the prompt was dismissed, which is not a failure - callers
//! translate it into a no-op.

use async_trait::async_trait;

/// Where a dragged entity lands relative to the entity it was dropped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    /// Insert as a preceding sibling of the target.
    Before,
    /// Append as the last child of the target container.
    Inside,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptPort: Send + Sync {
    /// Binary choice between dropping before or inside a container target.
    async fn choose_drop_position(&self, prompt: &str) -> Option<DropPosition>;

    /// Merge confirmation; `false` means declined (the move continues).
    async fn confirm_merge(&self, prompt: &str) -> bool;

    /// Numeric quantity input for a split, bounded by `max`.
    async fn ask_split_count(&self, prompt: &str, max: u32) -> Option<u32>;
}
