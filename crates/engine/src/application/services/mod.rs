//! Application services - use case implementations
//!
//! Each service follows hexagonal architecture principles, accepting its
//! collaborators as `Arc<dyn Port>` and assembling exactly one atomic batch
//! per user-visible operation.

pub mod patch;
pub mod relocation;

pub use patch::PatchRewriteService;
pub use relocation::{MoveError, MoveOutcome, RelocationService};
