//! Sheetbridge Engine library.
//!
//! The application layer of the legacy/modern sheet compatibility subsystem:
//!
//! - `application::ports` - traits for the host's collaborators (store,
//!   prompts, localization) and the pre-commit hook contract
//! - `application::registry` - per-record canonical tree state
//! - `application::services` - relocation (move/merge/split) and legacy
//!   patch rewriting
//! - `infrastructure` - settings and telemetry wiring
//!
//! The host persistence engine owns all I/O; this crate only plans entity
//! batches and hands them over.

pub mod application;
pub mod infrastructure;

pub use application::ports::{
    DropPosition, LocalizePort, PatchError, PreCommitHook, PromptPort, SheetStore, StoreError,
};
pub use application::registry::SheetRegistry;
pub use application::services::{
    MoveError, MoveOutcome, PatchRewriteService, RelocationService,
};
pub use infrastructure::settings::EngineSettings;
pub use infrastructure::telemetry::init_tracing;
