//! Application layer - ports, per-record state, and orchestration services
//!
//! This layer contains:
//! - Ports: interface definitions (traits) for the host's collaborators
//! - Registry: the per-record canonical tree state
//! - Services: relocation (move/merge/split) and legacy patch rewriting

pub mod ports;
pub mod registry;
pub mod services;
