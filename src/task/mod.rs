//! Task and subtask lifecycle for a company partition.
//!
//! Covers task and subtask creation, status updates with an append-only
//! history, dependency gating on completion, and priority escalation for
//! tasks that others depend on. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
