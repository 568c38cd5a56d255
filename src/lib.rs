//! Taskboard: multi-tenant task tracking core.
//!
//! Users authenticate against a global credential store; admins create tasks
//! and subtasks inside their company's partition and assign them to users,
//! who report progress through status updates. Completion is gated on the
//! task a task depends on, and tasks that two or more others depend on are
//! escalated to high priority.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`account`]: User credentials, login and password changes
//! - [`task`]: Task lifecycle, dependency gating and priority escalation
//! - [`context`]: Explicit per-request identity
//! - [`config`], [`database`], [`telemetry`]: Process setup

pub mod account;
pub mod config;
pub mod context;
pub mod database;
pub mod task;
pub mod telemetry;
pub mod tenancy;
