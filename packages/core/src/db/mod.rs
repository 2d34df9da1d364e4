//! Database Layer
//!
//! This module handles all graph store interactions using SurrealDB:
//!
//! - Connection settings and engine selection ([`DatabaseConfig`])
//! - The persistence contract used by the services ([`TreeNodeRepository`])
//! - The SurrealDB implementation ([`SurrealStore`])
//! - Audit stamping of node ids, uuids and timestamps before writes
//! - Domain events broadcast after mutations
//!
//! # Architecture
//!
//! Nodes live in the `tree_node` table, keyed by their uuid. The hierarchy is
//! stored as `is_parent_of` graph edges from parent to child, so a subtree is
//! a graph traversal rather than a recursive join.

pub mod audit;
mod config;
mod error;
pub mod events;
mod repository;
mod surreal_store;

pub use audit::generate_uuid;
pub use config::{Credentials, DatabaseConfig, Engine, DEFAULT_DATABASE, DEFAULT_NAMESPACE};
pub use error::DatabaseError;
pub use events::DomainEvent;
pub use repository::TreeNodeRepository;
pub use surreal_store::SurrealStore;
