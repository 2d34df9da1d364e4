//! TreeGraph Core Business Logic Layer
//!
//! This crate provides the tree model, graph persistence and service
//! orchestration for TreeGraph, a named tree of nodes stored in a graph
//! database.
//!
//! # Architecture
//!
//! - **Owned hierarchy**: a node owns its children and holds only a snapshot
//!   of its parent, so in-memory trees are acyclic by construction
//! - **Graph storage**: SurrealDB `tree_node` records linked by `is_parent_of`
//!   edges, embedded (RocksDB), in-memory, or on a remote server
//! - **Audit stamping**: node ids, uuids and timestamps are assigned on save
//!
//! # Modules
//!
//! - [`models`] - Data structures (TreeNode, TreeNodeForm)
//! - [`services`] - Business services (TreeService)
//! - [`db`] - Database layer with SurrealDB integration

pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
