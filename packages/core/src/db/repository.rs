//! TreeNodeRepository Trait - Persistence Abstraction
//!
//! This module defines the `TreeNodeRepository` trait that abstracts graph
//! store operations for tree nodes. `TreeService` depends only on this trait,
//! `SurrealStore` is the production implementation.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async, the store may be embedded or remote
//! 2. **Whole subtrees**: Lookups return nodes with their parent reference and
//!    complete subtree loaded; `save` writes the complete subtree
//! 3. **Absent is not an error**: Lookups return `Option`/empty `Vec`
//!
//! # Examples
//!
//! ```rust,no_run
//! use treegraph_core::db::{DatabaseConfig, SurrealStore, TreeNodeRepository};
//! use treegraph_core::models::TreeNode;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SurrealStore::connect(&DatabaseConfig::in_memory()).await?;
//!     let repository: Arc<dyn TreeNodeRepository> = Arc::new(store);
//!
//!     let root = repository.save(TreeNode::new("root").with_depth(0)).await?;
//!     println!("Created root: {}", root);
//!
//!     Ok(())
//! }
//! ```

use crate::db::DatabaseError;
use crate::models::TreeNode;
use async_trait::async_trait;

/// Persistence operations for tree nodes
///
/// Implementations must be `Send + Sync` so that a single instance can be
/// shared across request handlers.
#[async_trait]
pub trait TreeNodeRepository: Send + Sync {
    //
    // LOOKUPS
    //

    /// Find a node by its uuid
    ///
    /// # Returns
    ///
    /// - `Ok(Some(node))` with parent reference and subtree loaded
    /// - `Ok(None)` if no node has this uuid
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<TreeNode>, DatabaseError>;

    /// Find the root of the tree: the node without an incoming parent edge.
    ///
    /// When several trees were created, the one created first is returned.
    async fn find_root(&self) -> Result<Option<TreeNode>, DatabaseError>;

    /// Find all nodes with exactly this name
    async fn find_by_name(&self, name: &str) -> Result<Vec<TreeNode>, DatabaseError>;

    /// Find the children of `parent` as stored, in insertion order
    ///
    /// An unsaved parent has no stored children.
    async fn find_by_parent(&self, parent: &TreeNode) -> Result<Vec<TreeNode>, DatabaseError>;

    /// All nodes, in creation order
    async fn find_all(&self) -> Result<Vec<TreeNode>, DatabaseError>;

    /// Number of stored nodes
    async fn count(&self) -> Result<usize, DatabaseError>;

    //
    // WRITES
    //

    /// Persist `node` and its whole subtree
    ///
    /// Validates every node first, then assigns node ids, uuids and audit
    /// timestamps, writes the nodes, and replaces the parent edges of the
    /// subtree, all in one transaction. Edges into `node` itself are kept.
    ///
    /// # Returns
    ///
    /// The stamped node, as written
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Validation` if any node of the subtree is invalid;
    ///   nothing is written in that case
    async fn save(&self, node: TreeNode) -> Result<TreeNode, DatabaseError>;

    /// Delete a single node and its edges; unsaved nodes are ignored
    async fn delete(&self, node: &TreeNode) -> Result<(), DatabaseError>;

    /// Delete several nodes and their edges in one transaction
    async fn delete_many(&self, nodes: &[&TreeNode]) -> Result<(), DatabaseError>;

    /// Delete every node and edge
    async fn delete_all(&self) -> Result<(), DatabaseError>;
}
