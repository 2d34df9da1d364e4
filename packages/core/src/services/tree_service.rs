//! Tree Service - Tree Operations
//!
//! This module provides the business logic layer for the tree:
//!
//! - Creating a new tree (root node with depth 0)
//! - Attaching child nodes below an existing node
//! - Renaming nodes from submitted forms
//! - Deleting a node together with its subtree
//! - Pre-order listings for display
//!
//! Every mutation is persisted through a [`TreeNodeRepository`] and followed
//! by a [`DomainEvent`] on the service's broadcast channel.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use treegraph_core::db::SurrealStore;
//! use treegraph_core::services::TreeService;
//! use treegraph_core::models::TreeNode;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SurrealStore::in_memory().await?);
//!     let service = TreeService::new(store);
//!
//!     let root = service.create_tree("root").await?;
//!     let root_uuid = root.uuid.clone().unwrap_or_default();
//!     let root = service.add_node(Some(TreeNode::new("child")), &root_uuid).await?;
//!
//!     for node in service.get_preordered(&root) {
//!         println!("{} {}", node.depth_marker(), node.name());
//!     }
//!     Ok(())
//! }
//! ```

use crate::db::{DomainEvent, TreeNodeRepository};
use crate::models::{TreeNode, TreeNodeForm};
use crate::services::error::TreeServiceError;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, instrument};

/// Broadcast channel capacity for domain events
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Core service for tree operations
#[derive(Clone)]
pub struct TreeService {
    repository: Arc<dyn TreeNodeRepository>,
    event_tx: broadcast::Sender<DomainEvent>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl TreeService {
    pub fn new(repository: Arc<dyn TreeNodeRepository>) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);
        Self {
            repository,
            event_tx,
        }
    }

    /// Subscribe to domain events emitted after successful mutations
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use treegraph_core::services::TreeService;
    /// # use treegraph_core::db::DomainEvent;
    /// # async fn example(service: TreeService) {
    /// let mut rx = service.subscribe_to_events();
    /// while let Ok(event) = rx.recv().await {
    ///     println!("{}", event.event_type());
    /// }
    /// # }
    /// ```
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    // No subscribers is not an error
    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Create and persist a new root node with depth 0
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if `root_name` is empty
    #[instrument(skip(self))]
    pub async fn create_tree(&self, root_name: &str) -> Result<TreeNode, TreeServiceError> {
        let root = TreeNode::new(root_name).with_depth(0);
        let root = self.repository.save(root).await?;
        debug!("Created new Tree. Root node: {}", root.name());

        self.emit_event(DomainEvent::NodeCreated(root.clone()));
        Ok(root)
    }

    /// Attach `node` below the node identified by `parent_uuid` and persist
    /// the parent's subtree.
    ///
    /// A node that is already stored is moved: its previous parent edge is
    /// replaced.
    ///
    /// # Returns
    ///
    /// The saved parent, with `node` among its children
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `node` is absent, `parent_uuid` is blank or
    ///   unknown, or the node is the parent itself or one of its ancestors
    /// - `ValidationFailed` if the node has an empty name
    #[instrument(skip(self, node))]
    pub async fn add_node(
        &self,
        node: Option<TreeNode>,
        parent_uuid: &str,
    ) -> Result<TreeNode, TreeServiceError> {
        let node = node.ok_or_else(|| {
            TreeServiceError::invalid_argument("node is NULL. Unable to add new node")
        })?;
        if is_blank(parent_uuid) {
            return Err(TreeServiceError::invalid_argument(format!(
                "parentUuid is [{}]. Unable to add new node",
                parent_uuid
            )));
        }

        let mut parent = self
            .repository
            .find_by_uuid(parent_uuid)
            .await?
            .ok_or_else(|| {
                TreeServiceError::invalid_argument(format!(
                    "No node for uuid [{}] found. Unable to add new node",
                    parent_uuid
                ))
            })?;

        self.ensure_not_ancestor(&node, parent_uuid).await?;

        parent.add_child(node);
        let parent = self.repository.save(parent).await?;
        debug!("New node added below {}", parent);

        self.emit_event(DomainEvent::NodeUpdated(parent.clone()));
        Ok(parent)
    }

    /// Reject attaching a stored node below itself or below its own subtree
    async fn ensure_not_ancestor(
        &self,
        node: &TreeNode,
        parent_uuid: &str,
    ) -> Result<(), TreeServiceError> {
        let Some(node_uuid) = node.uuid.as_deref().filter(|uuid| !is_blank(uuid)) else {
            return Ok(());
        };

        let cyclic = if node_uuid == parent_uuid || node.find_descendant(parent_uuid).is_some() {
            true
        } else {
            self.repository
                .find_by_uuid(node_uuid)
                .await?
                .is_some_and(|stored| stored.find_descendant(parent_uuid).is_some())
        };

        if cyclic {
            return Err(TreeServiceError::invalid_argument(format!(
                "Node [{}] contains node [{}]. Unable to add new node",
                node_uuid, parent_uuid
            )));
        }
        Ok(())
    }

    /// Rename the node identified by `node_uuid` from a submitted form
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `form` is absent or `node_uuid` is blank or unknown
    /// - `ValidationFailed` if the submitted name is empty
    #[instrument(skip(self, form))]
    pub async fn update_node(
        &self,
        form: Option<&TreeNodeForm>,
        node_uuid: &str,
    ) -> Result<TreeNode, TreeServiceError> {
        let form = form.ok_or_else(|| {
            TreeServiceError::invalid_argument("form is NULL. Unable to update node")
        })?;
        if is_blank(node_uuid) {
            return Err(TreeServiceError::invalid_argument(format!(
                "nodeUuid is [{}]. Unable to update node",
                node_uuid
            )));
        }

        let mut node = self
            .repository
            .find_by_uuid(node_uuid)
            .await?
            .ok_or_else(|| {
                TreeServiceError::invalid_argument(format!(
                    "Invalid nodeUuid {}. No node to update found",
                    node_uuid
                ))
            })?;

        node.set_name(form.name());
        let node = self.repository.save(node).await?;
        debug!("Node updated: {}", node);

        self.emit_event(DomainEvent::NodeUpdated(node.clone()));
        Ok(node)
    }

    /// Delete the node identified by `node_uuid` and its whole subtree.
    ///
    /// Deleting the root empties the store.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `node_uuid` is blank or unknown
    #[instrument(skip(self))]
    pub async fn delete_node(&self, node_uuid: &str) -> Result<(), TreeServiceError> {
        if is_blank(node_uuid) {
            return Err(TreeServiceError::invalid_argument(format!(
                "nodeUuid is [{}]. Unable to delete node",
                node_uuid
            )));
        }

        let node = self
            .repository
            .find_by_uuid(node_uuid)
            .await?
            .ok_or_else(|| {
                TreeServiceError::invalid_argument(format!(
                    "Invalid nodeUuid {}. No node to delete found",
                    node_uuid
                ))
            })?;

        if node.is_root() {
            self.repository.delete_all().await?;
            self.emit_event(DomainEvent::TreeCleared);
        } else {
            // Removing the nodes also removes the edge from the parent
            let sub_nodes = self.get_preordered(&node);
            self.repository.delete_many(&sub_nodes).await?;

            let uuids = sub_nodes
                .iter()
                .filter_map(|n| n.uuid.clone())
                .collect();
            self.emit_event(DomainEvent::NodesDeleted { uuids });
        }

        debug!("Node with uuid {} and sub nodes deleted", node_uuid);
        Ok(())
    }

    /// Pre-order listing of `start` and its subtree
    pub fn get_preordered<'a>(&self, start: &'a TreeNode) -> Vec<&'a TreeNode> {
        start.pre_order()
    }

    /// The root of the tree, if one was created
    pub async fn get_root_node(&self) -> Result<Option<TreeNode>, TreeServiceError> {
        Ok(self.repository.find_root().await?)
    }

    pub async fn find_by_uuid(&self, uuid: &str) -> Result<Option<TreeNode>, TreeServiceError> {
        Ok(self.repository.find_by_uuid(uuid).await?)
    }

    pub async fn find_all(&self) -> Result<Vec<TreeNode>, TreeServiceError> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn find_by_parent(&self, parent: &TreeNode) -> Result<Vec<TreeNode>, TreeServiceError> {
        Ok(self.repository.find_by_parent(parent).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<TreeNode>, TreeServiceError> {
        Ok(self.repository.find_by_name(name).await?)
    }

    /// Number of stored nodes, without loading any of them
    pub async fn count(&self) -> Result<usize, TreeServiceError> {
        Ok(self.repository.count().await?)
    }
}
