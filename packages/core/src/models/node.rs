//! Tree Node Data Structures
//!
//! This module defines the `TreeNode` entity: a named node of an arbitrary-depth
//! tree that is persisted in the graph store.
//!
//! # Ownership
//!
//! A node owns its children. The parent is kept as a [`ParentRef`] snapshot
//! (identifiers and name), never as an owning pointer, so a node value can
//! not become its own descendant and every traversal terminates.
//!
//! # Examples
//!
//! ```rust
//! use treegraph_core::models::TreeNode;
//!
//! let mut root = TreeNode::new("root").with_depth(0);
//! root.add_child(TreeNode::new("Node_1"))
//!     .add_child(TreeNode::new("Node_2"));
//!
//! assert_eq!(root.children().len(), 2);
//! assert!(!root.is_leaf());
//! assert!(root.children().iter().all(|child| child.is_leaf()));
//! assert_eq!(root.children()[0].depth(), Some(1));
//! ```

use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Length of the externally visible node identifier (a v4 UUID without dashes)
pub const UUID_LENGTH: usize = 32;

/// Validation errors for TreeNode operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("You must provide at least a name for a TreeNode")]
    EmptyName,

    #[error("Invalid node uuid: {0}")]
    InvalidUuid(String),
}

/// Snapshot of a node's parent.
///
/// Holds the stable keys of the parent rather than the parent itself; the
/// repository resolves it back to a full node when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub node_id: Option<i64>,
    pub uuid: Option<String>,
    pub name: String,
}

impl ParentRef {
    /// Capture the identity of `node` as a parent reference
    pub fn of(node: &TreeNode) -> Self {
        Self {
            node_id: node.node_id,
            uuid: node.uuid.clone(),
            name: node.name.clone(),
        }
    }
}

/// A named node of the tree.
///
/// # Fields
///
/// - `node_id`: Surrogate key, assigned by the store on first save
/// - `uuid`: 32 character opaque identifier, assigned on first save
/// - `created_date` / `last_modified_date`: Audit timestamps, assigned on save
///
/// Name, parent, children and depth are private: they are kept consistent
/// with each other by [`TreeNode::add_child`] and [`TreeNode::set_name`].
///
/// # Equality
///
/// Two nodes are equal iff `node_id`, `uuid` and `name` are all equal. These
/// fields are mutable, so collections keyed by node should key by `uuid`.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Surrogate key (store sequence)
    pub node_id: Option<i64>,

    /// Opaque external identifier
    pub uuid: Option<String>,

    /// Creation timestamp
    pub created_date: Option<DateTime<Utc>>,

    /// Last modification timestamp
    pub last_modified_date: Option<DateTime<Utc>>,

    name: String,
    parent: Option<ParentRef>,
    children: Vec<TreeNode>,
    depth: Option<u32>,
}

impl TreeNode {
    /// Create a detached, unsaved node with the given name and no depth
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            node_id: None,
            uuid: None,
            created_date: None,
            last_modified_date: None,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            depth: None,
        }
    }

    /// Builder-style depth assignment, used for roots
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node, keeping the children's parent references in sync
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        let parent = ParentRef::of(self);
        for child in &mut self.children {
            child.parent = Some(parent.clone());
        }
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// Name of the parent, or `"null"` for a root
    pub fn parent_name(&self) -> &str {
        self.parent.as_ref().map_or("null", |p| p.name.as_str())
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Distance from the root; `None` while unset
    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    pub fn set_depth(&mut self, depth: Option<u32>) {
        self.depth = depth;
    }

    /// True iff the node has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True iff the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Attach `node` as a child of this node.
    ///
    /// Sets the child's parent to this node and its depth to this node's depth
    /// plus one (an unset depth counts as -1); depths below the child are
    /// re-derived as well. A child equal to an existing one is not inserted
    /// twice.
    pub fn add_child(&mut self, mut node: TreeNode) -> &mut Self {
        node.parent = Some(ParentRef::of(self));
        node.assign_depth(self.depth.map_or(0, |depth| depth + 1));
        if !self.children.contains(&node) {
            self.children.push(node);
        }
        self
    }

    /// Remove the child equal to `node`, if present.
    ///
    /// The removed node keeps its parent reference and depth.
    pub fn remove_child(&mut self, node: &TreeNode) -> &mut Self {
        self.detach_child(node);
        self
    }

    /// Remove the child equal to `node` and hand it back.
    ///
    /// Like [`TreeNode::remove_child`], the returned node still carries its
    /// old parent reference and depth.
    pub fn detach_child(&mut self, node: &TreeNode) -> Option<TreeNode> {
        let position = self.children.iter().position(|child| child == node)?;
        Some(self.children.remove(position))
    }

    /// Depth-first listing starting at this node: the node itself, then the
    /// pre-order sequence of each child in child order.
    pub fn pre_order(&self) -> Vec<&TreeNode> {
        self.iter_pre_order().collect()
    }

    /// Lazy form of [`TreeNode::pre_order`]
    pub fn iter_pre_order(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Find the node with the given uuid in this subtree (self included)
    pub fn find_descendant(&self, uuid: &str) -> Option<&TreeNode> {
        self.iter_pre_order()
            .find(|node| node.uuid.as_deref() == Some(uuid))
    }

    /// Layout marker for list views: `depth + 1` asterisks, empty when unset
    pub fn depth_marker(&self) -> String {
        self.depth
            .map(|depth| "*".repeat(depth as usize + 1))
            .unwrap_or_default()
    }

    /// Check the entity constraints of this node alone
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        // Blank uuids are assigned on first save
        if let Some(uuid) = self.uuid.as_ref().filter(|uuid| !uuid.trim().is_empty()) {
            let well_formed =
                uuid.len() == UUID_LENGTH && uuid.chars().all(|c| c.is_ascii_hexdigit());
            if !well_formed {
                return Err(ValidationError::InvalidUuid(uuid.clone()));
            }
        }

        Ok(())
    }

    /// Check the entity constraints of every node in this subtree
    pub fn validate_subtree(&self) -> Result<(), ValidationError> {
        self.iter_pre_order().try_for_each(TreeNode::validate)
    }

    pub(crate) fn set_parent(&mut self, parent: Option<ParentRef>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<TreeNode> {
        &mut self.children
    }

    fn assign_depth(&mut self, depth: u32) {
        let mut pending = vec![(self, depth)];
        while let Some((node, depth)) = pending.pop() {
            node.depth = Some(depth);
            pending.extend(node.children.iter_mut().map(|child| (child, depth + 1)));
        }
    }
}

// Unlinks the subtree level by level so dropping a deep chain stays flat.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id && self.uuid == other.uuid && self.name == other.name
    }
}

impl Eq for TreeNode {}

impl Hash for TreeNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id.hash(state);
        self.uuid.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node_id = self
            .node_id
            .map_or_else(|| "null".to_string(), |id| id.to_string());
        write!(
            f,
            "TreeNode[nodeId={}, uuid={}, name={}, parent={}, children={}]",
            node_id,
            self.uuid.as_deref().unwrap_or("null"),
            self.name,
            self.parent_name(),
            self.children.len()
        )
    }
}

/// Pre-order iterator over a subtree.
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
