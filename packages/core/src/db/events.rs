//! Domain Events for tree mutations
//!
//! Emitted by `TreeService` after a mutation has been persisted, following the
//! observer pattern so that other parts of the system can react to changes
//! without coupling to the store.
//!
//! Events are delivered over a tokio broadcast channel; slow subscribers may
//! lag and miss events.

use crate::models::TreeNode;

/// Domain events emitted after successful tree mutations
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new root node was created
    NodeCreated(TreeNode),

    /// A node was renamed or had children attached
    NodeUpdated(TreeNode),

    /// A subtree was removed; uuids in pre-order
    NodesDeleted { uuids: Vec<String> },

    /// The root was removed and the whole store emptied
    TreeCleared,
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::NodeCreated(_) => "node:created",
            DomainEvent::NodeUpdated(_) => "node:updated",
            DomainEvent::NodesDeleted { .. } => "node:deleted",
            DomainEvent::TreeCleared => "tree:cleared",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        assert_eq!(
            DomainEvent::NodeCreated(TreeNode::new("root")).event_type(),
            "node:created"
        );
        assert_eq!(
            DomainEvent::NodesDeleted { uuids: vec![] }.event_type(),
            "node:deleted"
        );
        assert_eq!(DomainEvent::TreeCleared.event_type(), "tree:cleared");
    }
}
