//! Audit stamping applied to every node before it is written.
//!
//! New nodes (blank uuid) receive a creation date and a fresh uuid; every
//! written node receives a new last-modified date. Node ids come from the
//! store sequence and are handed in by the caller.

use crate::models::{ParentRef, TreeNode};
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// Generate a 32 character node identifier (v4 UUID without dashes)
pub fn generate_uuid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Number of nodes in the subtree that still need a node id
pub(crate) fn missing_node_ids(node: &TreeNode) -> usize {
    node.iter_pre_order()
        .filter(|n| n.node_id.is_none())
        .count()
}

/// Stamp `node` and its whole subtree.
///
/// `node_ids` must yield at least [`missing_node_ids`] values. Children's
/// parent references are refreshed so that they carry the identifiers the
/// parent was just given.
pub(crate) fn stamp_subtree(
    node: &mut TreeNode,
    node_ids: &mut impl Iterator<Item = i64>,
    now: DateTime<Utc>,
) {
    // Children go on the stack reversed so ids are handed out in pre-order
    let mut pending = vec![node];
    while let Some(current) = pending.pop() {
        stamp(current, node_ids, now);

        let parent = ParentRef::of(current);
        for child in current.children_mut().iter_mut().rev() {
            child.set_parent(Some(parent.clone()));
            pending.push(child);
        }
    }
}

fn stamp(node: &mut TreeNode, node_ids: &mut impl Iterator<Item = i64>, now: DateTime<Utc>) {
    if node.node_id.is_none() {
        node.node_id = node_ids.next();
    }

    let is_new = node.uuid.as_deref().map_or(true, |uuid| uuid.trim().is_empty());
    if is_new {
        let uuid = generate_uuid();
        debug!("UUID created. [{}]", uuid);
        node.created_date = Some(now);
        node.uuid = Some(uuid);
    }

    node.last_modified_date = Some(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UUID_LENGTH;

    #[test]
    fn test_generated_uuid_is_32_hex_chars() {
        let uuid = generate_uuid();
        assert_eq!(uuid.len(), UUID_LENGTH);
        assert!(uuid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(uuid, generate_uuid());
    }

    #[test]
    fn test_stamp_new_subtree() {
        let mut root = TreeNode::new("root").with_depth(0);
        root.add_child(TreeNode::new("child"));
        assert_eq!(missing_node_ids(&root), 2);

        let now = Utc::now();
        stamp_subtree(&mut root, &mut (10..), now);

        assert_eq!(root.node_id, Some(10));
        assert_eq!(root.created_date, Some(now));
        assert_eq!(root.last_modified_date, Some(now));

        let child = &root.children()[0];
        assert_eq!(child.node_id, Some(11));
        assert!(child.uuid.is_some());
        assert_eq!(child.parent().and_then(|p| p.uuid.clone()), root.uuid);
        assert_eq!(child.parent().and_then(|p| p.node_id), Some(10));
    }

    #[test]
    fn test_restamp_keeps_identity_and_creation_date() {
        let mut node = TreeNode::new("node");
        let first = Utc::now();
        stamp_subtree(&mut node, &mut (1..), first);
        let uuid = node.uuid.clone();

        let later = first + chrono::Duration::seconds(5);
        stamp_subtree(&mut node, &mut std::iter::empty(), later);

        assert_eq!(node.node_id, Some(1));
        assert_eq!(node.uuid, uuid);
        assert_eq!(node.created_date, Some(first));
        assert_eq!(node.last_modified_date, Some(later));
    }
}
