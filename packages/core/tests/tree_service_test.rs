//! Tree Scenario Tests
//!
//! End-to-end scenarios through the public `TreeService` API, backed by an
//! impermanent SurrealDB store.

#[cfg(test)]
mod tree_scenarios {
    use anyhow::Result;
    use std::sync::Arc;
    use treegraph_core::db::{SurrealStore, TreeNodeRepository};
    use treegraph_core::{TreeNode, TreeService};

    async fn create_test_service() -> Result<(TreeService, Arc<SurrealStore>)> {
        let store = Arc::new(SurrealStore::in_memory().await?);
        Ok((TreeService::new(store.clone()), store))
    }

    #[tokio::test]
    async fn test_readded_child_gets_fresh_depth() -> Result<()> {
        let mut root = TreeNode::new("root").with_depth(0);
        let mut deep = TreeNode::new("deep").with_depth(7);
        deep.add_child(TreeNode::new("below"));

        root.add_child(deep.clone());
        root.remove_child(&deep);
        root.add_child(deep);

        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].depth(), Some(1));
        assert_eq!(root.children()[0].children()[0].depth(), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn test_equality_needs_all_identity_fields() -> Result<()> {
        let (service, _store) = create_test_service().await?;
        let saved = service.create_tree("root").await?;

        let mut other = saved.clone();
        assert_eq!(other, saved);

        other.node_id = other.node_id.map(|id| id + 1);
        assert_ne!(other, saved);
        other.node_id = saved.node_id;

        other.uuid = Some("ffffffffffffffffffffffffffffffff".to_string());
        assert_ne!(other, saved);
        other.uuid = saved.uuid.clone();

        other.set_name("changed");
        assert_ne!(other, saved);
        other.set_name("root");
        assert_eq!(other, saved);

        Ok(())
    }

    #[tokio::test]
    async fn test_preorder_of_stored_tree() -> Result<()> {
        let (service, _store) = create_test_service().await?;
        let root = service.create_tree("root").await?;
        let root_uuid = root.uuid.clone().unwrap_or_default();

        let root = service.add_node(Some(TreeNode::new("Node_1")), &root_uuid).await?;
        let node_1 = root.children()[0].uuid.clone().unwrap_or_default();
        service.add_node(Some(TreeNode::new("Node_1_1")), &node_1).await?;
        service.add_node(Some(TreeNode::new("Node_2")), &root_uuid).await?;

        let root = service.get_root_node().await?.expect("root exists");
        let listing: Vec<String> = service
            .get_preordered(&root)
            .iter()
            .map(|n| format!("{}{}", n.depth_marker(), n.name()))
            .collect();

        assert_eq!(listing, vec!["*root", "**Node_1", "***Node_1_1", "**Node_2"]);
        assert!(std::ptr::eq(service.get_preordered(&root)[0], &root));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_node_with_two_descendants() -> Result<()> {
        let (service, store) = create_test_service().await?;
        let root = service.create_tree("root").await?;
        let root_uuid = root.uuid.clone().unwrap_or_default();

        let mut doomed = TreeNode::new("doomed");
        doomed
            .add_child(TreeNode::new("d1"))
            .add_child(TreeNode::new("d2"));
        service.add_node(Some(TreeNode::new("sibling")), &root_uuid).await?;
        let root = service.add_node(Some(doomed), &root_uuid).await?;
        let before = store.count().await?;

        let doomed_uuid = root.children()[1].uuid.clone().unwrap_or_default();
        service.delete_node(&doomed_uuid).await?;

        assert_eq!(store.count().await?, before - 3);
        for name in ["doomed", "d1", "d2"] {
            assert!(service.find_by_name(name).await?.is_empty());
        }
        assert_eq!(service.find_by_name("sibling").await?.len(), 1);
        assert!(service.get_root_node().await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_root_clears_large_tree() -> Result<()> {
        let (service, store) = create_test_service().await?;
        let root = service.create_tree("root").await?;
        let root_uuid = root.uuid.clone().unwrap_or_default();

        let mut branch = TreeNode::new("branch");
        for i in 0..20 {
            let mut child = TreeNode::new(format!("child-{}", i));
            child.add_child(TreeNode::new(format!("grandchild-{}", i)));
            branch.add_child(child);
        }
        service.add_node(Some(branch), &root_uuid).await?;
        assert_eq!(store.count().await?, 42);

        service.delete_node(&root_uuid).await?;

        assert_eq!(store.count().await?, 0);

        Ok(())
    }
}
