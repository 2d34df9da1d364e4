//! SurrealStore Integration Tests
//!
//! Exercises the `TreeNodeRepository` contract against real SurrealDB engines:
//! the impermanent `mem://` engine for most tests and an embedded RocksDB
//! database in a temporary directory.
//!
//! ## Test Coverage
//! - Audit stamping on first and repeated saves
//! - Validation before any write
//! - Lookups by uuid, name, parent and root
//! - Subtree rewrites when children move
//! - Bulk and full deletes

#[cfg(test)]
mod surreal_store_tests {
    use anyhow::Result;
    use tempfile::TempDir;
    use treegraph_core::db::{DatabaseConfig, DatabaseError, SurrealStore, TreeNodeRepository};
    use treegraph_core::models::{TreeNode, ValidationError, UUID_LENGTH};

    async fn create_test_store() -> Result<SurrealStore> {
        Ok(SurrealStore::in_memory().await?)
    }

    /// root -> (a -> (a1), b)
    fn sample_tree() -> TreeNode {
        let mut a = TreeNode::new("a");
        a.add_child(TreeNode::new("a1"));
        let mut root = TreeNode::new("root").with_depth(0);
        root.add_child(a).add_child(TreeNode::new("b"));
        root
    }

    #[tokio::test]
    async fn test_save_stamps_identity_and_dates() -> Result<()> {
        let store = create_test_store().await?;

        let root = store.save(TreeNode::new("root").with_depth(0)).await?;

        let uuid = root.uuid.clone().expect("uuid assigned");
        assert_eq!(uuid.len(), UUID_LENGTH);
        assert!(uuid.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(root.node_id.is_some());
        assert!(root.created_date.is_some());
        assert_eq!(root.created_date, root.last_modified_date);

        Ok(())
    }

    #[tokio::test]
    async fn test_second_save_keeps_uuid_and_created_date() -> Result<()> {
        let store = create_test_store().await?;
        let first = store.save(TreeNode::new("root").with_depth(0)).await?;

        let mut loaded = store
            .find_by_uuid(first.uuid.as_deref().unwrap())
            .await?
            .expect("saved node is found");
        loaded.set_name("renamed");
        let second = store.save(loaded).await?;

        assert_eq!(second.uuid, first.uuid);
        assert_eq!(second.node_id, first.node_id);
        assert_eq!(second.created_date, first.created_date);
        assert!(second.last_modified_date > first.last_modified_date);
        assert_eq!(store.count().await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_name_writes_nothing() -> Result<()> {
        let store = create_test_store().await?;

        let mut root = TreeNode::new("root").with_depth(0);
        root.add_child(TreeNode::new(""));
        let result = store.save(root).await;

        assert!(matches!(
            result,
            Err(DatabaseError::Validation(ValidationError::EmptyName))
        ));
        assert_eq!(store.count().await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_subtree_round_trip() -> Result<()> {
        let store = create_test_store().await?;
        let saved = store.save(sample_tree()).await?;
        assert_eq!(store.count().await?, 4);

        let root = store.find_root().await?.expect("root exists");
        assert_eq!(root, saved);
        assert!(root.is_root());

        let listing: Vec<(String, Option<u32>)> = root
            .pre_order()
            .iter()
            .map(|n| (n.name().to_string(), n.depth()))
            .collect();
        assert_eq!(
            listing,
            vec![
                ("root".to_string(), Some(0)),
                ("a".to_string(), Some(1)),
                ("a1".to_string(), Some(2)),
                ("b".to_string(), Some(1)),
            ]
        );

        let a = &root.children()[0];
        assert_eq!(a.parent_name(), "root");
        assert_eq!(a.children()[0].parent_name(), "a");

        Ok(())
    }

    #[tokio::test]
    async fn test_lookups() -> Result<()> {
        let store = create_test_store().await?;
        let root = store.save(sample_tree()).await?;

        let a = store.find_by_name("a").await?;
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].parent_name(), "root");
        assert_eq!(a[0].children().len(), 1);

        assert!(store.find_by_name("missing").await?.is_empty());
        assert!(store
            .find_by_uuid("0123456789abcdef0123456789abcdef")
            .await?
            .is_none());

        let children = store.find_by_parent(&root).await?;
        let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);

        assert!(store.find_by_parent(&TreeNode::new("unsaved")).await?.is_empty());

        let all = store.find_all().await?;
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].name(), "root");
        assert_eq!(all[0].pre_order().len(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_names_are_allowed() -> Result<()> {
        let store = create_test_store().await?;
        let mut root = TreeNode::new("root").with_depth(0);
        root.add_child(TreeNode::new("twin"));
        let mut root = store.save(root).await?;

        // Unsaved nodes with equal names are equal, saved ones are not
        root.add_child(TreeNode::new("twin"));
        let root = store.save(root).await?;

        assert_eq!(root.children().len(), 2);
        assert_eq!(store.find_by_name("twin").await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_children_load_after_repeated_parent_saves() -> Result<()> {
        let store = create_test_store().await?;
        let root = store.save(TreeNode::new("root").with_depth(0)).await?;
        let uuid = root.uuid.clone().expect("uuid assigned");

        for name in ["first", "second", "third"] {
            let mut parent = store.find_by_uuid(&uuid).await?.expect("root exists");
            parent.add_child(TreeNode::new(name));
            store.save(parent).await?;
        }

        let root = store.find_by_uuid(&uuid).await?.expect("root exists");
        let names: Vec<&str> = root.children().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);

        let first = store
            .find_by_uuid(root.children()[0].uuid.as_deref().unwrap())
            .await?
            .expect("child exists");
        assert_eq!(first.parent().map(|p| p.name.as_str()), Some("root"));
        assert_eq!(store.find_by_parent(&root).await?.len(), 3);
        assert_eq!(store.find_root().await?.map(|n| n.uuid.clone()), Some(Some(uuid)));

        Ok(())
    }

    #[tokio::test]
    async fn test_saving_child_keeps_its_parent_edge() -> Result<()> {
        let store = create_test_store().await?;
        let root = store.save(sample_tree()).await?;

        let mut b = root.children()[1].clone();
        b.set_name("b-renamed");
        store.save(b).await?;

        let root = store.find_root().await?.expect("root exists");
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[1].name(), "b-renamed");

        Ok(())
    }

    #[tokio::test]
    async fn test_removed_child_edge_is_dropped_on_save() -> Result<()> {
        let store = create_test_store().await?;
        let mut root = store.save(sample_tree()).await?;

        let b = root.children()[1].clone();
        root.remove_child(&b);
        store.save(root).await?;

        let root = store.find_root().await?.expect("oldest root");
        assert_eq!(root.name(), "root");
        assert_eq!(root.children().len(), 1);

        // The detached node is still stored, now without a parent
        let orphan = store
            .find_by_uuid(b.uuid.as_deref().unwrap())
            .await?
            .expect("node kept");
        assert!(orphan.is_root());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_many_removes_nodes_and_edges() -> Result<()> {
        let store = create_test_store().await?;
        let root = store.save(sample_tree()).await?;

        let a = &root.children()[0];
        store.delete_many(&a.pre_order()).await?;

        assert_eq!(store.count().await?, 2);
        let root = store.find_root().await?.expect("root exists");
        let names: Vec<&str> = root.pre_order().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["root", "b"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_single_and_all() -> Result<()> {
        let store = create_test_store().await?;
        let root = store.save(sample_tree()).await?;

        store.delete(&root.children()[1]).await?;
        assert_eq!(store.count().await?, 3);

        // Unsaved nodes are ignored
        store.delete(&TreeNode::new("unsaved")).await?;
        assert_eq!(store.count().await?, 3);

        store.delete_all().await?;
        assert_eq!(store.count().await?, 0);
        assert!(store.find_root().await?.is_none());
        assert!(store.find_all().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_node_ids_increase_across_saves() -> Result<()> {
        let store = create_test_store().await?;
        let first = store.save(TreeNode::new("first").with_depth(0)).await?;
        let second = store.save(TreeNode::new("second").with_depth(0)).await?;

        assert!(second.node_id > first.node_id);
        assert_eq!(store.find_root().await?.map(|n| n.node_id), Some(first.node_id));

        Ok(())
    }

    #[tokio::test]
    async fn test_embedded_store_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = DatabaseConfig::embedded(temp_dir.path().join("tree.db"));
        let store = SurrealStore::connect(&config).await?;

        let saved = store.save(sample_tree()).await?;
        let uuid = saved.uuid.clone().expect("uuid assigned");

        let root = store.find_by_uuid(&uuid).await?.expect("root persisted");
        assert_eq!(root.pre_order().len(), 4);
        assert!(temp_dir.path().join("tree.db").exists());

        Ok(())
    }

    #[tokio::test]
    async fn test_unsupported_endpoint_is_rejected() {
        let result = SurrealStore::connect(&DatabaseConfig::new("ftp://localhost")).await;
        assert!(matches!(result, Err(DatabaseError::UnsupportedEndpoint(_))));
    }
}
