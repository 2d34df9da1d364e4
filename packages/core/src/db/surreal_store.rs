//! SurrealStore - TreeNodeRepository Implementation for SurrealDB
//!
//! This module implements the `TreeNodeRepository` trait on top of SurrealDB,
//! storing the tree as a graph.
//!
//! # Graph Layout
//!
//! 1. **`tree_node` table** - One record per node, keyed by the node uuid
//! 2. **`is_parent_of` relation** - One edge per parent/child pair (`in` = parent)
//! 3. **`node_sequence:tree_node`** - Counter handing out surrogate node ids
//!
//! # Engines
//!
//! The engine is chosen at runtime from the endpoint URL (see
//! [`DatabaseConfig`]): `mem://` (impermanent), `rocksdb://` (embedded) or
//! `http://` (remote server).
//!
//! # Examples
//!
//! ```rust,no_run
//! use treegraph_core::db::{DatabaseConfig, SurrealStore, TreeNodeRepository};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SurrealStore::connect(&DatabaseConfig::embedded("./data/tree.db")).await?;
//!
//!     if let Some(root) = store.find_root().await? {
//!         println!("{} nodes below {}", root.pre_order().len() - 1, root.name());
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::db::audit::{missing_node_ids, stamp_subtree};
use crate::db::{DatabaseConfig, DatabaseError, Engine, TreeNodeRepository};
use crate::models::{ParentRef, TreeNode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::{RecordId, Surreal};
use tracing::{debug, info, instrument, warn};

const NODE_TABLE: &str = "tree_node";

/// Internal struct matching the `tree_node` record layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredNode {
    node_id: i64,
    uuid: String,
    name: String,
    #[serde(default)]
    depth: Option<i64>,
    created_date: String,
    last_modified_date: String,
}

/// Parent/child uuid pair read from an `is_parent_of` edge
#[derive(Debug, Deserialize)]
struct StoredEdge {
    parent: Option<String>,
    child: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

impl From<StoredNode> for TreeNode {
    fn from(stored: StoredNode) -> Self {
        let mut node = TreeNode::new(stored.name);
        node.node_id = Some(stored.node_id);
        node.uuid = Some(stored.uuid);
        node.created_date = parse_timestamp(&stored.created_date);
        node.last_modified_date = parse_timestamp(&stored.last_modified_date);
        node.set_depth(stored.depth.and_then(|depth| u32::try_from(depth).ok()));
        node
    }
}

impl From<&StoredNode> for ParentRef {
    fn from(stored: &StoredNode) -> Self {
        Self {
            node_id: Some(stored.node_id),
            uuid: Some(stored.uuid.clone()),
            name: stored.name.clone(),
        }
    }
}

impl TryFrom<&TreeNode> for StoredNode {
    type Error = DatabaseError;

    fn try_from(node: &TreeNode) -> Result<Self, Self::Error> {
        let (Some(node_id), Some(uuid)) = (node.node_id, node.uuid.clone()) else {
            return Err(DatabaseError::sequence_failed(format!(
                "node '{}' was not stamped before writing",
                node.name()
            )));
        };
        let created = node.created_date.unwrap_or_else(Utc::now);
        let modified = node.last_modified_date.unwrap_or(created);

        Ok(Self {
            node_id,
            uuid,
            name: node.name().to_string(),
            depth: node.depth().map(i64::from),
            created_date: created.to_rfc3339(),
            last_modified_date: modified.to_rfc3339(),
        })
    }
}

fn record_id(uuid: &str) -> RecordId {
    RecordId::from_table_key(NODE_TABLE, uuid)
}

/// Build a node with its subtree from records gathered breadth-first.
///
/// `descendants` pairs each record with the index of its parent, where 0 is
/// `root` and `i` is `descendants[i - 1]`; parents always precede children.
fn assemble(
    root: StoredNode,
    descendants: Vec<(StoredNode, usize)>,
    parent: Option<ParentRef>,
) -> TreeNode {
    let mut root: TreeNode = root.into();
    let mut parents = Vec::with_capacity(descendants.len());
    let mut slots: Vec<Option<TreeNode>> = Vec::with_capacity(descendants.len());
    for (record, parent_index) in descendants {
        slots.push(Some(record.into()));
        parents.push(parent_index);
    }

    // Walk backwards so every node is complete before it moves into its parent.
    // Children arrive in reverse and are flipped once their node is complete.
    for index in (0..slots.len()).rev() {
        let Some(mut child) = slots[index].take() else {
            continue;
        };
        child.children_mut().reverse();

        let target = match parents[index] {
            0 => Some(&mut root),
            slot => slots.get_mut(slot - 1).and_then(Option::as_mut),
        };
        if let Some(target) = target {
            child.set_parent(Some(ParentRef::of(target)));
            target.children_mut().push(child);
        }
    }

    root.children_mut().reverse();
    root.set_parent(parent);
    root
}

/// All records and edges, read once, for materializing many nodes
struct GraphSnapshot {
    records: HashMap<String, StoredNode>,
    order: Vec<String>,
    children: HashMap<String, Vec<String>>,
    parents: HashMap<String, String>,
}

impl GraphSnapshot {
    fn new(records: Vec<StoredNode>, edges: Vec<StoredEdge>) -> Self {
        let order: Vec<String> = records.iter().map(|r| r.uuid.clone()).collect();
        let records: HashMap<String, StoredNode> =
            records.into_iter().map(|r| (r.uuid.clone(), r)).collect();

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut parents = HashMap::new();
        for edge in edges {
            let (Some(parent), Some(child)) = (edge.parent, edge.child) else {
                continue;
            };
            children.entry(parent.clone()).or_default().push(child.clone());
            parents.insert(child, parent);
        }
        for list in children.values_mut() {
            list.sort_by_key(|uuid| records.get(uuid).map(|r| r.node_id));
        }

        Self {
            records,
            order,
            children,
            parents,
        }
    }

    fn materialize(&self, uuid: &str) -> Option<TreeNode> {
        let root = self.records.get(uuid)?.clone();
        let parent = self
            .parents
            .get(uuid)
            .and_then(|p| self.records.get(p))
            .map(ParentRef::from);

        let mut visited = HashSet::from([uuid.to_string()]);
        let mut frontier = vec![uuid.to_string()];
        let mut descendants = Vec::new();
        let mut cursor = 0;
        while cursor < frontier.len() {
            let current = frontier[cursor].clone();
            for child in self.children.get(&current).into_iter().flatten() {
                let Some(record) = self.records.get(child) else {
                    continue;
                };
                if !visited.insert(child.clone()) {
                    warn!("Node {} reached twice below {}, skipping", child, uuid);
                    continue;
                }
                descendants.push((record.clone(), cursor));
                frontier.push(child.clone());
            }
            cursor += 1;
        }

        Some(assemble(root, descendants, parent))
    }
}

/// SurrealStore implements TreeNodeRepository for SurrealDB
#[derive(Clone)]
pub struct SurrealStore {
    db: Arc<Surreal<Any>>,
}

impl SurrealStore {
    /// Connect to the configured endpoint and initialize the schema
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint scheme is not supported
    /// - The connection or sign-in fails
    /// - Schema initialization fails
    #[instrument(skip(config), fields(endpoint = %config.endpoint))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let engine = config.engine()?;

        let db = any::connect(config.endpoint.as_str())
            .await
            .map_err(|e| DatabaseError::connection_failed(&config.endpoint, e))?;

        if let (Engine::Http, Some(credentials)) = (engine, &config.credentials) {
            db.signin(Root {
                username: &credentials.username,
                password: &credentials.password,
            })
            .await
            .map_err(|e| DatabaseError::connection_failed(&config.endpoint, e))?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        Self::initialize_schema(&db).await?;
        info!(
            "Connected to {:?} graph store {}/{}",
            engine, config.namespace, config.database
        );

        Ok(Self { db: Arc::new(db) })
    }

    /// Impermanent store, used by tests
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    async fn initialize_schema(db: &Surreal<Any>) -> Result<(), DatabaseError> {
        db.query(
            "
            DEFINE TABLE IF NOT EXISTS tree_node SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS tree_node_uuid ON TABLE tree_node FIELDS uuid UNIQUE;
            DEFINE INDEX IF NOT EXISTS tree_node_name ON TABLE tree_node FIELDS name;
            DEFINE TABLE IF NOT EXISTS is_parent_of SCHEMALESS TYPE RELATION;
            ",
        )
        .await?
        .check()?;

        Ok(())
    }

    /// Reserve `count` consecutive node ids from the store sequence
    async fn allocate_node_ids(
        &self,
        count: usize,
    ) -> Result<std::ops::RangeInclusive<i64>, DatabaseError> {
        let count = i64::try_from(count)
            .map_err(|_| DatabaseError::sequence_failed("too many nodes in one save"))?;

        let mut response = self
            .db
            .query("UPSERT node_sequence:tree_node SET current += $count RETURN VALUE current;")
            .bind(("count", count))
            .await?
            .check()?;

        let last: Option<i64> = response.take(0)?;
        let last = last.ok_or_else(|| DatabaseError::sequence_failed("no value returned"))?;

        Ok((last - count + 1)..=last)
    }

    async fn fetch_record(&self, uuid: &str) -> Result<Option<StoredNode>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT * FROM tree_node WHERE uuid = $uuid LIMIT 1;")
            .bind(("uuid", uuid.to_string()))
            .await?;

        let records: Vec<StoredNode> = response.take(0)?;
        Ok(records.into_iter().next())
    }

    async fn fetch_parent(&self, uuid: &str) -> Result<Option<StoredNode>, DatabaseError> {
        let mut response = self
            .db
            .query(
                "SELECT * FROM tree_node
                 WHERE id IN (SELECT VALUE in FROM is_parent_of WHERE out = $child);",
            )
            .bind(("child", record_id(uuid)))
            .await?;

        let records: Vec<StoredNode> = response.take(0)?;
        Ok(records.into_iter().min_by_key(|record| record.node_id))
    }

    /// Children of `uuid` in insertion order
    ///
    /// Ordering happens here: combining `ORDER BY` with an `IN` subquery
    /// drops every row.
    async fn fetch_children(&self, uuid: &str) -> Result<Vec<StoredNode>, DatabaseError> {
        let mut response = self
            .db
            .query(
                "SELECT * FROM tree_node
                 WHERE id IN (SELECT VALUE out FROM is_parent_of WHERE in = $parent);",
            )
            .bind(("parent", record_id(uuid)))
            .await?;

        let mut records: Vec<StoredNode> = response.take(0)?;
        records.sort_by_key(|record| record.node_id);
        Ok(records)
    }

    async fn fetch_all_records(&self) -> Result<Vec<StoredNode>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT * FROM tree_node ORDER BY nodeId;")
            .await?;

        Ok(response.take(0)?)
    }

    async fn fetch_all_edges(&self) -> Result<Vec<StoredEdge>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT in.uuid AS parent, out.uuid AS child FROM is_parent_of;")
            .await?;

        Ok(response.take(0)?)
    }

    /// Load the parent reference and the whole subtree of `record`
    async fn materialize(&self, record: StoredNode) -> Result<TreeNode, DatabaseError> {
        let parent = self
            .fetch_parent(&record.uuid)
            .await?
            .as_ref()
            .map(ParentRef::from);

        let mut visited = HashSet::from([record.uuid.clone()]);
        let mut frontier = vec![record.uuid.clone()];
        let mut descendants = Vec::new();
        let mut cursor = 0;
        while cursor < frontier.len() {
            let current = frontier[cursor].clone();
            for child in self.fetch_children(&current).await? {
                if !visited.insert(child.uuid.clone()) {
                    warn!(
                        "Node {} reached twice below {}, skipping",
                        child.uuid, record.uuid
                    );
                    continue;
                }
                frontier.push(child.uuid.clone());
                descendants.push((child, cursor));
            }
            cursor += 1;
        }

        Ok(assemble(record, descendants, parent))
    }

    async fn materialize_all(
        &self,
        records: Vec<StoredNode>,
    ) -> Result<Vec<TreeNode>, DatabaseError> {
        let mut nodes = Vec::with_capacity(records.len());
        for record in records {
            nodes.push(self.materialize(record).await?);
        }
        Ok(nodes)
    }

    /// Write every node of `node`'s subtree and replace the subtree's edges
    async fn write_subtree(&self, node: &TreeNode) -> Result<(), DatabaseError> {
        let nodes = node.pre_order();
        let positions: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .filter_map(|(index, n)| n.uuid.as_deref().map(|uuid| (uuid, index)))
            .collect();

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for index in 0..nodes.len() {
            sql.push_str(&format!("UPSERT $record_{index} CONTENT $content_{index};\n"));
            // Edges into the top node belong to its parent and are kept
            if index == 0 {
                sql.push_str(&format!(
                    "DELETE is_parent_of WHERE in = $record_{index};\n"
                ));
            } else {
                sql.push_str(&format!(
                    "DELETE is_parent_of WHERE in = $record_{index} OR out = $record_{index};\n"
                ));
            }
        }
        for (index, parent) in nodes.iter().enumerate() {
            for child in parent.children() {
                let Some(child_index) = child.uuid.as_deref().and_then(|u| positions.get(u))
                else {
                    continue;
                };
                sql.push_str(&format!(
                    "RELATE $record_{index}->is_parent_of->$record_{child_index};\n"
                ));
            }
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.db.query(sql);
        for (index, n) in nodes.iter().enumerate() {
            let stored = StoredNode::try_from(*n)?;
            query = query
                .bind((format!("record_{index}"), record_id(&stored.uuid)))
                .bind((format!("content_{index}"), stored));
        }
        query.await?.check()?;

        Ok(())
    }
}

#[async_trait]
impl TreeNodeRepository for SurrealStore {
    #[instrument(skip(self))]
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<TreeNode>, DatabaseError> {
        match self.fetch_record(uuid).await? {
            Some(record) => Ok(Some(self.materialize(record).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_root(&self) -> Result<Option<TreeNode>, DatabaseError> {
        let mut response = self
            .db
            .query(
                "SELECT * FROM tree_node
                 WHERE id NOT IN (SELECT VALUE out FROM is_parent_of);",
            )
            .await?;

        let records: Vec<StoredNode> = response.take(0)?;
        match records.into_iter().min_by_key(|record| record.node_id) {
            Some(record) => Ok(Some(self.materialize(record).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Vec<TreeNode>, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT * FROM tree_node WHERE name = $name ORDER BY nodeId;")
            .bind(("name", name.to_string()))
            .await?;

        let records: Vec<StoredNode> = response.take(0)?;
        self.materialize_all(records).await
    }

    #[instrument(skip(self, parent), fields(parent = %parent))]
    async fn find_by_parent(&self, parent: &TreeNode) -> Result<Vec<TreeNode>, DatabaseError> {
        let Some(uuid) = parent.uuid.as_deref() else {
            return Ok(Vec::new());
        };
        let records = self.fetch_children(uuid).await?;
        self.materialize_all(records).await
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<TreeNode>, DatabaseError> {
        let snapshot = GraphSnapshot::new(
            self.fetch_all_records().await?,
            self.fetch_all_edges().await?,
        );

        Ok(snapshot
            .order
            .iter()
            .filter_map(|uuid| snapshot.materialize(uuid))
            .collect())
    }

    async fn count(&self) -> Result<usize, DatabaseError> {
        let mut response = self
            .db
            .query("SELECT count() FROM tree_node GROUP ALL;")
            .await?;

        let row: Option<CountRow> = response.take(0)?;
        Ok(row.map_or(0, |row| usize::try_from(row.count).unwrap_or_default()))
    }

    #[instrument(skip(self, node), fields(node = %node))]
    async fn save(&self, mut node: TreeNode) -> Result<TreeNode, DatabaseError> {
        node.validate_subtree()?;

        let missing = missing_node_ids(&node);
        let mut node_ids = if missing > 0 {
            self.allocate_node_ids(missing).await?
        } else {
            1..=0
        };
        stamp_subtree(&mut node, &mut node_ids, Utc::now());

        self.write_subtree(&node).await?;
        debug!("Saved {} ({} new)", node, missing);

        Ok(node)
    }

    #[instrument(skip(self, node), fields(node = %node))]
    async fn delete(&self, node: &TreeNode) -> Result<(), DatabaseError> {
        self.delete_many(&[node]).await
    }

    #[instrument(skip(self, nodes), fields(count = nodes.len()))]
    async fn delete_many(&self, nodes: &[&TreeNode]) -> Result<(), DatabaseError> {
        let uuids: Vec<&str> = nodes.iter().filter_map(|n| n.uuid.as_deref()).collect();
        if uuids.is_empty() {
            return Ok(());
        }

        let mut sql = String::from("BEGIN TRANSACTION;\n");
        for index in 0..uuids.len() {
            sql.push_str(&format!(
                "DELETE is_parent_of WHERE in = $record_{index} OR out = $record_{index};\n\
                 DELETE $record_{index};\n"
            ));
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self.db.query(sql);
        for (index, uuid) in uuids.iter().enumerate() {
            query = query.bind((format!("record_{index}"), record_id(uuid)));
        }
        query.await?.check()?;

        debug!("Deleted {} nodes", uuids.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> Result<(), DatabaseError> {
        self.db
            .query(
                "
                BEGIN TRANSACTION;
                DELETE is_parent_of;
                DELETE tree_node;
                COMMIT TRANSACTION;
                ",
            )
            .await?
            .check()?;

        debug!("Deleted all nodes");
        Ok(())
    }
}
