//! Relational adapter: MySQL with a closure-table encoding.
//!
//! `ClosureTable` holds only the direct parent-child pairs, never the
//! transitive closure; the depth query compensates with one self-join per
//! hop. That join chain is the cost being measured, so it stays.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, QueryBuilder, Row};

use crate::config::MySqlConfig;
use crate::error::{BenchError, Result};
use crate::tree::TreeNode;

use super::StorageAdapter;

/// MySQL closure-table adapter.
///
/// Holds a single connection rather than a pool: the foreign-key toggle in
/// [`StorageAdapter::insert_data`] is session-scoped and must land on the
/// same session as the inserts.
pub struct MySqlAdapter {
    config: MySqlConfig,
    conn: Option<MySqlConnection>,
}

impl MySqlAdapter {
    pub fn new(config: MySqlConfig) -> Self {
        Self { config, conn: None }
    }

    fn conn(&mut self) -> Result<&mut MySqlConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| BenchError::Connection("mysql adapter not initialized".into()))
    }

    async fn bulk_insert(
        conn: &mut MySqlConnection,
        nodes: &[&str],
        edges: &[(&str, &str)],
    ) -> Result<()> {
        let mut qb = QueryBuilder::<sqlx::MySql>::new("INSERT INTO Nodes (id) ");
        qb.push_values(nodes, |mut b, id| {
            b.push_bind(*id);
        });
        qb.build()
            .execute(&mut *conn)
            .await
            .map_err(BenchError::write)?;

        if !edges.is_empty() {
            let mut qb =
                QueryBuilder::<sqlx::MySql>::new("INSERT INTO ClosureTable (ancestor, descendant) ");
            qb.push_values(edges, |mut b, (ancestor, descendant)| {
                b.push_bind(*ancestor);
                b.push_bind(*descendant);
            });
            qb.build()
                .execute(&mut *conn)
                .await
                .map_err(BenchError::write)?;
        }

        Ok(())
    }

    /// Fetch all descendants exactly `depth` hops below `root_id`.
    pub async fn fetch_descendants(&mut self, root_id: &str, depth: u32) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let sql = descendant_query(depth);

        let rows = sqlx::query(&sql)
            .bind(root_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(BenchError::query)?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            ids.push(row.try_get::<String, _>(0).map_err(BenchError::query)?);
        }
        Ok(ids)
    }

    /// Read back every stored node id. Test support.
    pub async fn fetch_nodes(&mut self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let rows = sqlx::query("SELECT id FROM Nodes")
            .fetch_all(&mut *conn)
            .await
            .map_err(BenchError::query)?;
        rows.iter()
            .map(|row| row.try_get(0).map_err(BenchError::query))
            .collect()
    }

    /// Read back every stored (ancestor, descendant) pair. Test support.
    pub async fn fetch_edges(&mut self) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let rows = sqlx::query("SELECT ancestor, descendant FROM ClosureTable")
            .fetch_all(&mut *conn)
            .await
            .map_err(BenchError::query)?;
        rows.iter()
            .map(|row| {
                let ancestor = row.try_get(0).map_err(BenchError::query)?;
                let descendant = row.try_get(1).map_err(BenchError::query)?;
                Ok((ancestor, descendant))
            })
            .collect()
    }
}

#[async_trait]
impl StorageAdapter for MySqlAdapter {
    fn name(&self) -> &'static str {
        "mysql"
    }

    async fn init(&mut self) -> Result<()> {
        if self.conn.is_none() {
            let opts = MySqlConnectOptions::new()
                .host(&self.config.host)
                .username(&self.config.user)
                .password(&self.config.password)
                .database(&self.config.database);
            let conn = opts.connect().await.map_err(BenchError::connection)?;
            self.conn = Some(conn);
        }

        let conn = self.conn()?;
        sqlx::query("CREATE TABLE IF NOT EXISTS Nodes (id VARCHAR(255) PRIMARY KEY)")
            .execute(&mut *conn)
            .await
            .map_err(BenchError::schema)?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ClosureTable (\
             ancestor VARCHAR(255) NOT NULL, \
             descendant VARCHAR(255) NOT NULL, \
             PRIMARY KEY (ancestor, descendant), \
             FOREIGN KEY (ancestor) REFERENCES Nodes(id), \
             FOREIGN KEY (descendant) REFERENCES Nodes(id))",
        )
        .execute(&mut *conn)
        .await
        .map_err(BenchError::schema)?;

        Ok(())
    }

    async fn insert_data(&mut self, tree: &TreeNode) -> Result<()> {
        let (nodes, edges) = tree.flatten();
        let conn = self.conn()?;

        // The edge batch may reference nodes the checker has not yet seen,
        // so referential integrity is off for the two bulk inserts and
        // restored afterwards, even on failure.
        sqlx::query("SET foreign_key_checks = 0")
            .execute(&mut *conn)
            .await
            .map_err(BenchError::write)?;

        let inserted = Self::bulk_insert(&mut *conn, &nodes, &edges).await;

        let restored = sqlx::query("SET foreign_key_checks = 1")
            .execute(&mut *conn)
            .await;

        inserted?;
        restored.map_err(BenchError::write)?;
        Ok(())
    }

    async fn delete_all(&mut self) -> Result<()> {
        let conn = self.conn()?;
        sqlx::query("DELETE FROM ClosureTable")
            .execute(&mut *conn)
            .await
            .map_err(BenchError::write)?;
        sqlx::query("DELETE FROM Nodes")
            .execute(&mut *conn)
            .await
            .map_err(BenchError::write)?;
        Ok(())
    }

    async fn execute(&mut self, root_id: &str, depth: u32) -> Result<Duration> {
        let start = Instant::now();

        let conn = self.conn()?;
        let root = sqlx::query("SELECT id FROM Nodes WHERE id = ?")
            .bind(root_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(BenchError::query)?;
        if root.is_none() {
            return Err(BenchError::Query(format!("root node {root_id} not found")));
        }

        let ids = self.fetch_descendants(root_id, depth).await?;

        let elapsed = start.elapsed();
        tracing::debug!(backend = "mysql", rows = ids.len(), "depth query returned");
        Ok(elapsed)
    }
}

/// Build the depth query: one self-join of the closure table per hop,
/// filtered on the first hop's ancestor. Depth 0 degenerates to selecting
/// the root row itself.
fn descendant_query(depth: u32) -> String {
    if depth == 0 {
        return "SELECT id FROM Nodes WHERE id = ?".to_string();
    }

    let mut joins = String::new();
    for i in 2..=depth {
        joins.push_str(&format!(
            " JOIN ClosureTable c{i} ON c{prev}.descendant = c{i}.ancestor",
            prev = i - 1
        ));
    }
    format!("SELECT c{depth}.descendant FROM ClosureTable c1{joins} WHERE c1.ancestor = ?")
}
