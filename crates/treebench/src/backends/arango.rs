//! Document-graph adapter: ArangoDB over its HTTP REST API.
//!
//! Nodes live in a document collection keyed by node id, parent-child
//! pairs in an edge collection; the benchmark query is a bounded-depth
//! OUTBOUND traversal over the edges.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config::ArangoConfig;
use crate::error::{BenchError, Result};
use crate::tree::TreeNode;

use super::StorageAdapter;

const NODES: &str = "Nodes";
const EDGES: &str = "Edges";

/// ArangoDB collection type discriminators.
const DOCUMENT_COLLECTION: u8 = 2;
const EDGE_COLLECTION: u8 = 3;

/// Bounded-depth traversal, `@depth..@depth` hops outbound from `@start`.
/// A 0..0 range returns the start vertex itself.
const DEPTH_QUERY: &str = "FOR v IN @depth..@depth OUTBOUND @start Edges RETURN v._key";

pub struct ArangoAdapter {
    config: ArangoConfig,
    client: Client,
}

#[derive(Deserialize)]
struct DatabaseList {
    result: Vec<String>,
}

#[derive(Deserialize)]
struct CursorPage {
    #[serde(default)]
    result: Vec<serde_json::Value>,
    #[serde(default, rename = "hasMore")]
    has_more: bool,
    #[serde(default)]
    id: Option<String>,
}

impl ArangoAdapter {
    pub fn new(config: ArangoConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.basic_auth(&self.config.user, Some(&self.config.password))
    }

    fn db_url(&self, path: &str) -> String {
        format!("{}/_db/{}/{}", self.config.url, self.config.database, path)
    }

    async fn ensure_collection(&self, name: &str, kind: u8) -> Result<()> {
        let resp = self
            .authed(self.client.get(self.db_url(&format!("_api/collection/{name}"))))
            .send()
            .await
            .map_err(BenchError::connection)?;

        match resp.status() {
            StatusCode::NOT_FOUND => {
                let resp = self
                    .authed(self.client.post(self.db_url("_api/collection")))
                    .json(&json!({ "name": name, "type": kind }))
                    .send()
                    .await
                    .map_err(BenchError::connection)?;
                if !resp.status().is_success() {
                    return Err(BenchError::Schema(format!(
                        "creating collection {name} failed: {}",
                        resp.status()
                    )));
                }
                Ok(())
            }
            status if status.is_success() => Ok(()),
            status => Err(BenchError::Schema(format!(
                "checking collection {name} failed: {status}"
            ))),
        }
    }

    async fn save_document(&self, collection: &str, body: &serde_json::Value) -> Result<()> {
        let resp = self
            .authed(
                self.client
                    .post(self.db_url(&format!("_api/document/{collection}"))),
            )
            .json(body)
            .send()
            .await
            .map_err(BenchError::write)?;
        if !resp.status().is_success() {
            return Err(BenchError::Write(format!(
                "saving document in {collection} failed: {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// Run an AQL query to completion, following cursor batches until the
    /// result set is fully materialized.
    async fn run_cursor(
        &self,
        aql: &str,
        bind_vars: serde_json::Value,
    ) -> Result<Vec<serde_json::Value>> {
        let resp = self
            .authed(self.client.post(self.db_url("_api/cursor")))
            .json(&json!({ "query": aql, "bindVars": bind_vars }))
            .send()
            .await
            .map_err(BenchError::query)?;
        if !resp.status().is_success() {
            return Err(BenchError::Query(format!(
                "cursor creation failed: {}",
                resp.status()
            )));
        }

        let mut page: CursorPage = resp.json().await.map_err(BenchError::query)?;
        let mut out = Vec::new();
        loop {
            out.append(&mut page.result);
            if !page.has_more {
                break;
            }
            let id = page
                .id
                .clone()
                .ok_or_else(|| BenchError::Query("cursor continuation without id".into()))?;
            let resp = self
                .authed(self.client.put(self.db_url(&format!("_api/cursor/{id}"))))
                .send()
                .await
                .map_err(BenchError::query)?;
            if !resp.status().is_success() {
                return Err(BenchError::Query(format!(
                    "cursor continuation failed: {}",
                    resp.status()
                )));
            }
            page = resp.json().await.map_err(BenchError::query)?;
        }
        Ok(out)
    }

    /// Fetch all descendants exactly `depth` hops below `root_id`,
    /// returned as bare node keys.
    pub async fn fetch_descendants(&self, root_id: &str, depth: u32) -> Result<Vec<String>> {
        let rows = self
            .run_cursor(
                DEPTH_QUERY,
                json!({ "depth": depth, "start": format!("{NODES}/{root_id}") }),
            )
            .await?;
        rows.into_iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| BenchError::Query("non-string node key in result".into()))
            })
            .collect()
    }

    /// Read back every stored node key. Test support.
    pub async fn fetch_nodes(&self) -> Result<Vec<String>> {
        let rows = self
            .run_cursor("FOR n IN Nodes RETURN n._key", json!({}))
            .await?;
        rows.into_iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| BenchError::Query("non-string node key".into()))
            })
            .collect()
    }

    /// Read back every stored (parent, child) pair as bare keys. Test
    /// support.
    pub async fn fetch_edges(&self) -> Result<Vec<(String, String)>> {
        let rows = self
            .run_cursor("FOR e IN Edges RETURN [e._from, e._to]", json!({}))
            .await?;
        rows.into_iter()
            .map(|v| {
                let pair = v
                    .as_array()
                    .filter(|a| a.len() == 2)
                    .ok_or_else(|| BenchError::Query("malformed edge in result".into()))?;
                let strip = |v: &serde_json::Value| -> Result<String> {
                    let full = v
                        .as_str()
                        .ok_or_else(|| BenchError::Query("non-string edge endpoint".into()))?;
                    Ok(full
                        .strip_prefix(&format!("{NODES}/"))
                        .unwrap_or(full)
                        .to_owned())
                };
                Ok((strip(&pair[0])?, strip(&pair[1])?))
            })
            .collect()
    }
}

#[async_trait]
impl StorageAdapter for ArangoAdapter {
    fn name(&self) -> &'static str {
        "arangodb"
    }

    async fn init(&mut self) -> Result<()> {
        // Database: check-then-create, nothing here is assumed idempotent
        // on the storage side.
        let url = format!("{}/_api/database", self.config.url);
        let resp = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(BenchError::connection)?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(BenchError::Connection(
                "arangodb rejected credentials".into(),
            ));
        }
        if !resp.status().is_success() {
            return Err(BenchError::Connection(format!(
                "listing databases failed: {}",
                resp.status()
            )));
        }
        let dbs: DatabaseList = resp.json().await.map_err(BenchError::connection)?;
        if !dbs.result.iter().any(|db| db == &self.config.database) {
            let resp = self
                .authed(self.client.post(&url))
                .json(&json!({ "name": self.config.database }))
                .send()
                .await
                .map_err(BenchError::connection)?;
            if !resp.status().is_success() {
                return Err(BenchError::Schema(format!(
                    "creating database {} failed: {}",
                    self.config.database,
                    resp.status()
                )));
            }
        }

        self.ensure_collection(NODES, DOCUMENT_COLLECTION).await?;
        self.ensure_collection(EDGES, EDGE_COLLECTION).await?;
        Ok(())
    }

    async fn insert_data(&mut self, tree: &TreeNode) -> Result<()> {
        // One round-trip per node and per edge; LIFO processing order, a
        // parent is pushed before its children are expanded.
        let mut stack: Vec<(&TreeNode, Option<&str>)> = vec![(tree, None)];
        while let Some((node, parent)) = stack.pop() {
            self.save_document(NODES, &json!({ "_key": node.id })).await?;
            if let Some(parent) = parent {
                self.save_document(
                    EDGES,
                    &json!({
                        "_from": format!("{NODES}/{parent}"),
                        "_to": format!("{NODES}/{}", node.id),
                    }),
                )
                .await?;
            }
            for child in &node.children {
                stack.push((child, Some(node.id.as_str())));
            }
        }
        Ok(())
    }

    async fn delete_all(&mut self) -> Result<()> {
        for name in [NODES, EDGES] {
            let resp = self
                .authed(self.client.get(self.db_url(&format!("_api/collection/{name}"))))
                .send()
                .await
                .map_err(BenchError::write)?;
            if resp.status() == StatusCode::NOT_FOUND {
                continue;
            }
            if !resp.status().is_success() {
                return Err(BenchError::Write(format!(
                    "checking collection {name} failed: {}",
                    resp.status()
                )));
            }

            let resp = self
                .authed(
                    self.client
                        .put(self.db_url(&format!("_api/collection/{name}/truncate"))),
                )
                .send()
                .await
                .map_err(BenchError::write)?;
            if !resp.status().is_success() {
                return Err(BenchError::Write(format!(
                    "truncating {name} failed: {}",
                    resp.status()
                )));
            }
        }
        Ok(())
    }

    async fn execute(&mut self, root_id: &str, depth: u32) -> Result<Duration> {
        let start = Instant::now();

        let resp = self
            .authed(
                self.client
                    .get(self.db_url(&format!("_api/document/{NODES}/{root_id}"))),
            )
            .send()
            .await
            .map_err(BenchError::query)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(BenchError::Query(format!("root node {root_id} not found")));
        }
        if !resp.status().is_success() {
            return Err(BenchError::Query(format!(
                "root lookup failed: {}",
                resp.status()
            )));
        }

        let keys = self.fetch_descendants(root_id, depth).await?;

        let elapsed = start.elapsed();
        tracing::debug!(backend = "arangodb", rows = keys.len(), "depth query returned");
        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_query_binds() {
        assert!(DEPTH_QUERY.contains("@depth..@depth OUTBOUND @start"));
        assert!(DEPTH_QUERY.ends_with("RETURN v._key"));
    }

    #[test]
    fn test_db_url() {
        let adapter = ArangoAdapter::new(ArangoConfig::default());
        assert_eq!(
            adapter.db_url("_api/cursor"),
            "http://localhost:8529/_db/test/_api/cursor"
        );
    }
}
