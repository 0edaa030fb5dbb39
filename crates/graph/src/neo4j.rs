use std::collections::HashSet;

use async_trait::async_trait;
use neo4rs::{query, BoltType, Graph, Row};
use tracing::{info, warn};

use jobgraph_core::{HttpScheme, JobNode, JobStatus, NodeKind, SearchMode};

use crate::error::GraphError;
use crate::store::{GraphStore, StoredNode};

const RETURN_FIELDS: &str = "id(n) AS id, labels(n) AS labels, n.name AS name, \
    n.http_type AS http_type, n.ip AS ip, n.domain AS domain, \
    n.requested_depth AS requested_depth, n.current_depth AS current_depth, \
    n.job_status AS job_status, n.attempts AS attempts, n.search_mode AS search_mode, \
    n.request_time_ms AS request_time_ms, n.claimed_at_ms AS claimed_at_ms";

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Bolt-protocol Graph Store Adapter. Grounded on `rootsignal-graph`'s
/// `GraphClient` connect pattern: a thin wrapper around `neo4rs::Graph`,
/// Cypher built with `neo4rs::query` and named parameters.
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, GraphError> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| GraphError::Unreachable(e.to_string()))?;
        Ok(Self { graph })
    }

    /// Run idempotent schema migrations: one function, run once at startup,
    /// `CREATE CONSTRAINT ... IF NOT EXISTS` statements only.
    ///
    /// Neo4j constraints are scoped per label, and a uniqueness constraint
    /// can't span two labels directly, so every node created by this
    /// adapter also carries a shared `:JobKey` label (in addition to its
    /// `:ROOT`/`:URL` kind label) purely so one constraint on `:JobKey` can
    /// enforce `(name, requested_depth, search_mode)` uniqueness across
    /// both kinds — a ROOT and a URL node can never collide on that key,
    /// not just two URLs.
    pub async fn migrate(&self) -> Result<(), GraphError> {
        info!("running jobgraph schema migrations");
        let constraints = [
            "CREATE CONSTRAINT jobgraph_key IF NOT EXISTS FOR (n:JobKey) REQUIRE (n.name, n.requested_depth, n.search_mode) IS UNIQUE",
        ];
        for c in constraints {
            self.graph.run(query(c)).await?;
        }
        info!("jobgraph schema migrations complete");
        Ok(())
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn match_pending(&self, reclaim_after_secs: u64) -> Result<Option<StoredNode>, GraphError> {
        let cypher = format!(
            "MATCH (n)
             WHERE (n:URL OR n:ROOT)
               AND n.current_depth <> n.requested_depth
               AND (
                 n.job_status = 'PENDING'
                 OR (
                   $reclaim_after_ms > 0 AND n.job_status = 'IN_PROGRESS'
                   AND n.claimed_at_ms IS NOT NULL
                   AND $now_ms - n.claimed_at_ms > $reclaim_after_ms
                 )
               )
             RETURN {RETURN_FIELDS}
             ORDER BY CASE WHEN n:URL THEN 0 ELSE 1 END
             LIMIT 1"
        );
        let q = query(&cypher)
            .param("reclaim_after_ms", (reclaim_after_secs as i64) * 1000)
            .param("now_ms", now_ms());
        let mut stream = self.graph.execute(q).await?;
        match stream.next().await? {
            Some(row) => Ok(Some(row_to_stored_node(&row)?)),
            None => Ok(None),
        }
    }

    async fn match_by_key(
        &self,
        name: &str,
        requested_depth: u32,
        search_mode: SearchMode,
    ) -> Result<Option<StoredNode>, GraphError> {
        let cypher = format!(
            "MATCH (n {{name: $name, requested_depth: $requested_depth, search_mode: $search_mode}})
             RETURN {RETURN_FIELDS}
             LIMIT 1"
        );
        let q = query(&cypher)
            .param("name", name)
        .param("requested_depth", requested_depth as i64)
        .param("search_mode", search_mode.as_str());

        let mut stream = self.graph.execute(q).await?;
        match stream.next().await? {
            Some(row) => Ok(Some(row_to_stored_node(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_node(&self, node: JobNode) -> Result<StoredNode, GraphError> {
        let label = node.kind.label();
        let cypher = format!(
            "CREATE (n:{label}:JobKey {{
                name: $name, http_type: $http_type, ip: $ip, domain: $domain,
                requested_depth: $requested_depth, current_depth: $current_depth,
                job_status: $job_status, attempts: $attempts, search_mode: $search_mode,
                request_time_ms: $request_time_ms, claimed_at_ms: $claimed_at_ms
            }})
            RETURN id(n) AS id"
        );
        let q = bind_node_params(query(&cypher), &node);
        let mut stream = self.graph.execute(q).await?;
        let row = stream
            .next()
            .await?
            .ok_or_else(|| GraphError::Malformed("CREATE did not return an id".into()))?;
        let id: i64 = row
            .get("id")
            .map_err(|e| GraphError::Malformed(e.to_string()))?;
        Ok(StoredNode { id, node })
    }

    async fn create_batch(
        &self,
        parent: &StoredNode,
        children: Vec<JobNode>,
    ) -> Result<(), GraphError> {
        if children.is_empty() {
            return Ok(());
        }
        let child_maps: Vec<BoltType> = children.iter().map(job_node_to_bolt_map).collect();

        let q = query(
            "UNWIND $children AS child
             MERGE (c:URL:JobKey {name: child.name, requested_depth: child.requested_depth, search_mode: child.search_mode})
             ON CREATE SET
                c.http_type = child.http_type,
                c.ip = child.ip,
                c.domain = child.domain,
                c.current_depth = child.current_depth,
                c.job_status = child.job_status,
                c.attempts = child.attempts,
                c.request_time_ms = child.request_time_ms,
                c.claimed_at_ms = child.claimed_at_ms
             WITH c
             MATCH (p) WHERE id(p) = $parent_id
             MERGE (p)-[:Lead]->(c)",
        )
        .param("children", child_maps)
        .param("parent_id", parent.id);

        self.graph.run(q).await?;
        Ok(())
    }

    async fn push(&self, node: &StoredNode) -> Result<(), GraphError> {
        let q = query(
            "MATCH (n) WHERE id(n) = $id
             SET n.ip = $ip, n.domain = $domain, n.job_status = $job_status,
                 n.attempts = $attempts, n.request_time_ms = $request_time_ms,
                 n.claimed_at_ms = $claimed_at_ms",
        )
        .param("id", node.id)
        .param("ip", node.node.ip.clone())
        .param("domain", node.node.domain.clone())
        .param("job_status", status_str(node.node.job_status))
        .param("attempts", node.node.attempts as i64)
        .param(
            "request_time_ms",
            node.node.request_time_ms.map(|v| v as i64),
        )
        .param("claimed_at_ms", node.node.claimed_at_ms.map(|v| v as i64));

        self.graph.run(q).await?;
        Ok(())
    }

    async fn existing_names(&self) -> Result<HashSet<String>, GraphError> {
        let q = query("MATCH (n) WHERE n:URL OR n:ROOT RETURN DISTINCT n.name AS name");
        let mut names = HashSet::new();
        let mut stream = self.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            let name: String = row
                .get("name")
                .map_err(|e| GraphError::Malformed(e.to_string()))?;
            names.insert(name);
        }
        Ok(names)
    }

    async fn health_check(&self) -> Result<bool, GraphError> {
        match self.graph.execute(query("RETURN 1")).await {
            Ok(mut stream) => Ok(stream.next().await.is_ok()),
            Err(e) => {
                warn!(error = %e, "store health check failed");
                Ok(false)
            }
        }
    }
}

fn status_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "PENDING",
        JobStatus::InProgress => "IN_PROGRESS",
        JobStatus::Completed => "COMPLETED",
        JobStatus::NoLead => "NO_LEAD",
        JobStatus::Failed => "FAILED",
        JobStatus::Restricted => "RESTRICTED",
    }
}

fn status_from_str(s: &str) -> Result<JobStatus, GraphError> {
    match s {
        "PENDING" => Ok(JobStatus::Pending),
        "IN_PROGRESS" => Ok(JobStatus::InProgress),
        "COMPLETED" => Ok(JobStatus::Completed),
        "NO_LEAD" => Ok(JobStatus::NoLead),
        "FAILED" => Ok(JobStatus::Failed),
        "RESTRICTED" => Ok(JobStatus::Restricted),
        other => Err(GraphError::Malformed(format!("unknown job_status {other}"))),
    }
}

fn bind_node_params(q: neo4rs::Query, node: &JobNode) -> neo4rs::Query {
    q.param("name", node.name.clone())
        .param("http_type", node.http_type.as_str())
        .param("ip", node.ip.clone())
        .param("domain", node.domain.clone())
        .param("requested_depth", node.requested_depth as i64)
        .param("current_depth", node.current_depth as i64)
        .param("job_status", status_str(node.job_status))
        .param("attempts", node.attempts as i64)
        .param("search_mode", node.search_mode.as_str())
        .param("request_time_ms", node.request_time_ms.map(|v| v as i64))
        .param("claimed_at_ms", node.claimed_at_ms.map(|v| v as i64))
}

fn job_node_to_bolt_map(node: &JobNode) -> BoltType {
    let entries = vec![
        ("name", BoltType::from(node.name.as_str())),
        ("http_type", BoltType::from(node.http_type.as_str())),
        (
            "ip",
            node.ip
                .as_deref()
                .map(BoltType::from)
                .unwrap_or(BoltType::Null(neo4rs::BoltNull)),
        ),
        (
            "domain",
            node.domain
                .as_deref()
                .map(BoltType::from)
                .unwrap_or(BoltType::Null(neo4rs::BoltNull)),
        ),
        ("requested_depth", BoltType::from(node.requested_depth as i64)),
        ("current_depth", BoltType::from(node.current_depth as i64)),
        ("job_status", BoltType::from(status_str(node.job_status))),
        ("attempts", BoltType::from(node.attempts as i64)),
        ("search_mode", BoltType::from(node.search_mode.as_str())),
        (
            "request_time_ms",
            node.request_time_ms
                .map(|v| BoltType::from(v as i64))
                .unwrap_or(BoltType::Null(neo4rs::BoltNull)),
        ),
        (
            "claimed_at_ms",
            node.claimed_at_ms
                .map(|v| BoltType::from(v as i64))
                .unwrap_or(BoltType::Null(neo4rs::BoltNull)),
        ),
    ];
    BoltType::Map(neo4rs::BoltMap::from_iter(
        entries
            .into_iter()
            .map(|(k, v)| (neo4rs::BoltString::from(k), v)),
    ))
}

fn row_to_stored_node(row: &Row) -> Result<StoredNode, GraphError> {
    let id: i64 = row
        .get("id")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let labels: Vec<String> = row
        .get("labels")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let kind = if labels.iter().any(|l| l == "URL") {
        NodeKind::Url
    } else {
        NodeKind::Root
    };

    let name: String = row
        .get("name")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let http_type_str: String = row
        .get("http_type")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let http_type = match http_type_str.as_str() {
        "HTTP://" => HttpScheme::Http,
        _ => HttpScheme::Https,
    };
    let requested_depth: i64 = row
        .get("requested_depth")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let current_depth: i64 = row
        .get("current_depth")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let job_status_str: String = row
        .get("job_status")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let attempts: i64 = row
        .get("attempts")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let search_mode_str: String = row
        .get("search_mode")
        .map_err(|e| GraphError::Malformed(e.to_string()))?;
    let search_mode = SearchMode::parse(&search_mode_str)
        .ok_or_else(|| GraphError::Malformed(format!("unknown search_mode {search_mode_str}")))?;

    let node = JobNode {
        name,
        http_type,
        ip: row.get::<String>("ip").ok(),
        domain: row.get::<String>("domain").ok(),
        requested_depth: requested_depth as u32,
        current_depth: current_depth as u32,
        job_status: status_from_str(&job_status_str)?,
        attempts: attempts as u32,
        search_mode,
        request_time_ms: row.get::<i64>("request_time_ms").ok().map(|v| v as u64),
        claimed_at_ms: row.get::<i64>("claimed_at_ms").ok().map(|v| v as u64),
        kind,
    };

    Ok(StoredNode { id, node })
}
