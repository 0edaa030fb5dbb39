use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use jobgraph_core::{JobNode, NodeKind, SearchMode};

use crate::error::GraphError;
use crate::store::{GraphStore, NodeId, StoredNode};

/// In-process fake standing in for the graph backend in tests, grounded on
/// `rootsignal-scout`'s `SimArchive` pattern: a plain data structure behind
/// a mutex that implements the real trait, so Feeder/Manager logic can be
/// exercised without a running Neo4j instance.
#[derive(Default)]
pub struct InMemoryGraphStore {
    nodes: Mutex<Vec<StoredNode>>,
    edges: Mutex<Vec<(NodeId, NodeId)>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: seed a node directly and return its assigned id.
    pub fn seed(&self, node: JobNode) -> NodeId {
        let mut nodes = self.nodes.lock().unwrap();
        let id = nodes.len() as NodeId + 1;
        nodes.push(StoredNode {
            id,
            node,
        });
        id
    }

    /// Test helper: snapshot every node currently held.
    pub fn snapshot(&self) -> Vec<StoredNode> {
        self.nodes.lock().unwrap().clone()
    }

    /// Test helper: snapshot every Lead edge currently held, as (parent_id, child_id) pairs.
    pub fn edges_snapshot(&self) -> Vec<(NodeId, NodeId)> {
        self.edges.lock().unwrap().clone()
    }

    fn next_id(nodes: &[StoredNode]) -> NodeId {
        nodes.iter().map(|n| n.id).max().unwrap_or(0) + 1
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn match_pending(&self, reclaim_after_secs: u64) -> Result<Option<StoredNode>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        let now = now_ms();
        let reclaim_after_ms = reclaim_after_secs * 1000;
        let pending: Vec<&StoredNode> = nodes
            .iter()
            .filter(|n| {
                if n.node.current_depth == n.node.requested_depth {
                    return false;
                }
                match n.node.job_status {
                    jobgraph_core::JobStatus::Pending => true,
                    jobgraph_core::JobStatus::InProgress if reclaim_after_ms > 0 => n
                        .node
                        .claimed_at_ms
                        .is_some_and(|claimed| now.saturating_sub(claimed) > reclaim_after_ms),
                    _ => false,
                }
            })
            .collect();

        let chosen = pending
            .iter()
            .find(|n| n.node.kind == NodeKind::Url)
            .or_else(|| pending.first());

        Ok(chosen.map(|n| (*n).clone()))
    }

    async fn match_by_key(
        &self,
        name: &str,
        requested_depth: u32,
        search_mode: SearchMode,
    ) -> Result<Option<StoredNode>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes
            .iter()
            .find(|n| {
                n.node.name == name
                    && n.node.requested_depth == requested_depth
                    && n.node.search_mode == search_mode
            })
            .cloned())
    }

    async fn create_node(&self, node: JobNode) -> Result<StoredNode, GraphError> {
        let mut nodes = self.nodes.lock().unwrap();
        let id = Self::next_id(&nodes);
        let stored = StoredNode { id, node };
        nodes.push(stored.clone());
        Ok(stored)
    }

    async fn create_batch(
        &self,
        parent: &StoredNode,
        children: Vec<JobNode>,
    ) -> Result<(), GraphError> {
        if children.is_empty() {
            return Ok(());
        }
        let mut nodes = self.nodes.lock().unwrap();
        let mut edges = self.edges.lock().unwrap();

        for child in children {
            let already = nodes.iter().find(|n| {
                n.node.name == child.name
                    && n.node.requested_depth == child.requested_depth
                    && n.node.search_mode == child.search_mode
            });
            let child_id = match already {
                Some(existing) => existing.id,
                None => {
                    let id = Self::next_id(&nodes);
                    nodes.push(StoredNode { id, node: child });
                    id
                }
            };
            edges.push((parent.id, child_id));
        }
        Ok(())
    }

    async fn push(&self, node: &StoredNode) -> Result<(), GraphError> {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(existing) = nodes.iter_mut().find(|n| n.id == node.id) {
            *existing = node.clone();
            Ok(())
        } else {
            Err(GraphError::Malformed(format!(
                "push on unknown node id {}",
                node.id
            )))
        }
    }

    async fn existing_names(&self) -> Result<HashSet<String>, GraphError> {
        let nodes = self.nodes.lock().unwrap();
        Ok(nodes.iter().map(|n| n.node.name.clone()).collect())
    }

    async fn health_check(&self) -> Result<bool, GraphError> {
        Ok(true)
    }
}
