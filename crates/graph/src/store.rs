use std::collections::HashSet;

use async_trait::async_trait;
use jobgraph_core::{JobNode, SearchMode};

use crate::error::GraphError;

/// Backend-assigned identity of a committed node (e.g. Neo4j's internal node id).
/// Opaque outside this crate; the Feeder/Manager only ever round-trip it.
pub type NodeId = i64;

/// A node together with the identity the backend gave it. `match_pending` and
/// `match_by_key` return this so callers can `push` or `create_batch` against
/// the exact node they read, without re-deriving identity from `JobNode`'s
/// dedup key.
#[derive(Debug, Clone)]
pub struct StoredNode {
    pub id: NodeId,
    pub node: JobNode,
}

/// The only place the concrete graph backend appears. Every operation is
/// atomic at the granularity of one node or one connected batch.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Returns one node where `current_depth != requested_depth` and
    /// `job_status = PENDING`, preferring a URL-labeled node over a
    /// ROOT-labeled one, or `None` if no such node exists.
    ///
    /// `reclaim_after_secs`, when non-zero, additionally matches nodes stuck
    /// in `IN_PROGRESS` whose `claimed_at_ms` is older than that many
    /// seconds — an opt-in lease recovering from a worker that crashed
    /// mid-tick. Zero (the default) disables this and only ever returns
    /// strictly `PENDING` nodes.
    async fn match_pending(&self, reclaim_after_secs: u64) -> Result<Option<StoredNode>, GraphError>;

    /// Looks up a node by the invariant-#4 dedup key. Used for ROOT
    /// deduplication in the Manager.
    async fn match_by_key(
        &self,
        name: &str,
        requested_depth: u32,
        search_mode: SearchMode,
    ) -> Result<Option<StoredNode>, GraphError>;

    /// Atomically inserts a single node (used by the Manager to plant ROOT).
    async fn create_node(&self, node: JobNode) -> Result<StoredNode, GraphError>;

    /// Atomically inserts all of `children` plus a `Lead` edge from `parent`
    /// to each, in a single commit. Partial commit is forbidden: either every
    /// child and edge lands, or none does. A child whose dedup key already
    /// exists is skipped rather than duplicated.
    async fn create_batch(
        &self,
        parent: &StoredNode,
        children: Vec<JobNode>,
    ) -> Result<(), GraphError>;

    /// Writes back a node's mutated properties.
    async fn push(&self, node: &StoredNode) -> Result<(), GraphError>;

    /// Returns the set of all node names currently in the store, for the
    /// Feeder's global dedupe pass over freshly extracted candidates.
    async fn existing_names(&self) -> Result<HashSet<String>, GraphError>;

    /// Cheap round-trip that returns reachability.
    async fn health_check(&self) -> Result<bool, GraphError>;
}
