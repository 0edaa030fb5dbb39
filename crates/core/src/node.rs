use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The two node labels the graph store ever sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Url,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "ROOT",
            NodeKind::Url => "URL",
        }
    }
}

/// Scheme under which a host was discovered. Coalescing by name keeps only
/// the last scheme seen, so http and https variants of the same host
/// collapse onto one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpScheme {
    Http,
    Https,
}

impl HttpScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpScheme::Http => "HTTP://",
            HttpScheme::Https => "HTTPS://",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    Normal,
    Domain,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Normal => "normal",
            SearchMode::Domain => "domain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(SearchMode::Normal),
            "domain" => Some(SearchMode::Domain),
            _ => None,
        }
    }
}

/// Position in the per-node state machine. RESTRICTED, NO_LEAD, FAILED and
/// COMPLETED are terminal: once reached, a node is never reclaimed by
/// `match_pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    NoLead,
    Failed,
    Restricted,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Restricted | JobStatus::NoLead | JobStatus::Failed | JobStatus::Completed
        )
    }
}

/// A job node as carried between the core and the graph store adapter.
///
/// Construction is deliberately narrow: `root` and `child_of` are the only
/// two ways to build one, so depth and requested_depth stay consistent by
/// construction rather than by caller discipline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobNode {
    pub name: String,
    pub http_type: HttpScheme,
    pub ip: Option<String>,
    pub domain: Option<String>,
    pub requested_depth: u32,
    pub current_depth: u32,
    pub job_status: JobStatus,
    pub attempts: u32,
    pub search_mode: SearchMode,
    pub request_time_ms: Option<u64>,
    pub kind: NodeKind,

    /// Unix-epoch millis at the moment this node was last locked into
    /// `IN_PROGRESS`. Only consulted when the reclaim lease is enabled
    /// (`FEEDER_RECLAIM_AFTER_SECS > 0`), so its absence never changes
    /// default behavior.
    pub claimed_at_ms: Option<u64>,
}

impl JobNode {
    /// Plants a ROOT node. `name` must already be normalized. `ip`/`domain`
    /// come from resolving `name` before this is called; `None` when that
    /// resolution failed, in which case the Feeder fills them in on its
    /// first tick instead.
    pub fn root(
        name: String,
        http_type: HttpScheme,
        requested_depth: u32,
        search_mode: SearchMode,
        ip: Option<String>,
        domain: Option<String>,
    ) -> Result<Self, CoreError> {
        if requested_depth < 1 {
            return Err(CoreError::Validation(
                "requested_depth must be >= 1".into(),
            ));
        }
        Ok(Self {
            name,
            http_type,
            ip,
            domain,
            requested_depth,
            current_depth: 0,
            job_status: JobStatus::Pending,
            attempts: 0,
            search_mode,
            request_time_ms: None,
            kind: NodeKind::Root,
            claimed_at_ms: None,
        })
    }

    /// Builds a child node under `parent`, deriving depth, requested_depth
    /// and search_mode from the parent so a caller cannot desync them.
    /// The child's status is RESTRICTED if the new depth hits the parent's
    /// requested_depth floor, otherwise PENDING.
    pub fn child_of(
        parent: &JobNode,
        name: String,
        http_type: HttpScheme,
        ip: Option<String>,
        domain: Option<String>,
    ) -> Self {
        let current_depth = parent.current_depth + 1;
        let job_status = if current_depth == parent.requested_depth {
            JobStatus::Restricted
        } else {
            JobStatus::Pending
        };
        Self {
            name,
            http_type,
            ip,
            domain,
            requested_depth: parent.requested_depth,
            current_depth,
            job_status,
            attempts: 0,
            search_mode: parent.search_mode,
            request_time_ms: None,
            kind: NodeKind::Url,
            claimed_at_ms: None,
        }
    }

    pub fn key(&self) -> (String, u32, SearchMode) {
        (self.name.clone(), self.requested_depth, self.search_mode)
    }

    /// Locks the node for a Feeder's tick: sets `IN_PROGRESS` and stamps the
    /// claim time the reclaim lease (if enabled) measures staleness against.
    pub fn mark_claimed(&mut self, now_ms: u64) {
        self.job_status = JobStatus::InProgress;
        self.claimed_at_ms = Some(now_ms);
    }
}
