use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use jobgraph_core::{HttpScheme, JobNode, JobStatus, SearchMode};
use jobgraph_graph::{GraphStore, StoredNode};
use jobgraph_probe::{FetchOutcome, NetworkProbe, ResolveOutcome};

use crate::metrics::FeederMetrics;

#[derive(Error, Debug)]
pub enum FeederError {
    #[error("store unreachable after {0} health-gate attempts")]
    StoreUnreachable(u32),
}

/// Result of one `tick()`. The binary's one-shot mode maps this to a
/// process exit code: `Worked` -> 0, `NoWork` -> 2. `StoreUnreachable`
/// surfaces as `Err` and maps to exit code 1.
#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Worked,
    NoWork,
}

const MAX_FETCH_ATTEMPTS: u32 = 3;
const MAX_HEALTH_GATE_ATTEMPTS: u32 = 5;

pub struct FeederLoop {
    graph: Arc<dyn GraphStore>,
    probe: Arc<dyn NetworkProbe>,
    metrics: Arc<FeederMetrics>,
    jitter_min_ms: u64,
    jitter_max_ms: u64,
    reclaim_after_secs: u64,
}

impl FeederLoop {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        probe: Arc<dyn NetworkProbe>,
        metrics: Arc<FeederMetrics>,
        jitter_min_ms: u64,
        jitter_max_ms: u64,
        reclaim_after_secs: u64,
    ) -> Self {
        Self {
            graph,
            probe,
            metrics,
            jitter_min_ms,
            jitter_max_ms,
            reclaim_after_secs,
        }
    }

    /// Runs the full per-tick protocol once: health gate, jitter, claim,
    /// lock, timed fetch with retry, extract, normalize + coalesce, global
    /// dedupe, per-candidate filtering, batch commit.
    pub async fn tick(&self) -> Result<TickOutcome, FeederError> {
        self.metrics.record_tick();
        self.health_gate().await?;
        self.jitter_sleep().await;

        let claimed = match self.graph.match_pending(self.reclaim_after_secs).await {
            Ok(Some(node)) => node,
            Ok(None) => return Ok(TickOutcome::NoWork),
            Err(e) => {
                warn!(error = %e, "match_pending failed, treating tick as no work");
                return Ok(TickOutcome::NoWork);
            }
        };

        let mut locked = claimed;
        locked.node.mark_claimed(now_ms());
        if let Err(e) = self.graph.push(&locked).await {
            warn!(error = %e, "failed to lock claimed node");
            return Ok(TickOutcome::NoWork);
        }

        info!(name = %locked.node.name, depth = locked.node.current_depth, "claimed node");

        let timeout_secs = (locked.node.attempts + 1) as u64;
        self.metrics.record_fetch();
        let fetch_result = self
            .probe
            .fetch(&locked.node.name, locked.node.http_type, timeout_secs)
            .await;

        let body = match fetch_result {
            FetchOutcome::Fail => {
                self.handle_fetch_failure(&mut locked).await;
                return Ok(TickOutcome::Worked);
            }
            FetchOutcome::Ok { body, elapsed_ms } => {
                locked.node.request_time_ms = Some(elapsed_ms);
                body
            }
        };

        self.resolve_self(&mut locked).await;

        let links = self.probe.extract(&body);
        let candidates = coalesce_by_name(&links, self.probe.as_ref());

        let existing = match self.graph.existing_names().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "existing_names failed, aborting tick without commit");
                return Ok(TickOutcome::Worked);
            }
        };

        let fresh: HashMap<String, HttpScheme> = candidates
            .into_iter()
            .filter(|(name, _)| !existing.contains(name))
            .collect();

        if fresh.is_empty() {
            self.finish_with_status(&mut locked, JobStatus::NoLead).await;
            return Ok(TickOutcome::Worked);
        }

        let mut children = Vec::new();
        for (name, scheme) in fresh {
            match self.probe.resolve(&name).await {
                ResolveOutcome::NotResolved => {
                    self.metrics.record_dns_drop();
                    continue;
                }
                ResolveOutcome::Ok { domain, ip } => {
                    if locked.node.search_mode == SearchMode::Domain {
                        if locked.node.domain.as_deref() != Some(domain.as_str()) {
                            continue;
                        }
                    }
                    children.push(JobNode::child_of(
                        &locked.node,
                        name,
                        scheme,
                        Some(ip),
                        Some(domain),
                    ));
                }
            }
        }

        if children.is_empty() {
            self.finish_with_status(&mut locked, JobStatus::NoLead).await;
            return Ok(TickOutcome::Worked);
        }

        let committed = children.len() as u64;
        if let Err(e) = self.graph.create_batch(&locked, children).await {
            warn!(error = %e, "create_batch failed");
            self.finish_with_status(&mut locked, JobStatus::Failed).await;
            return Ok(TickOutcome::Worked);
        }
        self.metrics.record_commit(committed);
        self.finish_with_status(&mut locked, JobStatus::Completed).await;
        Ok(TickOutcome::Worked)
    }

    async fn health_gate(&self) -> Result<(), FeederError> {
        for attempt in 0..MAX_HEALTH_GATE_ATTEMPTS {
            match self.graph.health_check().await {
                Ok(true) => return Ok(()),
                Ok(false) | Err(_) => {
                    warn!(attempt, "store health check failed, backing off");
                    let backoff_ms = rand::rng().random_range(1_000..=5_000);
                    tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                }
            }
        }
        Err(FeederError::StoreUnreachable(MAX_HEALTH_GATE_ATTEMPTS))
    }

    async fn jitter_sleep(&self) {
        let low = self.jitter_min_ms.min(self.jitter_max_ms);
        let high = self.jitter_max_ms.max(self.jitter_min_ms);
        let millis = if high > low {
            rand::rng().random_range(low..=high)
        } else {
            low
        };
        tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
    }

    async fn resolve_self(&self, locked: &mut StoredNode) {
        if locked.node.ip.is_some() {
            return;
        }
        if let ResolveOutcome::Ok { domain, ip } = self.probe.resolve(&locked.node.name).await {
            locked.node.ip = Some(ip);
            locked.node.domain = Some(domain);
        }
    }

    async fn handle_fetch_failure(&self, locked: &mut StoredNode) {
        locked.node.attempts += 1;
        locked.node.job_status = if locked.node.attempts > MAX_FETCH_ATTEMPTS - 1 {
            JobStatus::Failed
        } else {
            JobStatus::Pending
        };
        if let Err(e) = self.graph.push(locked).await {
            warn!(error = %e, "failed to push node after fetch failure");
        }
    }

    async fn finish_with_status(&self, locked: &mut StoredNode, status: JobStatus) {
        locked.node.job_status = status;
        if let Err(e) = self.graph.push(locked).await {
            warn!(error = %e, "failed to push terminal node status");
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Normalizes every extracted link and coalesces by name, keeping the LAST
/// scheme seen for a given name.
fn coalesce_by_name(links: &[String], probe: &dyn NetworkProbe) -> HashMap<String, HttpScheme> {
    let mut out = HashMap::new();
    for link in links {
        let (name, scheme) = probe.normalize(link);
        out.insert(name, scheme);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_over_two_after_increment_fails_node() {
        assert!(3 > MAX_FETCH_ATTEMPTS - 1);
        assert!(!(2 > MAX_FETCH_ATTEMPTS - 1));
    }
}
