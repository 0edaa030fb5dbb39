use std::sync::Arc;

use jobgraph_graph::GraphStore;
use jobgraph_probe::NetworkProbe;

pub struct AppState {
    pub graph: Arc<dyn GraphStore>,
    pub probe: Arc<dyn NetworkProbe>,
    pub probe_timeout_secs: u64,
}
