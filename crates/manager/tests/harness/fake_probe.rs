use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use jobgraph_core::HttpScheme;
use jobgraph_probe::{normalize, FetchOutcome, NetworkProbe, ResolveOutcome};

/// Scripted probe for handler tests: every name resolves and fetches
/// successfully unless explicitly marked unreachable.
pub struct FakeProbe {
    unreachable: Mutex<HashSet<String>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self {
            unreachable: Mutex::new(HashSet::new()),
        }
    }

    pub fn unreachable(self, name: &str) -> Self {
        self.unreachable.lock().unwrap().insert(name.to_string());
        self
    }
}

#[async_trait]
impl NetworkProbe for FakeProbe {
    async fn fetch(&self, name: &str, _scheme: HttpScheme, _timeout_secs: u64) -> FetchOutcome {
        if self.unreachable.lock().unwrap().contains(name) {
            FetchOutcome::Fail
        } else {
            FetchOutcome::Ok {
                body: String::new(),
                elapsed_ms: 1,
            }
        }
    }

    fn extract(&self, _body: &str) -> Vec<String> {
        Vec::new()
    }

    fn normalize(&self, raw: &str) -> (String, HttpScheme) {
        normalize(raw)
    }

    async fn resolve(&self, _name: &str) -> ResolveOutcome {
        ResolveOutcome::Ok {
            domain: "EXAMPLE".to_string(),
            ip: "1.2.3.4".to_string(),
        }
    }
}
