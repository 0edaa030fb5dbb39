use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jobgraph_core::HttpScheme;
use jobgraph_probe::{normalize, FetchOutcome, NetworkProbe, ResolveOutcome};

/// Small scripted web graph standing in for the network, grounded on
/// `rootsignal-scout`'s `SimArchive` pattern: page bodies and DNS answers
/// are pre-seeded so a tick can be exercised deterministically.
pub struct FakeProbe {
    pages: HashMap<String, Vec<String>>,
    resolves: HashMap<String, (String, String)>,
    fetch_count: Mutex<u32>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            resolves: HashMap::new(),
            fetch_count: Mutex::new(0),
        }
    }

    pub fn with_page(mut self, name: &str, links: Vec<&str>) -> Self {
        self.pages
            .insert(name.to_string(), links.into_iter().map(String::from).collect());
        self
    }

    pub fn with_resolve(mut self, name: &str, domain: &str, ip: &str) -> Self {
        self.resolves
            .insert(name.to_string(), (domain.to_string(), ip.to_string()));
        self
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetch_count.lock().unwrap()
    }
}

#[async_trait]
impl NetworkProbe for FakeProbe {
    async fn fetch(&self, name: &str, _scheme: HttpScheme, _timeout_secs: u64) -> FetchOutcome {
        *self.fetch_count.lock().unwrap() += 1;
        match self.pages.get(name) {
            Some(links) => FetchOutcome::Ok {
                body: links.join("\n"),
                elapsed_ms: 5,
            },
            None => FetchOutcome::Fail,
        }
    }

    fn extract(&self, body: &str) -> Vec<String> {
        body.lines().filter(|l| !l.is_empty()).map(String::from).collect()
    }

    fn normalize(&self, raw: &str) -> (String, HttpScheme) {
        normalize(raw)
    }

    async fn resolve(&self, name: &str) -> ResolveOutcome {
        match self.resolves.get(name) {
            Some((domain, ip)) => ResolveOutcome::Ok {
                domain: domain.clone(),
                ip: ip.clone(),
            },
            None => ResolveOutcome::NotResolved,
        }
    }
}
