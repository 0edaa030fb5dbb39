pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod resolve;

pub use error::ProbeError;
pub use extract::extract_links;
pub use fetch::{fetch, FetchOutcome};
pub use normalize::normalize;
pub use resolve::{resolve, ResolveOutcome, Resolver};

use async_trait::async_trait;

/// Seam between the Feeder/Manager and the network. A fake implementation
/// backs scenario tests without touching a socket.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn fetch(&self, name: &str, scheme: jobgraph_core::HttpScheme, timeout_secs: u64) -> FetchOutcome;
    fn extract(&self, body: &str) -> Vec<String>;
    fn normalize(&self, raw: &str) -> (String, jobgraph_core::HttpScheme);
    async fn resolve(&self, name: &str) -> ResolveOutcome;
}

/// The real probe: HTTP over reqwest, DNS over hickory-resolver.
pub struct HttpProbe {
    client: reqwest::Client,
    resolver: Resolver,
}

impl HttpProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
            )
            .build()
            .map_err(|e| ProbeError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            resolver: Resolver::from_system()?,
        })
    }
}

#[async_trait]
impl NetworkProbe for HttpProbe {
    async fn fetch(&self, name: &str, scheme: jobgraph_core::HttpScheme, timeout_secs: u64) -> FetchOutcome {
        let url = format!("{}{}", scheme.as_str().to_lowercase(), name.to_lowercase());
        fetch(&self.client, &url, timeout_secs).await
    }

    fn extract(&self, body: &str) -> Vec<String> {
        extract_links(body)
    }

    fn normalize(&self, raw: &str) -> (String, jobgraph_core::HttpScheme) {
        normalize(raw)
    }

    async fn resolve(&self, name: &str) -> ResolveOutcome {
        resolve(&self.resolver, name).await
    }
}
