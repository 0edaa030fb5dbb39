use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Outcome of a single fetch attempt. A non-success HTTP status is treated
/// identically to a transport failure — the exact status is not inspected,
/// only body and elapsed time are surfaced on success.
#[derive(Debug)]
pub enum FetchOutcome {
    Ok { body: String, elapsed_ms: u64 },
    Fail,
}

/// HTTP GET with a per-attempt timeout, no redirect policy beyond the
/// client default. Transport, DNS, TLS and non-2xx/3xx status all collapse
/// to `Fail` — the Feeder does not distinguish failure reasons.
pub async fn fetch(client: &reqwest::Client, url: &str, timeout_secs: u64) -> FetchOutcome {
    let start = Instant::now();
    let result = client
        .get(url)
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await;

    let response = match result {
        Ok(r) => r,
        Err(e) => {
            warn!(url, error = %e, "fetch failed");
            return FetchOutcome::Fail;
        }
    };

    if !response.status().is_success() {
        debug!(url, status = %response.status(), "fetch returned non-success status");
        return FetchOutcome::Fail;
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Ok {
            body,
            elapsed_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            warn!(url, error = %e, "failed reading response body");
            FetchOutcome::Fail
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_fails() {
        let client = reqwest::Client::new();
        let outcome = fetch(&client, "http://127.0.0.1.invalid.example/", 1).await;
        assert!(matches!(outcome, FetchOutcome::Fail));
    }
}
