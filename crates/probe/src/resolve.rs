use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use crate::error::ProbeError;

/// Outcome of the rightward-shift DNS walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Ok { domain: String, ip: String },
    NotResolved,
}

/// Thin wrapper so the walk algorithm doesn't depend on hickory-resolver's
/// concrete resolver type directly — keeps the DNS backend swappable the
/// way the graph backend is behind `GraphStore`.
pub struct Resolver {
    inner: TokioAsyncResolver,
}

impl Resolver {
    pub fn from_system() -> Result<Self, ProbeError> {
        let inner = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
        Ok(Self { inner })
    }
}

const MIN_WINDOW: usize = 2;
const MAX_WINDOW: usize = 5;

/// Starting from the rightmost two labels and growing the window left one
/// label at a time up to 5, looks up each candidate suffix until one
/// resolves. This stands in for a public-suffix list and is deliberately
/// approximate: multi-label public suffixes like `co.il` will misidentify
/// the registrable label.
pub async fn resolve(resolver: &Resolver, name: &str) -> ResolveOutcome {
    let lower = name.to_lowercase();
    let labels: Vec<&str> = lower.split('.').collect();

    if labels.len() < MIN_WINDOW {
        return ResolveOutcome::NotResolved;
    }

    let max_window = MAX_WINDOW.min(labels.len());
    for window in MIN_WINDOW..=max_window {
        let start = labels.len() - window;
        let candidate = labels[start..].join(".");

        let lookup = match resolver.inner.lookup_ip(candidate.as_str()).await {
            Ok(lookup) => lookup,
            Err(e) => {
                debug!(candidate, error = %e, "rightward-shift probe failed");
                continue;
            }
        };

        let last_ipv4 = lookup
            .iter()
            .filter_map(|addr| match addr {
                std::net::IpAddr::V4(v4) => Some(v4),
                std::net::IpAddr::V6(_) => None,
            })
            .last();

        let Some(ip) = last_ipv4 else { continue };

        if ip.octets()[0..3] == [127, 0, 0] {
            return ResolveOutcome::NotResolved;
        }

        return ResolveOutcome::Ok {
            domain: labels[start].to_string(),
            ip: ip.to_string(),
        };
    }

    ResolveOutcome::NotResolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_grows_from_two_to_five_labels() {
        let labels: Vec<&str> = "a.b.c.d.e.f.example.com".split('.').collect();
        let max_window = MAX_WINDOW.min(labels.len());
        let windows: Vec<String> = (MIN_WINDOW..=max_window)
            .map(|w| labels[labels.len() - w..].join("."))
            .collect();
        assert_eq!(
            windows,
            vec![
                "example.com",
                "f.example.com",
                "e.f.example.com",
                "d.e.f.example.com",
            ]
        );
    }

    #[test]
    fn short_name_below_min_window_not_resolved() {
        let labels: Vec<&str> = "localhost".split('.').collect();
        assert!(labels.len() < MIN_WINDOW);
    }
}
