use std::env;

/// Store connection + per-binary tuning, loaded from environment variables.
///
/// The Manager and the Feeder each use a subset of these fields; the
/// `*_from_env` constructors fill only what their binary needs, matching
/// the store-endpoint trio mandated by the worker lifecycle contract
/// (`STORE_HOST`, `STORE_USER`, `STORE_PASSWORD`).
#[derive(Debug, Clone)]
pub struct Config {
    pub store_host: String,
    pub store_user: String,
    pub store_password: String,

    pub manager_host: String,
    pub manager_port: u16,

    pub feeder_mode: FeederMode,
    pub feeder_jitter_min_ms: u64,
    pub feeder_jitter_max_ms: u64,
    pub feeder_reclaim_after_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederMode {
    Daemon,
    Oneshot,
}

impl Config {
    /// Load config for the Manager (ingress) binary.
    pub fn manager_from_env() -> Self {
        Self {
            store_host: required_env("STORE_HOST"),
            store_user: required_env("STORE_USER"),
            store_password: required_env("STORE_PASSWORD"),
            manager_host: env::var("MANAGER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            manager_port: env::var("MANAGER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("MANAGER_PORT must be a number"),
            feeder_mode: FeederMode::Daemon,
            feeder_jitter_min_ms: 0,
            feeder_jitter_max_ms: 0,
            feeder_reclaim_after_secs: 0,
        }
    }

    /// Load config for the Feeder (worker) binary.
    pub fn feeder_from_env() -> Self {
        let feeder_mode = match env::var("FEEDER_MODE").ok().as_deref() {
            Some("oneshot") => FeederMode::Oneshot,
            _ => FeederMode::Daemon,
        };
        Self {
            store_host: required_env("STORE_HOST"),
            store_user: required_env("STORE_USER"),
            store_password: required_env("STORE_PASSWORD"),
            manager_host: String::new(),
            manager_port: 0,
            feeder_mode,
            feeder_jitter_min_ms: env_u64("FEEDER_JITTER_MIN_MS", 1_000),
            feeder_jitter_max_ms: env_u64("FEEDER_JITTER_MAX_MS", 5_000),
            feeder_reclaim_after_secs: env_u64("FEEDER_RECLAIM_AFTER_SECS", 0),
        }
    }

    /// Log only the shape of sensitive env vars, never their value.
    pub fn log_redacted(&self) {
        let vars = [
            ("STORE_HOST", &self.store_host),
            ("STORE_USER", &self.store_user),
            ("STORE_PASSWORD", &self.store_password),
        ];
        for (name, value) in vars {
            if value.is_empty() {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({} chars)", value.len());
            }
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
