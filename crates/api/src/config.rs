use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const ENV_PORT: &str = "MOVESCHED__SERVER__PORT";
const ENV_BODY_LIMIT: &str = "MOVESCHED__SERVER__BODY_LIMIT_BYTES";
const ENV_TIMEOUT: &str = "MOVESCHED__SERVER__REQUEST_TIMEOUT_SECS";
const ENV_MAX_ITERATIONS: &str = "MOVESCHED__SCHEDULER__MAX_ITERATIONS";
const ENV_RETAINED_JOBS: &str = "MOVESCHED__JOBS__RETAIN_FINISHED";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub body_limit_bytes: usize,
    pub request_timeout_secs: u64,
    /// Upper bound on `params.sequenceIterations` accepted from clients.
    pub max_sequence_iterations: u32,
    pub retained_jobs: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            body_limit_bytes: 2 * 1024 * 1024,
            request_timeout_secs: 30,
            max_sequence_iterations: 100_000,
            retained_jobs: jobs::DEFAULT_RETAINED_JOBS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        override_from(&lookup, ENV_PORT, &mut cfg.port)?;
        override_from(&lookup, ENV_BODY_LIMIT, &mut cfg.body_limit_bytes)?;
        override_from(&lookup, ENV_TIMEOUT, &mut cfg.request_timeout_secs)?;
        override_from(&lookup, ENV_MAX_ITERATIONS, &mut cfg.max_sequence_iterations)?;
        override_from(&lookup, ENV_RETAINED_JOBS, &mut cfg.retained_jobs)?;
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn override_from<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) -> anyhow::Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw}: {e}"))?;
    }
    Ok(())
}
