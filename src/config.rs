use log::warn;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// One of the read-only fetches the sync loop can run every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTarget {
    Chain,
    Pending,
    Stats,
    Balances,
}

impl FromStr for SyncTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chain" => Ok(SyncTarget::Chain),
            "pending" => Ok(SyncTarget::Pending),
            "stats" => Ok(SyncTarget::Stats),
            "balances" => Ok(SyncTarget::Balances),
            other => Err(format!("unknown sync target '{other}'")),
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncTarget::Chain => "chain",
            SyncTarget::Pending => "pending",
            SyncTarget::Stats => "stats",
            SyncTarget::Balances => "balances",
        };
        f.write_str(name)
    }
}

pub const DEFAULT_SYNC_TARGETS: [SyncTarget; 3] =
    [SyncTarget::Chain, SyncTarget::Pending, SyncTarget::Stats];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ledger_url: String,
    pub poll_interval: Duration,
    pub status_display: Duration,
    pub request_timeout: Duration,
    pub wallet_store_path: PathBuf,
    pub sync_targets: Vec<SyncTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ledger_url: "http://127.0.0.1:5000".to_string(),
            poll_interval: Duration::from_secs(5),
            status_display: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            wallet_store_path: PathBuf::from("wallets.json"),
            sync_targets: DEFAULT_SYNC_TARGETS.to_vec(),
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup; missing keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or("PORT", lookup("PORT"), defaults.port);
        let ledger_url = lookup("LEDGER_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.ledger_url);

        let poll_interval = secs_or(
            "POLL_INTERVAL_SECS",
            lookup("POLL_INTERVAL_SECS"),
            defaults.poll_interval,
        );
        let status_display = secs_or(
            "MINING_STATUS_SECS",
            lookup("MINING_STATUS_SECS"),
            defaults.status_display,
        );
        let request_timeout = secs_or(
            "REQUEST_TIMEOUT_SECS",
            lookup("REQUEST_TIMEOUT_SECS"),
            defaults.request_timeout,
        );

        let wallet_store_path = lookup("WALLET_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.wallet_store_path);

        let sync_targets = match lookup("SYNC_TARGETS") {
            Some(raw) => parse_targets(&raw)?,
            None => defaults.sync_targets,
        };

        Ok(Self {
            host,
            port,
            ledger_url,
            poll_interval,
            status_display,
            request_timeout,
            wallet_store_path,
            sync_targets,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("{key}={v} is not valid, using default");
            default
        }),
        None => default,
    }
}

fn secs_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let secs: u64 = parse_or(key, raw, default.as_secs());
    if secs == 0 {
        warn!("{key} must be greater than zero, using default");
        return default;
    }
    Duration::from_secs(secs)
}

fn parse_targets(raw: &str) -> Result<Vec<SyncTarget>, String> {
    let mut targets = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let target: SyncTarget = part.parse()?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}
