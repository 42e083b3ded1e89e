use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::{
    comparison::DEFAULT_REFRESH_INTERVAL,
    engine::DEFAULT_IDLE_TIMEOUT,
    error::{config_error, Error},
    estimator::DEFAULT_LATENCY,
};

#[derive(Clone, Debug)]
pub struct Config {
    /// In-memory account store when unset.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
    pub refresh_interval: Duration,
    pub simulated_latency: Duration,
    /// Comparisons and cached connections untouched for this long are dropped.
    pub idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            simulated_latency: DEFAULT_LATENCY,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_vars(|name| env::var(name))
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let defaults = Self::default();

        let database_url = match lookup("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(url),
            Ok(_) | Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err.into()),
        };

        let refresh_secs: u64 = parse(
            &lookup,
            "REFRESH_INTERVAL_SECS",
            defaults.refresh_interval.as_secs(),
        )?;
        if refresh_secs == 0 {
            return Err(config_error());
        }

        let idle_secs: u64 = parse(&lookup, "IDLE_TIMEOUT_SECS", defaults.idle_timeout.as_secs())?;
        if idle_secs == 0 {
            return Err(config_error());
        }

        let latency_ms: u64 = parse(
            &lookup,
            "SIMULATED_LATENCY_MS",
            defaults.simulated_latency.as_millis() as u64,
        )?;

        Ok(Self {
            database_url,
            max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            listen_addr: parse(&lookup, "LISTEN_ADDR", defaults.listen_addr)?,
            refresh_interval: Duration::from_secs(refresh_secs),
            simulated_latency: Duration::from_millis(latency_ms),
            idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}

fn parse<T, F>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    F: Fn(&str) -> Result<String, env::VarError>,
{
    match lookup(name) {
        Ok(value) => value.trim().parse().map_err(|_| {
            tracing::error!("invalid value for {}: {:?}", name, value);
            config_error()
        }),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err.into()),
    }
}
