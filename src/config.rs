use std::str::FromStr;
use std::time::Duration;

use crate::load_generator::DriverConfig;

/// Process configuration: environment overrides on top of the
/// defaults (ports 3001/3002, 25 requests per backend, 500 ms
/// between rounds, up to 10 one-second retries on refusal).
#[derive(Debug, Clone)]
pub struct Config {
    pub raw_port: u16,
    pub framework_port: u16,
    pub driver: DriverConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = DriverConfig::default();
        Self {
            raw_port: env_or("PING_RAW_PORT", 3001),
            framework_port: env_or("PING_FRAMEWORK_PORT", 3002),
            driver: DriverConfig {
                requests_per_backend: env_or(
                    "PING_REQUESTS",
                    defaults.requests_per_backend,
                ),
                delay: Duration::from_millis(env_or(
                    "PING_DELAY_MS",
                    defaults.delay.as_millis() as u64,
                )),
                retry_delay: Duration::from_millis(env_or(
                    "PING_RETRY_DELAY_MS",
                    defaults.retry_delay.as_millis() as u64,
                )),
                max_retries: env_or("PING_MAX_RETRIES", defaults.max_retries),
            },
        }
    }
}

/// Unset or unparseable variables fall back silently to the default.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_missing_or_garbage() {
        assert_eq!(env_or("PING_TEST_UNSET_VARIABLE", 3001u16), 3001);
        std::env::set_var("PING_TEST_GARBAGE", "not-a-port");
        assert_eq!(env_or("PING_TEST_GARBAGE", 3001u16), 3001);
        std::env::set_var("PING_TEST_VALID", "4242");
        assert_eq!(env_or("PING_TEST_VALID", 3001u16), 4242);
    }
}
