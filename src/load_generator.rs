use std::time::Duration;

use reqwest::Client;

// ─── Configuration ───────────────────────────────────────────────

/// Knobs for the request driver. The retry budget is deliberately
/// explicit: a backend that never comes up costs
/// `max_retries × retry_delay` per request, not forever.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Requests sent to each backend.
    pub requests_per_backend: u32,
    /// Pause between rounds.
    pub delay: Duration,
    /// Pause before retrying a refused connection.
    pub retry_delay: Duration,
    /// Connection-refusal retries per request before giving up.
    pub max_retries: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            requests_per_backend: 25,
            delay: Duration::from_millis(500),
            retry_delay: Duration::from_secs(1),
            max_retries: 10,
        }
    }
}

/// One backend the driver talks to: a display label and its ping URL.
pub struct Target {
    pub name: &'static str,
    pub url: String,
}

// ─── Public entry point ──────────────────────────────────────────

/// Issues the bounded burst: every round hits each target once, in
/// order, then sleeps. Blocks until the whole budget is spent.
pub async fn run(config: &DriverConfig, targets: &[Target]) {
    let client = Client::new();

    for round in 1..=config.requests_per_backend {
        for target in targets {
            match get_with_retry(&client, &target.url, config).await {
                Ok(body) => {
                    println!("{} response {round}: {body}", target.name);
                }
                Err(e) => {
                    println!(
                        "{} request {round} failed after {} retries: {e}",
                        target.name, config.max_retries,
                    );
                }
            }
        }
        tokio::time::sleep(config.delay).await;
    }

    println!();
    println!("Completed all requests. Shutting down...");
}

// ─── Retry loop ──────────────────────────────────────────────────

/// GET with a bounded sleep-and-retry on connection refusal. Any
/// other error (or retry exhaustion) is returned to the caller.
async fn get_with_retry(
    client: &Client,
    url: &str,
    config: &DriverConfig,
) -> Result<String, reqwest::Error> {
    let mut attempts = 0;
    loop {
        match client.get(url).send().await {
            Ok(response) => return response.text().await,
            Err(e) if e.is_connect() && attempts < config.max_retries => {
                attempts += 1;
                println!("Server not ready yet. Retrying...");
                tokio::time::sleep(config.retry_delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
