use std::sync::Arc;
use std::time::Duration;

mod config;
mod load_generator;
mod metrics;
mod server;

use config::Config;
use load_generator::Target;
use metrics::{MetricsAggregator, MetricsPipeline, SnapshotReporter};

#[tokio::main]
async fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════╗");
    println!("║   🏓  DUAL-BACKEND PING THROUGHPUT BENCH         ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    // ── 1. Configuration ─────────────────────────────────────────
    let config = Config::from_env();

    // ── 2. One shared metrics pipeline for both backends ─────────
    let pipeline = Arc::new(MetricsPipeline::new(
        MetricsAggregator::new(),
        SnapshotReporter::stdout(),
    ));

    // ── 3. Spawn the two server adapters ─────────────────────────
    let raw = tokio::spawn(server::raw::serve(config.raw_port, pipeline.clone()));
    let framework = tokio::spawn(server::framework::serve(
        config.framework_port,
        pipeline.clone(),
    ));

    // Give both listeners a moment to bind; the driver's retry loop
    // covers any stragglers.
    tokio::time::sleep(Duration::from_millis(200)).await;

    // ── 4. Drive the bounded burst against both backends ─────────
    let targets = [
        Target {
            name: "Framework",
            url: format!("http://localhost:{}/ping", config.framework_port),
        },
        Target {
            name: "Raw HTTP",
            url: format!("http://localhost:{}/ping", config.raw_port),
        },
    ];
    load_generator::run(&config.driver, &targets).await;

    // ── 5. Final snapshot, then exit ─────────────────────────────
    let snap = pipeline.snapshot();
    println!(
        "Final tally: {} requests ({} ok / {} failed) in {:.1}s",
        snap.total_requests,
        snap.successful_requests,
        snap.failed_requests,
        snap.uptime_secs,
    );
    println!("Servers have processed the requests. Exiting.");

    raw.abort();
    framework.abort();
}
