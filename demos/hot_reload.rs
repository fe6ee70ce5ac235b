//! Example demonstrating file watching and automatic hot-reload.
//!
//! This example shows how to:
//! - Wire up logging with `tracing-subscriber`
//! - Load a configuration file and reload it on every write
//! - Subscribe to reloaded snapshots
//! - Drain the error stream for reloads that failed after every retry
//! - Shut down with a cancellation token
//!
//! Run with: RUST_LOG=info cargo run --example hot_reload
//!
//! While running, try editing demos/config/hot_reload.yaml to see automatic reloads.

use hotreload_config::prelude::*;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct AppConfig {
    prometheus: PrometheusConfig,
}

#[derive(Debug, Deserialize)]
struct PrometheusConfig {
    enable: bool,
    port: u16,
    address: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = Path::new("demos/config/hot_reload.yaml");
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(
            config_path,
            r#"prometheus:
  enable: true
  port: 9090
  address: 0.0.0.0
"#,
        )?;
        println!("Created {}", config_path.display());
    }

    let manager = ConfigManager::<AppConfig>::builder()
        .with_file(config_path)
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(500))?)
        .with_span(tracing::info_span!("demo_config", path = %config_path.display()))
        .build()?;

    let shutdown = CancellationToken::new();
    manager.init(shutdown.clone()).await?;

    let _subscription = manager.subscribe(|cfg| {
        println!(
            "\n[Event] Reloaded: prometheus {} on {}:{}",
            if cfg.prometheus.enable { "enabled" } else { "disabled" },
            cfg.prometheus.address,
            cfg.prometheus.port
        );
    });

    let errors = manager.listen_for_errors();
    tokio::spawn(async move {
        while let Some(err) = errors.recv().await {
            eprintln!("[Error] Still serving the previous configuration: {}", err);
        }
    });

    let cfg = manager.get_config();
    println!("Current configuration:");
    println!(
        "  Prometheus: {}:{} (enabled: {})",
        cfg.prometheus.address, cfg.prometheus.port, cfg.prometheus.enable
    );
    println!(
        "\n===> Try editing {} to see automatic reloads! <===",
        config_path.display()
    );
    println!("Press Ctrl+C to exit\n");

    tokio::signal::ctrl_c().await?;
    shutdown.cancel();
    manager.wait_for_shutdown().await;

    println!("Watcher stopped");
    Ok(())
}
