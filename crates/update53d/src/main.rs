// # update53 - Route 53 dynamic DNS updater
//
// Thin integration layer. All update logic lives in update53-core; this
// binary only:
// 1. Parses flags and `UPDATE53_*` environment variables
// 2. Initializes logging and the runtime
// 3. Builds the address sources and the Route 53 provider
// 4. Runs one update, or the daemon loop until SIGTERM/SIGINT
//
// ## Example
//
// ```bash
// update53 --hostname home.example.com --get-ip https://checkip.amazonaws.com
//
// export UPDATE53_HOSTNAME=home.example.com
// export UPDATE53_HOSTED_ZONE=Z123
// update53 --daemon --verbose
// ```

mod cli;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use update53_core::{AddressSources, DaemonLoop, UpdateConfig, UpdateOrchestrator};
use update53_ip_http::{HttpAddressSource, MetadataAddressSource};
use update53_provider_route53::{DEFAULT_OPERATION_TIMEOUT, Route53Provider};

use cli::Cli;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown, including a single update whose cycle failed
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum Update53ExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<Update53ExitCode> for ExitCode {
    fn from(code: Update53ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn log_level(config: &UpdateConfig) -> Level {
    if config.debug {
        Level::DEBUG
    } else if config.is_verbose() {
        Level::INFO
    } else {
        Level::WARN
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.to_config();

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        return Update53ExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Update53ExitCode::ConfigError.into();
    }

    info!("Starting update53 for {}", config.hostname);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Update53ExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run(&cli, config).await {
            Ok(()) => Update53ExitCode::CleanShutdown,
            Err(e) => {
                error!("update53 error: {:#}", e);
                match e.downcast_ref::<update53_core::Error>() {
                    Some(err) if err.is_config() => Update53ExitCode::ConfigError,
                    _ => Update53ExitCode::RuntimeError,
                }
            }
        }
    });

    result.into()
}

/// Wire the sources and the provider, then drive the loop to completion
async fn run(cli: &Cli, config: UpdateConfig) -> Result<()> {
    let timeout = Duration::from_secs(cli.http_timeout);

    let metadata = Arc::new(MetadataAddressSource::with_endpoint(
        cli.metadata_endpoint.as_str(),
        timeout,
    ));
    let mut sources = AddressSources::metadata(metadata);
    if let Some(url) = config.ip_source_url() {
        sources = sources.with_url(Arc::new(HttpAddressSource::with_timeout(url, timeout)));
    }

    let provider = Arc::new(Route53Provider::from_env(DEFAULT_OPERATION_TIMEOUT, cli.dry_run).await);

    let orchestrator = UpdateOrchestrator::new(config, sources, provider)?;

    // Nothing here consumes lifecycle events; logging covers them
    let (daemon, events) = DaemonLoop::new(orchestrator);
    drop(events);

    daemon.run_until(wait_for_shutdown()).await?;
    Ok(())
}

/// Wait for SIGTERM or SIGINT and return the signal name
#[cfg(unix)]
async fn wait_for_shutdown() -> String {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to set up signal handlers, using Ctrl-C only: {}", e);
                return wait_for_ctrl_c().await;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM".to_string(),
        _ = sigint.recv() => "SIGINT".to_string(),
    }
}

/// Fallback for non-Unix platforms
#[cfg(not(unix))]
async fn wait_for_shutdown() -> String {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> String {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT".to_string(),
        Err(e) => {
            // Without a handler the process is stopped by the OS instead
            error!("Failed to wait for Ctrl-C: {}", e);
            std::future::pending().await
        }
    }
}
