//! Run command: keep the panel alive until interrupted.

use crate::cli::output::format_snapshot;
use crate::cli::RunArgs;
use crate::config::PanelConfig;
use crate::panel::Panel;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Apply the run-specific overrides on top of the loaded configuration.
pub fn apply_run_overrides(mut config: PanelConfig, args: &RunArgs) -> PanelConfig {
    if args.no_camera {
        config.camera.auto_start = false;
    }
    config
}

/// Conveyor that receives actions: the argument, else the first configured one.
pub fn initial_conveyor(config: &PanelConfig, args: &RunArgs) -> Option<String> {
    args.conveyor
        .clone()
        .or_else(|| config.broker.conveyors.first().cloned())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
pub async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = cancel_token.cancelled() => {}
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Handle `cellctl run` command
pub async fn run_panel(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = apply_run_overrides(args.connection.prepare()?, &args);
    let conveyor = initial_conveyor(&config, &args);
    let panel = Panel::new(config)?;

    let report = panel.init().await;
    if let Err(e) = &report.camera {
        eprintln!("Warning: camera not running, detection paused: {}", e);
    }
    if report.broker_connected.is_none() {
        eprintln!("Warning: broker status unavailable");
    }

    panel.select_conveyor(conveyor.as_deref());
    panel.start_polling();

    let cancel_token = CancellationToken::new();
    let signal = tokio::spawn(shutdown_signal(cancel_token.clone()));

    if let Some(secs) = args.duration_secs {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            token.cancel();
        });
    }

    tracing::info!(conveyor = ?conveyor, "Panel running, press Ctrl+C to stop");

    if args.report_secs > 0 {
        let period = Duration::from_secs(args.report_secs);
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => {
                    println!("{}", format_snapshot(&panel.snapshot(), 5));
                }
            }
        }
    } else {
        cancel_token.cancelled().await;
    }

    panel.shutdown().await;
    if panel.camera().is_running() {
        panel.stop_camera().await;
    }
    signal.await?;

    println!("{}", format_snapshot(&panel.snapshot(), 10));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConnectionArgs;
    use std::path::PathBuf;

    fn run_args(conveyor: Option<&str>, no_camera: bool) -> RunArgs {
        RunArgs {
            connection: ConnectionArgs {
                config: PathBuf::from("cellctl.toml"),
                base_url: None,
                log_level: None,
            },
            conveyor: conveyor.map(str::to_string),
            no_camera,
            duration_secs: None,
            report_secs: 0,
        }
    }

    #[test]
    fn test_no_camera_disables_auto_start() {
        let config = apply_run_overrides(PanelConfig::default(), &run_args(None, true));
        assert!(!config.camera.auto_start);
    }

    #[test]
    fn test_initial_conveyor_defaults_to_first() {
        let config = PanelConfig::default();
        assert_eq!(
            initial_conveyor(&config, &run_args(None, false)).as_deref(),
            Some("0_SmartConvey2025")
        );
        assert_eq!(
            initial_conveyor(&config, &run_args(Some("c9"), false)).as_deref(),
            Some("c9")
        );
    }

    #[tokio::test]
    async fn test_shutdown_signal_returns_on_cancel() {
        let token = CancellationToken::new();
        let handle = tokio::spawn(shutdown_signal(token.clone()));

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
