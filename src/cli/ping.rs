//! Ping command implementation

use crate::cli::output::readiness_label;
use crate::cli::PingArgs;
use crate::conveyor::{wait_for_outcome, ReadinessStatus};
use crate::panel::Panel;
use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Serialize)]
pub struct PingReport {
    pub conveyor: String,
    pub status: ReadinessStatus,
    pub elapsed_ms: u64,
}

fn format_ping_pretty(report: &PingReport) -> String {
    format!(
        "{}: {} after {}ms",
        report.conveyor,
        readiness_label(report.status),
        report.elapsed_ms
    )
}

/// Handle `cellctl ping` command
///
/// Anything but READY is an error, unless JSON output was requested.
pub async fn handle_ping(args: &PingArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    let start = Instant::now();
    let status = wait_for_outcome(panel.ping(&args.conveyor)).await;
    let report = PingReport {
        conveyor: args.conveyor.clone(),
        status,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    panel.shutdown().await;

    if args.json {
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    if report.status == ReadinessStatus::Ready {
        Ok(format_ping_pretty(&report))
    } else {
        Err(format!(
            "Conveyor {} did not report READY: {} after {}ms",
            report.conveyor, report.status, report.elapsed_ms
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ping_pretty() {
        let report = PingReport {
            conveyor: "c1".to_string(),
            status: ReadinessStatus::Ready,
            elapsed_ms: 1500,
        };
        let output = format_ping_pretty(&report);
        assert!(output.starts_with("c1: "));
        assert!(output.contains("READY"));
        assert!(output.contains("1500ms"));
    }

    #[test]
    fn test_report_serializes_status() {
        let report = PingReport {
            conveyor: "c1".to_string(),
            status: ReadinessStatus::Timeout,
            elapsed_ms: 5000,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "TIMEOUT");
    }
}
