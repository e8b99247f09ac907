//! Publish and emergency-stop command handlers

use crate::cli::{ConnectionArgs, PublishArgs};
use crate::panel::Panel;
use colored::Colorize;

/// Handle `cellctl estop` command
pub async fn handle_estop(args: &ConnectionArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.prepare()?;
    let panel = Panel::new(config)?;

    panel.emergency_stop().await?;

    Ok(format!(
        "{} sent on topic {}",
        "EMERGENCY STOP".red().bold(),
        panel.config().broker.emergency_topic
    ))
}

/// Handle `cellctl publish` command
pub async fn handle_publish(args: &PublishArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    panel.broker().try_publish(&args.topic, &args.message).await?;

    Ok(format!("✓ Published to {}", args.topic))
}
