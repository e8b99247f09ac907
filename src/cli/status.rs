//! Status command implementation

use crate::broker::Broker;
use crate::cli::output::{format_feeds_table, FeedView};
use crate::cli::StatusArgs;
use crate::panel::Panel;
use crate::topic::{feed_topic, Feed};
use serde_json::json;
use std::fmt::Write;

/// Handle `cellctl status` command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    panel.refresh_broker_status().await;

    let mut feeds = Vec::new();
    if args.feeds {
        for conveyor in &panel.config().broker.conveyors {
            let topic = feed_topic(&panel.config().broker, conveyor, Feed::Status);
            let last_message = panel
                .broker()
                .poll_last_message(&topic)
                .await
                .map(|message| message.as_text().into_owned());
            feeds.push(FeedView {
                conveyor: conveyor.clone(),
                topic,
                last_message,
            });
        }
    }

    let broker = panel.broker_indicator();
    let conveyors = &panel.config().broker.conveyors;

    if args.json {
        return Ok(serde_json::to_string_pretty(&json!({
            "backend": panel.config().backend.base_url,
            "broker": broker,
            "conveyors": conveyors,
            "feeds": feeds,
        }))?);
    }

    let mut output = String::new();
    writeln!(output, "Backend:   {}", panel.config().backend.base_url)?;
    writeln!(output, "Broker:    {}", broker.render())?;
    writeln!(output, "Conveyors: {}", conveyors.join(", "))?;
    if !feeds.is_empty() {
        writeln!(output)?;
        writeln!(output, "{}", format_feeds_table(&feeds))?;
    }
    Ok(output.trim_end().to_string())
}
