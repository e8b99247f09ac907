//! Colors command handlers
//!
//! Every editing command loads the stored rules into the panel's staging
//! table, applies one row operation and saves the whole table back. A
//! failed load aborts the edit, since saving replaces the stored set.

use crate::cli::output::{format_colors_table, format_json};
use crate::cli::{ColorsImportArgs, ColorsRemoveArgs, ColorsSetArgs, OutputArgs};
use crate::colors::{ColorRule, SaveOutcome};
use crate::panel::Panel;
use std::fs;

fn saved_or_error(outcome: SaveOutcome, done: String) -> Result<String, Box<dyn std::error::Error>> {
    match outcome {
        SaveOutcome::Saved => Ok(done),
        SaveOutcome::Failed(reason) => Err(format!("Save Failed: {}", reason).into()),
    }
}

/// Handle `cellctl colors list` command
pub async fn handle_colors_list(args: &OutputArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    panel.reload_colors().await;
    let table = panel.color_table();

    if args.json {
        Ok(format_json("colors", table.rows())?)
    } else {
        Ok(format_colors_table(table.rows()))
    }
}

/// Handle `cellctl colors set` command
pub async fn handle_colors_set(args: &ColorsSetArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    panel
        .reload_colors_strict()
        .await
        .map_err(|e| format!("Cannot load color rules, nothing saved: {}", e))?;
    panel.edit_colors(|table| {
        table.upsert(ColorRule {
            name: args.color,
            action_id: args.action_id,
            duration_ms: args.duration_ms,
        })
    });

    saved_or_error(
        panel.save_colors().await,
        format!(
            "✓ {} → action {} for {}ms",
            args.color, args.action_id, args.duration_ms
        ),
    )
}

/// Handle `cellctl colors remove` command
pub async fn handle_colors_remove(
    args: &ColorsRemoveArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    panel
        .reload_colors_strict()
        .await
        .map_err(|e| format!("Cannot load color rules, nothing saved: {}", e))?;
    panel.edit_colors(|table| table.remove_color(args.color))?;

    saved_or_error(
        panel.save_colors().await,
        format!("✓ Removed rule for {}", args.color),
    )
}

/// Handle `cellctl colors import` command
pub async fn handle_colors_import(
    args: &ColorsImportArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(&args.file)
        .map_err(|e| format!("Cannot read {}: {}", args.file.display(), e))?;
    let rules: Vec<ColorRule> = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid rule file {}: {}", args.file.display(), e))?;

    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    let count = rules.len();
    panel.edit_colors(|table| table.replace(rules));

    saved_or_error(
        panel.save_colors().await,
        format!("✓ Imported {} color rules", count),
    )
}
