//! Camera command handlers

use crate::camera::CameraSource;
use crate::cli::output::{format_cameras_table, format_detections_table, format_json};
use crate::cli::{CameraStartArgs, ConnectionArgs, OutputArgs};
use crate::detection::{render, Detection};
use crate::panel::Panel;

/// Source chosen on the command line, falling back to the configuration.
pub fn resolve_source(args: &CameraStartArgs, config: &crate::config::CameraConfig) -> CameraSource {
    match (&args.rtsp, args.usb) {
        (Some(url), _) => CameraSource::Rtsp(url.trim().to_string()),
        (None, Some(index)) => CameraSource::Usb(index),
        (None, None) => CameraSource::from_config(config),
    }
}

/// Handle `cellctl camera start` command
pub async fn handle_camera_start(
    args: &CameraStartArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let source = resolve_source(args, &config.camera);
    let panel = Panel::new(config)?;

    panel.start_camera(&source).await?;

    let stream = panel.camera().stream_url().unwrap_or_default();
    Ok(format!(
        "{} ({})\n  Stream: {}",
        panel.camera().indicator().render(),
        source,
        stream
    ))
}

/// Handle `cellctl camera stop` command
pub async fn handle_camera_stop(
    args: &ConnectionArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.prepare()?;
    let panel = Panel::new(config)?;

    panel.stop_camera().await;
    Ok(panel.camera().indicator().render())
}

/// Handle `cellctl camera list` command
pub async fn handle_camera_list(args: &OutputArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let panel = Panel::new(config)?;

    let cameras = panel.camera().list_cameras().await;

    if args.json {
        Ok(format_json("cameras", &cameras)?)
    } else {
        Ok(format_cameras_table(&cameras))
    }
}

/// Handle `cellctl camera detections` command
///
/// Shows what the detector currently sees without dispatching anything.
pub async fn handle_camera_detections(
    args: &OutputArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let config = args.connection.prepare()?;
    let fallback = config.dispatch.fallback_colors;
    let panel = Panel::new(config)?;

    let mut detections = panel.detection().fetch().await?;
    if fallback {
        detections = detections.into_iter().map(Detection::with_fallback).collect();
    }
    let views = render(&detections);

    if args.json {
        Ok(format_json("detections", &views)?)
    } else {
        Ok(format_detections_table(&views))
    }
}
