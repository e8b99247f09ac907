//! CLI module for cellctl
//!
//! Command-line interface definitions and handlers for the factory-cell
//! control client.
//!
//! # Commands
//!
//! - `run` - Run the panel: camera, broker status and detection dispatch loops
//! - `ping` - Ping a conveyor and wait for READY
//! - `camera` - Start, stop and inspect the camera
//! - `colors` - Show and edit the color → action rules
//! - `status` - Show broker connectivity and conveyor feeds
//! - `estop` - Publish an emergency stop
//! - `publish` - Publish a raw broker message
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Run against a backend, dispatching actions to conveyor 0
//! cellctl run --base-url http://factory.local:5000 --conveyor 0_SmartConvey2025
//!
//! # Check that a conveyor answers
//! cellctl ping 1_SmartConvey2025
//!
//! # Generate shell completions
//! cellctl completions bash > ~/.bash_completion.d/cellctl
//! ```

pub mod camera;
pub mod colors;
pub mod completions;
pub mod config;
pub mod output;
pub mod ping;
pub mod publish;
pub mod run;
pub mod status;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::colors::ColorName;
use crate::config::PanelConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cellctl - factory cell control client
#[derive(Parser, Debug)]
#[command(
    name = "cellctl",
    version,
    about = "Control client for a camera-and-conveyor factory cell"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the panel until interrupted
    Run(RunArgs),
    /// Ping a conveyor and wait for READY
    Ping(PingArgs),
    /// Camera control
    #[command(subcommand)]
    Camera(CameraCommands),
    /// Color → action rules
    #[command(subcommand)]
    Colors(ColorsCommands),
    /// Show broker connectivity and conveyor feeds
    Status(StatusArgs),
    /// Publish an emergency stop
    Estop(ConnectionArgs),
    /// Publish a raw message on a broker topic
    Publish(PublishArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where to find the configuration and the backend.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "cellctl.toml")]
    pub config: PathBuf,

    /// Override backend base URL
    #[arg(short, long, env = "CELLCTL_BASE_URL")]
    pub base_url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CELLCTL_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl ConnectionArgs {
    /// Load the configuration file (defaults if missing), then apply
    /// `CELLCTL_*` variables, then these arguments.
    pub fn load_config(&self) -> Result<PanelConfig, Box<dyn std::error::Error>> {
        let mut config = if self.config.exists() {
            PanelConfig::load(Some(&self.config))?
        } else {
            PanelConfig::default()
        };

        config = config.with_env_overrides();

        if let Some(ref base_url) = self.base_url {
            config.backend.base_url = base_url.clone();
        }
        if let Some(ref log_level) = self.log_level {
            config.logging.level = log_level.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Load the configuration and install logging for a command.
    pub fn prepare(&self) -> Result<PanelConfig, Box<dyn std::error::Error>> {
        let config = self.load_config()?;
        if let Err(e) = crate::logging::init_tracing(&config.logging) {
            eprintln!("Warning: logging not initialized: {}", e);
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Conveyor that receives detection-driven actions
    #[arg(long)]
    pub conveyor: Option<String>,

    /// Do not start the camera on startup
    #[arg(long)]
    pub no_camera: bool,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Print a status report every N seconds (0 disables)
    #[arg(long, default_value = "10")]
    pub report_secs: u64,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Conveyor id, e.g. 0_SmartConvey2025
    pub conveyor: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Subcommand, Debug)]
pub enum CameraCommands {
    /// Ask the backend to start the camera
    Start(CameraStartArgs),
    /// Ask the backend to stop the camera
    Stop(ConnectionArgs),
    /// List capture devices
    List(OutputArgs),
    /// Show the current detections
    Detections(OutputArgs),
}

#[derive(Args, Debug)]
pub struct CameraStartArgs {
    /// USB camera index
    #[arg(long, conflicts_with = "rtsp")]
    pub usb: Option<u32>,

    /// RTSP stream URL
    #[arg(long)]
    pub rtsp: Option<String>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Subcommand, Debug)]
pub enum ColorsCommands {
    /// Show the stored rules
    List(OutputArgs),
    /// Set the action of a color, adding a rule if needed
    Set(ColorsSetArgs),
    /// Remove the rule of a color
    Remove(ColorsRemoveArgs),
    /// Replace all rules with the contents of a JSON file
    Import(ColorsImportArgs),
}

#[derive(Args, Debug)]
pub struct ColorsSetArgs {
    /// Color name (red, green, blue, yellow, orange, purple, pink)
    pub color: ColorName,

    /// Action id (1-10)
    pub action_id: u32,

    /// Action duration in milliseconds (2000-10000)
    pub duration_ms: u64,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct ColorsRemoveArgs {
    /// Color name
    pub color: ColorName,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct ColorsImportArgs {
    /// JSON file holding `[{name, action_id, duration_ms}, ...]`
    pub file: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also show the last message on each conveyor's status feed
    #[arg(long)]
    pub feeds: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Broker topic
    pub topic: String,

    /// Message text
    pub message: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "cellctl.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
