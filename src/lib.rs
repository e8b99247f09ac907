//! cellctl - control client for a camera-and-conveyor factory cell
//!
//! This library drives a factory-cell backend over HTTP: it starts and stops
//! the camera, turns detected object colors into conveyor actions published
//! through the backend's message-broker gateway, runs the PING/READY
//! handshake with each conveyor and edits the color → action rules.

pub mod broker;
pub mod camera;
pub mod cli;
pub mod client;
pub mod colors;
pub mod config;
pub mod conveyor;
pub mod detection;
pub mod indicator;
pub mod logging;
pub mod panel;
pub mod topic;
