//! WiFi status module for wifiglance
//!
//! This module reads the status of the default wireless interface, scans for
//! nearby networks and forwards platform WiFi events to a single callback.

#[cfg(test)]
pub mod fake;
#[cfg(target_os = "linux")]
mod linux;
mod monitor;
mod platform;
mod reader;
mod types;
#[cfg(windows)]
mod windows;

// Re-export public API
pub use monitor::{EventMonitor, MonitorState};
pub use platform::{WifiPlatform, native};
pub use reader::StatusReader;
pub use types::{InterfaceSnapshot, Network, WifiEvent};
#[cfg(test)]
pub use types::{ChannelBand, WifiEventKind};
