//! Boundary to the host operating system's wireless management facility.

use crate::error::{WifiError, WifiResult};
use crate::wifi::types::{Channel, EventCategory, Network, PhyMode, WifiEvent};
use std::sync::Arc;

/// Callback invoked by a platform for every delivered event.
///
/// Platforms call it on whatever thread their notification mechanism uses.
pub type EventSink = Arc<dyn Fn(WifiEvent) + Send + Sync>;

/// A single wireless interface.
///
/// Each property read returns `WifiError::PropertyUnavailable` when the value
/// is absent (for example the SSID while disassociated).
pub trait WifiInterface: Send + Sync {
    fn name(&self) -> &str;
    fn ssid(&self) -> WifiResult<String>;
    fn bssid(&self) -> WifiResult<String>;
    fn rssi(&self) -> WifiResult<i32>;
    fn transmit_rate(&self) -> WifiResult<f64>;
    fn channel(&self) -> WifiResult<Channel>;
    fn hardware_address(&self) -> WifiResult<String>;
    fn phy_mode(&self) -> WifiResult<PhyMode>;

    /// Blocking scan for nearby networks
    fn scan(&self) -> WifiResult<Vec<Network>>;
}

/// Interface enumeration and event subscription
pub trait WifiPlatform: Send + Sync {
    fn default_interface(&self) -> Option<Arc<dyn WifiInterface>>;

    fn interface_names(&self) -> Vec<String>;

    /// Subscribe to `categories` in one batch. On error the platform may be
    /// left holding part of the batch.
    fn start_monitoring(&self, categories: &[EventCategory], sink: EventSink) -> WifiResult<()>;

    /// Drop every subscription in one batch
    fn stop_monitoring(&self) -> WifiResult<()>;
}

/// The platform for the target this binary was built for
pub fn native() -> Arc<dyn WifiPlatform> {
    #[cfg(windows)]
    {
        Arc::new(crate::wifi::windows::WlanPlatform::new())
    }
    #[cfg(target_os = "linux")]
    {
        Arc::new(crate::wifi::linux::LinuxPlatform::new())
    }
    #[cfg(not(any(windows, target_os = "linux")))]
    {
        Arc::new(UnsupportedPlatform)
    }
}

/// Stand-in for targets without a backend: no interfaces, no events
#[cfg_attr(any(windows, target_os = "linux"), allow(dead_code))]
#[derive(Debug, Default)]
pub struct UnsupportedPlatform;

impl WifiPlatform for UnsupportedPlatform {
    fn default_interface(&self) -> Option<Arc<dyn WifiInterface>> {
        None
    }

    fn interface_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn start_monitoring(&self, _categories: &[EventCategory], _sink: EventSink) -> WifiResult<()> {
        Err(WifiError::failed(
            "start monitoring",
            "no WiFi backend for this platform",
        ))
    }

    fn stop_monitoring(&self) -> WifiResult<()> {
        Ok(())
    }
}
