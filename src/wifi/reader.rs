use crate::config;
use crate::error::{WifiError, WifiResult};
use crate::wifi::platform::{WifiInterface, WifiPlatform};
use crate::wifi::types::{ChannelBand, ChannelWidth, InterfaceSnapshot, Network, PhyMode};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the status of the interface that was the default when it was built.
///
/// The binding is never re-resolved, even if the platform's default interface
/// changes later.
#[derive(Clone)]
pub struct StatusReader {
    interface: Arc<dyn WifiInterface>,
}

impl std::fmt::Debug for StatusReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReader")
            .field("interface", &self.interface.name())
            .finish()
    }
}

fn or_sentinel<T>(result: WifiResult<T>, sentinel: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(WifiError::PropertyUnavailable { property }) => {
            debug!(property, "property unavailable, using sentinel");
            sentinel()
        }
        Err(err) => {
            debug!(error = %err, "property read failed, using sentinel");
            sentinel()
        }
    }
}

impl StatusReader {
    pub fn new(platform: &dyn WifiPlatform) -> WifiResult<Self> {
        let interface = platform
            .default_interface()
            .ok_or(WifiError::NoDefaultInterface)?;
        debug!(interface = interface.name(), "bound status reader");
        Ok(Self { interface })
    }

    pub fn interface_name(&self) -> &str {
        self.interface.name()
    }

    /// Read every property fresh; unavailable values become their sentinels
    pub fn current_snapshot(&self) -> InterfaceSnapshot {
        let interface = self.interface.as_ref();
        let (channel_number, channel_width, channel_band) = or_sentinel(
            interface
                .channel()
                .map(|channel| (channel.number, channel.width, channel.band)),
            || {
                (
                    config::DEFAULT_CHANNEL,
                    ChannelWidth::Unknown,
                    ChannelBand::Unknown,
                )
            },
        );

        InterfaceSnapshot {
            ssid: or_sentinel(interface.ssid(), || config::SSID_NOT_CONNECTED.to_string()),
            bssid: or_sentinel(interface.bssid().map(|b| b.to_uppercase()), || {
                config::BSSID_UNKNOWN.to_string()
            }),
            rssi_dbm: or_sentinel(interface.rssi(), || config::DEFAULT_RSSI_DBM),
            transmit_rate_mbps: or_sentinel(interface.transmit_rate(), || {
                config::DEFAULT_TRANSMIT_RATE_MBPS
            }),
            channel_number,
            channel_width,
            channel_band,
            hardware_address: or_sentinel(
                interface.hardware_address().map(|mac| mac.to_uppercase()),
                || config::ZERO_MAC.to_string(),
            ),
            phy_mode: or_sentinel(interface.phy_mode(), || PhyMode::Unknown),
        }
    }

    /// Blocking scan. Platform failures are logged and yield an empty set.
    pub fn scan_networks(&self) -> HashSet<Network> {
        match self.interface.scan() {
            Ok(networks) => networks.into_iter().collect(),
            Err(err) => {
                warn!(interface = self.interface.name(), error = %err, "network scan failed");
                HashSet::new()
            }
        }
    }
}
