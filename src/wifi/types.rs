use crate::config;
use std::fmt;

/// Spectrum width of the active channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelWidth {
    Mhz20,
    Mhz40,
    Mhz80,
    Mhz160,
    #[default]
    Unknown,
}

impl fmt::Display for ChannelWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelWidth::Mhz20 => "20MHz",
            ChannelWidth::Mhz40 => "40MHz",
            ChannelWidth::Mhz80 => "80MHz",
            ChannelWidth::Mhz160 => "160MHz",
            ChannelWidth::Unknown => "Unknown",
        })
    }
}

/// Frequency range of the active channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelBand {
    Ghz2,
    Ghz5,
    #[default]
    Unknown,
}

impl ChannelBand {
    pub fn from_frequency_mhz(freq: u32) -> Self {
        match freq {
            2400..=2500 => ChannelBand::Ghz2,
            4900..=5900 => ChannelBand::Ghz5,
            _ => ChannelBand::Unknown,
        }
    }
}

impl fmt::Display for ChannelBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelBand::Ghz2 => "2GHz",
            ChannelBand::Ghz5 => "5GHz",
            ChannelBand::Unknown => "Unknown",
        })
    }
}

/// The 802.11 physical-layer standard in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhyMode {
    A,
    B,
    G,
    N,
    Ac,
    #[default]
    Unknown,
}

impl fmt::Display for PhyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhyMode::A => "802.11a",
            PhyMode::B => "802.11b",
            PhyMode::G => "802.11g",
            PhyMode::N => "802.11n",
            PhyMode::Ac => "802.11ac",
            PhyMode::Unknown => "Unknown",
        })
    }
}

/// Map a center frequency in MHz to its channel number
pub fn channel_from_frequency_mhz(freq: u32) -> Option<u32> {
    match freq {
        2484 => Some(14),
        2412..=2472 => Some((freq - 2407) / 5),
        4915..=4980 => Some((freq - 4000) / 5),
        5000..=5900 => Some((freq - 5000) / 5),
        5955..=7115 => Some((freq - 5950) / 5),
        _ => None,
    }
}

/// Channel descriptor as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub number: u32,
    pub width: ChannelWidth,
    pub band: ChannelBand,
}

/// Point-in-time view of the bound wireless interface.
///
/// Every field holds either a real value or its sentinel; a snapshot is never
/// partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSnapshot {
    pub ssid: String,
    pub bssid: String,
    pub rssi_dbm: i32,
    pub transmit_rate_mbps: f64,
    pub channel_number: u32,
    pub channel_width: ChannelWidth,
    pub channel_band: ChannelBand,
    pub hardware_address: String,
    pub phy_mode: PhyMode,
}

impl Default for InterfaceSnapshot {
    fn default() -> Self {
        Self {
            ssid: config::SSID_NOT_CONNECTED.to_string(),
            bssid: config::BSSID_UNKNOWN.to_string(),
            rssi_dbm: config::DEFAULT_RSSI_DBM,
            transmit_rate_mbps: config::DEFAULT_TRANSMIT_RATE_MBPS,
            channel_number: config::DEFAULT_CHANNEL,
            channel_width: ChannelWidth::Unknown,
            channel_band: ChannelBand::Unknown,
            hardware_address: config::ZERO_MAC.to_string(),
            phy_mode: PhyMode::Unknown,
        }
    }
}

impl InterfaceSnapshot {
    pub fn is_connected(&self) -> bool {
        self.ssid != config::SSID_NOT_CONNECTED
    }

    /// Labelled display values, in presentation order
    pub fn fields(&self) -> [(&'static str, String); 9] {
        [
            ("SSID", self.ssid.clone()),
            ("BSSID", self.bssid.clone()),
            ("RSSI", format!("{} dBm", self.rssi_dbm)),
            ("Tx Rate", format!("{} Mbps", self.transmit_rate_mbps)),
            ("Channel", self.channel_number.to_string()),
            ("Channel Width", self.channel_width.to_string()),
            ("Channel Band", self.channel_band.to_string()),
            ("Hardware Address", self.hardware_address.clone()),
            ("PHY Mode", self.phy_mode.to_string()),
        ]
    }
}

impl fmt::Display for InterfaceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.fields() {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

/// A network found by a scan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Network {
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub rssi_dbm: i32,
    pub channel_number: u32,
    pub channel_band: ChannelBand,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<32} {:<17} {:>4} dBm  ch {:<3} {}",
            self.ssid.as_deref().unwrap_or("<hidden>"),
            self.bssid.as_deref().unwrap_or(config::BSSID_UNKNOWN),
            self.rssi_dbm,
            self.channel_number,
            self.channel_band,
        )
    }
}

/// Subscription keys for platform WiFi events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    BssidChanged,
    SsidChanged,
    LinkChanged,
    LinkQualityChanged,
    CountryCodeChanged,
    ModeChanged,
    PowerStateChanged,
    ScanCacheUpdated,
    ConnectionInterrupted,
    ConnectionInvalidated,
    VirtualInterfaceStateChanged,
}

impl EventCategory {
    /// The fixed batch subscribed by the event monitor
    pub const ALL: [EventCategory; 11] = [
        EventCategory::BssidChanged,
        EventCategory::SsidChanged,
        EventCategory::LinkChanged,
        EventCategory::LinkQualityChanged,
        EventCategory::CountryCodeChanged,
        EventCategory::ModeChanged,
        EventCategory::PowerStateChanged,
        EventCategory::ScanCacheUpdated,
        EventCategory::ConnectionInterrupted,
        EventCategory::ConnectionInvalidated,
        EventCategory::VirtualInterfaceStateChanged,
    ];
}

/// A WiFi event, as delivered to the monitor callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WifiEventKind {
    BssidChanged,
    SsidChanged,
    LinkChanged,
    LinkQualityChanged { rssi_dbm: i32, transmit_rate_mbps: f64 },
    CountryCodeChanged,
    ModeChanged,
    PowerStateChanged,
    ScanCacheUpdated,
    ConnectionInterrupted,
    ConnectionInvalidated,
    VirtualInterfaceStateChanged,
}

impl WifiEventKind {
    pub fn category(&self) -> EventCategory {
        match self {
            WifiEventKind::BssidChanged => EventCategory::BssidChanged,
            WifiEventKind::SsidChanged => EventCategory::SsidChanged,
            WifiEventKind::LinkChanged => EventCategory::LinkChanged,
            WifiEventKind::LinkQualityChanged { .. } => EventCategory::LinkQualityChanged,
            WifiEventKind::CountryCodeChanged => EventCategory::CountryCodeChanged,
            WifiEventKind::ModeChanged => EventCategory::ModeChanged,
            WifiEventKind::PowerStateChanged => EventCategory::PowerStateChanged,
            WifiEventKind::ScanCacheUpdated => EventCategory::ScanCacheUpdated,
            WifiEventKind::ConnectionInterrupted => EventCategory::ConnectionInterrupted,
            WifiEventKind::ConnectionInvalidated => EventCategory::ConnectionInvalidated,
            WifiEventKind::VirtualInterfaceStateChanged => {
                EventCategory::VirtualInterfaceStateChanged
            }
        }
    }

    /// Whether the displayed status should be re-read after this event
    pub fn refreshes_status(&self) -> bool {
        matches!(
            self,
            WifiEventKind::BssidChanged
                | WifiEventKind::SsidChanged
                | WifiEventKind::LinkChanged
                | WifiEventKind::LinkQualityChanged { .. }
                | WifiEventKind::ModeChanged
        )
    }
}

impl fmt::Display for WifiEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WifiEventKind::BssidChanged => f.write_str("BSSID changed"),
            WifiEventKind::SsidChanged => f.write_str("SSID changed"),
            WifiEventKind::LinkChanged => f.write_str("link changed"),
            WifiEventKind::LinkQualityChanged {
                rssi_dbm,
                transmit_rate_mbps,
            } => write!(
                f,
                "link quality changed (RSSI {rssi_dbm} dBm, rate {transmit_rate_mbps} Mbps)"
            ),
            WifiEventKind::CountryCodeChanged => f.write_str("country code changed"),
            WifiEventKind::ModeChanged => f.write_str("mode changed"),
            WifiEventKind::PowerStateChanged => f.write_str("power state changed"),
            WifiEventKind::ScanCacheUpdated => f.write_str("scan cache updated"),
            WifiEventKind::ConnectionInterrupted => {
                f.write_str("connection to WiFi subsystem interrupted")
            }
            WifiEventKind::ConnectionInvalidated => {
                f.write_str("connection to WiFi subsystem invalidated")
            }
            WifiEventKind::VirtualInterfaceStateChanged => {
                f.write_str("virtual interface state changed")
            }
        }
    }
}

/// An event together with the interface it was reported for.
///
/// Client-level events (connection interrupted/invalidated) carry no
/// interface name.
#[derive(Debug, Clone, PartialEq)]
pub struct WifiEvent {
    pub interface: Option<String>,
    pub kind: WifiEventKind,
}

impl WifiEvent {
    pub fn new(interface: impl Into<String>, kind: WifiEventKind) -> Self {
        Self {
            interface: Some(interface.into()),
            kind,
        }
    }

    pub fn client(kind: WifiEventKind) -> Self {
        Self {
            interface: None,
            kind,
        }
    }
}

impl fmt::Display for WifiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.interface {
            Some(name) => write!(f, "[{name}] {}", self.kind),
            None => write!(f, "[client] {}", self.kind),
        }
    }
}
