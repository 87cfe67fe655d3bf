/// Centralized configuration constants for wifiglance

// Sentinels substituted for unavailable interface properties
pub const SSID_NOT_CONNECTED: &str = "Not Connected";
pub const BSSID_UNKNOWN: &str = "Unknown";
pub const ZERO_MAC: &str = "00:00:00:00:00:00";
pub const DEFAULT_CHANNEL: u32 = 1;
pub const DEFAULT_RSSI_DBM: i32 = 0;
pub const DEFAULT_TRANSMIT_RATE_MBPS: f64 = 0.0;

// UI Dimensions
pub const MAIN_WINDOW_HEIGHT: u16 = 26;
pub const MAIN_WINDOW_WIDTH: u16 = 61;
pub const EVENT_LOG_CAPACITY: usize = 8;

// Timing
pub const EVENT_POLL_MS: u64 = 100;
#[cfg_attr(not(windows), allow(dead_code))]
pub const SCAN_DELAY_MS: u64 = 2000;
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub const LINK_QUALITY_POLL_MS: u64 = 2000;
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub const LINK_CACHE_MS: u64 = 500;

// Default log file name for the dashboard (placed in the temp dir)
pub const DASHBOARD_LOG_FILE: &str = "wifiglance.log";

// Loading animation frames
pub const LOADING_CHARS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// Icons - Nerd Fonts
pub mod icons {
    pub mod nerd {
        pub const CONNECTED: &str = "󰖩 "; // nf-md-wifi
        pub const DISCONNECTED: &str = "󰖪 "; // nf-md-wifi_off
        pub const EVENT: &str = "󰋼 "; // nf-md-information
        pub const SCAN: &str = "󰍉 "; // nf-md-magnify
    }

    pub mod ascii {
        pub const CONNECTED: &str = "(+) ";
        pub const DISCONNECTED: &str = "(-) ";
        pub const EVENT: &str = "* ";
        pub const SCAN: &str = "? ";
    }
}

/// Icon set to use based on configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconSet {
    #[default]
    Nerd,
    Ascii,
}

impl IconSet {
    pub fn from_ascii_flag(ascii: bool) -> Self {
        if ascii { IconSet::Ascii } else { IconSet::Nerd }
    }

    pub fn connected(&self, connected: bool) -> &'static str {
        match (self, connected) {
            (IconSet::Nerd, true) => icons::nerd::CONNECTED,
            (IconSet::Nerd, false) => icons::nerd::DISCONNECTED,
            (IconSet::Ascii, true) => icons::ascii::CONNECTED,
            (IconSet::Ascii, false) => icons::ascii::DISCONNECTED,
        }
    }

    pub fn event(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::EVENT,
            IconSet::Ascii => icons::ascii::EVENT,
        }
    }

    pub fn scan(&self) -> &'static str {
        match self {
            IconSet::Nerd => icons::nerd::SCAN,
            IconSet::Ascii => icons::ascii::SCAN,
        }
    }
}
