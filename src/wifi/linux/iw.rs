//! Parsers for `iw` command output.

use crate::config;
use crate::error::{WifiError, WifiResult};
use crate::wifi::types::{
    Channel, ChannelBand, ChannelWidth, Network, PhyMode, WifiEventKind,
    channel_from_frequency_mhz,
};
use std::process::Command;

/// Run `iw` with `args` and return its stdout
pub fn run(operation: &'static str, args: &[&str]) -> WifiResult<String> {
    let output = Command::new("iw")
        .args(args)
        .output()
        .map_err(|e| WifiError::failed(operation, format!("could not run iw: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WifiError::failed(operation, stderr.trim().to_string()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Current association as reported by `iw dev <if> link`
#[derive(Debug, Clone, PartialEq)]
pub struct LinkInfo {
    pub bssid: String,
    pub ssid: Option<String>,
    pub freq_mhz: Option<u32>,
    pub signal_dbm: Option<i32>,
    pub tx_bitrate_mbps: Option<f64>,
    pub tx_flags: Vec<String>,
}

impl LinkInfo {
    /// Channel of the association. An unmapped frequency keeps its band and
    /// width and reports the default channel number.
    pub fn channel(&self) -> Option<Channel> {
        let freq = self.freq_mhz?;
        Some(Channel {
            number: channel_from_frequency_mhz(freq).unwrap_or(config::DEFAULT_CHANNEL),
            width: self.channel_width(),
            band: ChannelBand::from_frequency_mhz(freq),
        })
    }

    fn channel_width(&self) -> ChannelWidth {
        let width = self.tx_flags.iter().find_map(|flag| match flag.as_str() {
            "20MHz" => Some(ChannelWidth::Mhz20),
            "40MHz" => Some(ChannelWidth::Mhz40),
            "80MHz" => Some(ChannelWidth::Mhz80),
            "160MHz" | "80+80MHz" => Some(ChannelWidth::Mhz160),
            _ => None,
        });
        // iw omits the width for 20MHz HT and legacy rates
        match (width, self.freq_mhz) {
            (Some(width), _) => width,
            (None, Some(_)) => ChannelWidth::Mhz20,
            (None, None) => ChannelWidth::Unknown,
        }
    }

    pub fn phy_mode(&self) -> PhyMode {
        let has_flag = |prefix: &str| self.tx_flags.iter().any(|f| f.starts_with(prefix));
        if has_flag("HE-") || has_flag("EHT-") {
            return PhyMode::Unknown;
        }
        if has_flag("VHT-") {
            return PhyMode::Ac;
        }
        if has_flag("MCS") {
            return PhyMode::N;
        }

        let band = self.freq_mhz.map(ChannelBand::from_frequency_mhz);
        match (band, self.tx_bitrate_mbps) {
            (Some(ChannelBand::Ghz5), _) => PhyMode::A,
            (Some(ChannelBand::Ghz2), Some(rate)) if rate <= 11.0 => PhyMode::B,
            (Some(ChannelBand::Ghz2), Some(_)) => PhyMode::G,
            _ => PhyMode::Unknown,
        }
    }
}

fn parse_signal(value: &str) -> Option<i32> {
    let dbm = value.split_whitespace().next()?.parse::<f64>().ok()?;
    Some(dbm.round() as i32)
}

fn parse_freq(value: &str) -> Option<u32> {
    let mhz = value.split_whitespace().next()?.parse::<f64>().ok()?;
    Some(mhz as u32)
}

/// Parse `iw dev <if> link`. Returns `None` when not associated.
pub fn parse_link(output: &str) -> Option<LinkInfo> {
    let mut lines = output.lines();
    let header = lines.next()?.trim();
    let bssid = header
        .strip_prefix("Connected to ")?
        .split_whitespace()
        .next()?
        .to_string();

    let mut link = LinkInfo {
        bssid,
        ssid: None,
        freq_mhz: None,
        signal_dbm: None,
        tx_bitrate_mbps: None,
        tx_flags: Vec::new(),
    };

    for line in lines {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "SSID" if !value.is_empty() => link.ssid = Some(value.to_string()),
            "freq" => link.freq_mhz = parse_freq(value),
            "signal" => link.signal_dbm = parse_signal(value),
            "tx bitrate" => {
                let mut parts = value.split_whitespace();
                link.tx_bitrate_mbps = parts.next().and_then(|rate| rate.parse().ok());
                // skip the unit
                parts.next();
                link.tx_flags = parts.map(str::to_string).collect();
            }
            _ => {}
        }
    }

    Some(link)
}

/// Parse the BSS blocks of `iw dev <if> scan`
pub fn parse_scan(output: &str) -> Vec<Network> {
    fn flush(entry: Option<(Network, Option<u32>)>, networks: &mut Vec<Network>) {
        if let Some((mut network, freq)) = entry {
            if let Some(freq) = freq {
                network.channel_number = channel_from_frequency_mhz(freq).unwrap_or(0);
                network.channel_band = ChannelBand::from_frequency_mhz(freq);
            }
            networks.push(network);
        }
    }

    let mut networks = Vec::new();
    let mut current: Option<(Network, Option<u32>)> = None;

    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("BSS ") {
            flush(current.take(), &mut networks);
            let bssid = rest
                .split(|c: char| c == '(' || c.is_whitespace())
                .next()
                .filter(|b| !b.is_empty())
                .map(str::to_uppercase);
            current = Some((
                Network {
                    ssid: None,
                    bssid,
                    rssi_dbm: 0,
                    channel_number: 0,
                    channel_band: ChannelBand::Unknown,
                },
                None,
            ));
            continue;
        }

        let Some((network, freq)) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "SSID" if !value.is_empty() && network.ssid.is_none() => {
                network.ssid = Some(value.to_string())
            }
            "freq" => *freq = parse_freq(value),
            "signal" => network.rssi_dbm = parse_signal(value).unwrap_or(0),
            _ => {}
        }
    }
    flush(current.take(), &mut networks);

    networks
}

/// Map one line of `iw event` output to an event.
///
/// Returns the interface name (if the line names one) and the event kind.
pub fn parse_event_line(line: &str) -> Option<(Option<String>, WifiEventKind)> {
    let line = line.trim();
    if line.contains("regulatory domain change") {
        return Some((None, WifiEventKind::CountryCodeChanged));
    }

    let (head, message) = line.split_once(": ")?;
    let interface = head
        .split_whitespace()
        .next()
        .filter(|name| *name != "phy")
        .map(str::to_string);

    let kind = if message.starts_with("connected to") || message.starts_with("disconnected") {
        WifiEventKind::LinkChanged
    } else if message.starts_with("roamed to") {
        WifiEventKind::BssidChanged
    } else if message.starts_with("scan finished") {
        WifiEventKind::ScanCacheUpdated
    } else if message.starts_with("new interface") || message.starts_with("del interface") {
        WifiEventKind::VirtualInterfaceStateChanged
    } else {
        return None;
    };

    Some((interface, kind))
}
