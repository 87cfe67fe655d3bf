//! Linux backend: sysfs for interface discovery, `iw` for link state and events.

mod iw;
mod listener;

use crate::config;
use crate::error::{WifiError, WifiResult};
use crate::wifi::platform::{EventSink, WifiInterface, WifiPlatform};
use crate::wifi::types::{Channel, EventCategory, Network, PhyMode};
use iw::LinkInfo;
use listener::IwEventListener;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

const SYSFS_NET: &str = "/sys/class/net";

type LinkState = WifiResult<Option<LinkInfo>>;

/// Last `iw dev <if> link` result, reused while younger than the TTL so one
/// snapshot reads every property from the same association.
#[derive(Debug, Default)]
struct LinkCache {
    entry: Mutex<Option<(Instant, LinkState)>>,
}

impl LinkCache {
    fn get_or_fetch(&self, ttl: Duration, fetch: impl FnOnce() -> LinkState) -> LinkState {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((fetched_at, state)) = entry.as_ref()
            && fetched_at.elapsed() < ttl
        {
            return state.clone();
        }
        let state = fetch();
        *entry = Some((Instant::now(), state.clone()));
        state
    }
}

/// Names of wireless interfaces under `root`, sorted
fn wireless_interfaces(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(root) {
        Ok(entries) => entries
            .flatten()
            .filter(|entry| entry.path().join("wireless").exists())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect(),
        Err(e) => {
            debug!(root = %root.display(), error = %e, "cannot list network interfaces");
            Vec::new()
        }
    };
    names.sort();
    names
}

#[derive(Debug)]
pub struct LinuxInterface {
    name: String,
    sysfs_dir: PathBuf,
    link_cache: LinkCache,
}

impl LinuxInterface {
    fn new(root: &Path, name: String) -> Self {
        Self {
            sysfs_dir: root.join(&name),
            name,
            link_cache: LinkCache::default(),
        }
    }

    fn link(&self, property: &'static str) -> WifiResult<LinkInfo> {
        let ttl = Duration::from_millis(config::LINK_CACHE_MS);
        self.link_cache
            .get_or_fetch(ttl, || {
                let output = iw::run("read link state", &["dev", &self.name, "link"])?;
                Ok(iw::parse_link(&output))
            })?
            .ok_or(WifiError::unavailable(property))
    }

    pub(super) fn link_quality(&self) -> Option<(i32, f64)> {
        let link = self.link("link quality").ok()?;
        Some((link.signal_dbm?, link.tx_bitrate_mbps?))
    }
}

impl WifiInterface for LinuxInterface {
    fn name(&self) -> &str {
        &self.name
    }

    fn ssid(&self) -> WifiResult<String> {
        self.link("ssid")?
            .ssid
            .ok_or(WifiError::unavailable("ssid"))
    }

    fn bssid(&self) -> WifiResult<String> {
        Ok(self.link("bssid")?.bssid)
    }

    fn rssi(&self) -> WifiResult<i32> {
        self.link("rssi")?
            .signal_dbm
            .ok_or(WifiError::unavailable("rssi"))
    }

    fn transmit_rate(&self) -> WifiResult<f64> {
        self.link("transmit rate")?
            .tx_bitrate_mbps
            .ok_or(WifiError::unavailable("transmit rate"))
    }

    fn channel(&self) -> WifiResult<Channel> {
        self.link("channel")?
            .channel()
            .ok_or(WifiError::unavailable("channel"))
    }

    fn hardware_address(&self) -> WifiResult<String> {
        let address = fs::read_to_string(self.sysfs_dir.join("address"))
            .map_err(|_| WifiError::unavailable("hardware address"))?;
        let address = address.trim();
        if address.is_empty() {
            return Err(WifiError::unavailable("hardware address"));
        }
        Ok(address.to_string())
    }

    fn phy_mode(&self) -> WifiResult<PhyMode> {
        Ok(self.link("phy mode")?.phy_mode())
    }

    fn scan(&self) -> WifiResult<Vec<Network>> {
        let output = iw::run("scan for networks", &["dev", &self.name, "scan"])?;
        Ok(iw::parse_scan(&output))
    }
}

#[derive(Debug)]
pub struct LinuxPlatform {
    sysfs_root: PathBuf,
    listener: Mutex<Option<IwEventListener>>,
}

impl LinuxPlatform {
    pub fn new() -> Self {
        Self::with_sysfs_root(SYSFS_NET)
    }

    fn with_sysfs_root(root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: root.into(),
            listener: Mutex::new(None),
        }
    }

    fn default_linux_interface(&self) -> Option<Arc<LinuxInterface>> {
        wireless_interfaces(&self.sysfs_root)
            .into_iter()
            .next()
            .map(|name| Arc::new(LinuxInterface::new(&self.sysfs_root, name)))
    }

    fn take_listener(&self) -> Option<IwEventListener> {
        match self.listener.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl WifiPlatform for LinuxPlatform {
    fn default_interface(&self) -> Option<Arc<dyn WifiInterface>> {
        self.default_linux_interface()
            .map(|interface| interface as Arc<dyn WifiInterface>)
    }

    fn interface_names(&self) -> Vec<String> {
        wireless_interfaces(&self.sysfs_root)
    }

    fn start_monitoring(&self, categories: &[EventCategory], sink: EventSink) -> WifiResult<()> {
        // Re-subscribing replaces the previous listener, which stops on drop.
        drop(self.take_listener());

        let (listener, result) =
            IwEventListener::start(categories, sink, self.default_linux_interface());
        match self.listener.lock() {
            Ok(mut guard) => *guard = Some(listener),
            Err(poisoned) => *poisoned.into_inner() = Some(listener),
        }
        result
    }

    fn stop_monitoring(&self) -> WifiResult<()> {
        drop(self.take_listener());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fake_sysfs() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, wireless) in [("lo", false), ("wlp3s0", true), ("eth0", false), ("wlan1", true)]
        {
            let iface = dir.path().join(name);
            fs::create_dir_all(&iface).unwrap();
            if wireless {
                fs::create_dir_all(iface.join("wireless")).unwrap();
            }
        }
        fs::write(dir.path().join("wlan1").join("address"), "8c:85:90:aa:bb:cc\n").unwrap();
        dir
    }

    #[test]
    fn lists_only_wireless_interfaces() {
        let sysfs = fake_sysfs();
        assert_eq!(
            wireless_interfaces(sysfs.path()),
            vec!["wlan1".to_string(), "wlp3s0".to_string()]
        );
    }

    #[test]
    fn default_interface_is_first_wireless() {
        let sysfs = fake_sysfs();
        let platform = LinuxPlatform::with_sysfs_root(sysfs.path());

        let interface = platform.default_interface().unwrap();
        assert_eq!(interface.name(), "wlan1");
        assert_eq!(
            interface.hardware_address().unwrap(),
            "8c:85:90:aa:bb:cc"
        );
    }

    #[test]
    fn missing_address_is_unavailable() {
        let sysfs = fake_sysfs();
        let interface = LinuxInterface::new(sysfs.path(), "wlp3s0".to_string());
        assert!(matches!(
            interface.hardware_address(),
            Err(WifiError::PropertyUnavailable { .. })
        ));
    }

    fn connected_link() -> LinkState {
        Ok(iw::parse_link(
            "Connected to a4:2b:b0:11:22:33 (on wlan1)\n\tSSID: HomeNet\n\tfreq: 5180\n",
        ))
    }

    #[test]
    fn link_state_is_reused_within_ttl() {
        let cache = LinkCache::default();
        let fetches = AtomicUsize::new(0);
        let fetch = || {
            fetches.fetch_add(1, Ordering::SeqCst);
            connected_link()
        };

        let first = cache.get_or_fetch(Duration::from_secs(60), fetch).unwrap();
        let second = cache.get_or_fetch(Duration::from_secs(60), fetch).unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(second.map(|link| link.bssid), Some("a4:2b:b0:11:22:33".to_string()));
    }

    #[test]
    fn expired_link_state_is_fetched_again() {
        let cache = LinkCache::default();
        let fetches = AtomicUsize::new(0);
        let fetch = || {
            fetches.fetch_add(1, Ordering::SeqCst);
            Err(WifiError::failed("read link state", "could not run iw"))
        };

        assert!(cache.get_or_fetch(Duration::ZERO, fetch).is_err());
        assert!(cache.get_or_fetch(Duration::ZERO, fetch).is_err());
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn no_wireless_interfaces_means_no_default() {
        let dir = tempfile::tempdir().unwrap();
        let platform = LinuxPlatform::with_sysfs_root(dir.path().join("missing"));
        assert!(platform.default_interface().is_none());
        assert!(platform.interface_names().is_empty());
    }
}
