use crate::config::{self, IconSet};
use crate::error::WifiResult;
use crate::wifi::{EventMonitor, InterfaceSnapshot, Network, StatusReader, WifiEvent, WifiPlatform};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver};
use tracing::debug;

/// Owns the one status reader and the one event monitor of the process
#[derive(Debug)]
pub struct AppContext {
    pub reader: StatusReader,
    pub monitor: EventMonitor,
}

impl AppContext {
    pub fn new(platform: Arc<dyn WifiPlatform>) -> WifiResult<Self> {
        let reader = StatusReader::new(platform.as_ref())?;
        let monitor = EventMonitor::new(platform);
        Ok(Self { reader, monitor })
    }

    /// Start the monitor and hand its events to the task that owns the
    /// returned receiver.
    pub fn watch(&mut self) -> UnboundedReceiver<WifiEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.monitor.start(move |event| {
            let _ = tx.send(event);
        });
        rx
    }
}

/// Presentation state for the terminal dashboard
#[derive(Debug)]
pub struct DashboardState {
    pub interface_name: String,
    pub snapshot: InterfaceSnapshot,
    pub events: VecDeque<(Instant, WifiEvent)>,
    pub last_refresh: Instant,
    pub icons: IconSet,
    pub is_scanning: bool,
    pub loading_frame: usize,
    pub last_scan: Option<HashSet<Network>>,
    pub scan_rx: Option<Receiver<HashSet<Network>>>,
}

impl DashboardState {
    pub fn new(reader: &StatusReader, icons: IconSet) -> DashboardState {
        DashboardState {
            interface_name: reader.interface_name().to_string(),
            snapshot: reader.current_snapshot(),
            events: VecDeque::with_capacity(config::EVENT_LOG_CAPACITY),
            last_refresh: Instant::now(),
            icons,
            is_scanning: false,
            loading_frame: 0,
            last_scan: None,
            scan_rx: None,
        }
    }

    pub fn refresh(&mut self, reader: &StatusReader) {
        self.snapshot = reader.current_snapshot();
        self.last_refresh = Instant::now();
    }

    /// Record an event and re-read the status when the event affects it
    pub fn apply_event(&mut self, event: WifiEvent, reader: &StatusReader) {
        debug!(%event, "dashboard received event");
        if event.kind.refreshes_status() {
            self.refresh(reader);
        }
        if self.events.len() == config::EVENT_LOG_CAPACITY {
            self.events.pop_back();
        }
        self.events.push_front((Instant::now(), event));
    }

    pub fn finish_scan(&mut self, networks: HashSet<Network>) {
        self.is_scanning = false;
        self.scan_rx = None;
        self.last_scan = Some(networks);
    }

    pub fn strongest_networks(&self, limit: usize) -> Vec<&Network> {
        let mut networks: Vec<&Network> = self
            .last_scan
            .iter()
            .flat_map(|networks| networks.iter())
            .collect();
        networks.sort_by(|a, b| b.rssi_dbm.cmp(&a.rssi_dbm).then_with(|| a.ssid.cmp(&b.ssid)));
        networks.truncate(limit);
        networks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wifi::fake::{FakeInterface, FakePlatform};
    use crate::wifi::{ChannelBand, MonitorState, WifiEventKind};

    fn platform() -> Arc<FakePlatform> {
        Arc::new(FakePlatform::with_interface(FakeInterface {
            ssid: Some("HomeNet".to_string()),
            rssi: Some(-45),
            transmit_rate: Some(866.0),
            ..FakeInterface::named("en0")
        }))
    }

    #[test]
    fn context_requires_default_interface() {
        let result = AppContext::new(Arc::new(FakePlatform::without_interface()));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn watch_forwards_events_to_receiver() {
        let platform = platform();
        let mut context = AppContext::new(platform.clone()).unwrap();
        let mut rx = context.watch();
        assert_eq!(context.monitor.state(), MonitorState::Monitoring);

        let platform_thread = platform.clone();
        std::thread::spawn(move || {
            platform_thread.emit(WifiEvent::new("en0", WifiEventKind::LinkChanged));
        })
        .join()
        .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event, WifiEvent::new("en0", WifiEventKind::LinkChanged));
    }

    #[tokio::test]
    async fn receiver_closes_after_monitor_stops() {
        let platform = platform();
        let mut context = AppContext::new(platform.clone()).unwrap();
        let mut rx = context.watch();

        context.monitor.stop();

        assert_eq!(context.monitor.state(), MonitorState::Idle);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn dashboard_starts_with_current_snapshot() {
        let context = AppContext::new(platform()).unwrap();
        let state = DashboardState::new(&context.reader, IconSet::Ascii);

        assert_eq!(state.interface_name, "en0");
        assert_eq!(state.snapshot.ssid, "HomeNet");
        assert_eq!(state.snapshot.rssi_dbm, -45);
        assert!(state.events.is_empty());
    }

    #[test]
    fn event_log_is_bounded_and_newest_first() {
        let context = AppContext::new(platform()).unwrap();
        let mut state = DashboardState::new(&context.reader, IconSet::Ascii);

        for _ in 0..config::EVENT_LOG_CAPACITY {
            state.apply_event(
                WifiEvent::new("en0", WifiEventKind::PowerStateChanged),
                &context.reader,
            );
        }
        state.apply_event(
            WifiEvent::client(WifiEventKind::ConnectionInterrupted),
            &context.reader,
        );

        assert_eq!(state.events.len(), config::EVENT_LOG_CAPACITY);
        assert_eq!(
            state.events.front().map(|(_, e)| e.kind),
            Some(WifiEventKind::ConnectionInterrupted)
        );
    }

    #[test]
    fn status_events_refresh_snapshot() {
        let context = AppContext::new(platform()).unwrap();
        let mut state = DashboardState::new(&context.reader, IconSet::Nerd);
        state.snapshot = InterfaceSnapshot::default();

        state.apply_event(
            WifiEvent::new("en0", WifiEventKind::ScanCacheUpdated),
            &context.reader,
        );
        assert_eq!(state.snapshot, InterfaceSnapshot::default());

        state.apply_event(
            WifiEvent::new("en0", WifiEventKind::SsidChanged),
            &context.reader,
        );
        assert_eq!(state.snapshot.ssid, "HomeNet");
    }

    #[test]
    fn strongest_networks_sorted_by_signal() {
        let context = AppContext::new(platform()).unwrap();
        let mut state = DashboardState::new(&context.reader, IconSet::Nerd);
        let network = |ssid: &str, rssi_dbm| Network {
            ssid: Some(ssid.to_string()),
            bssid: None,
            rssi_dbm,
            channel_number: 6,
            channel_band: ChannelBand::Ghz2,
        };
        state.is_scanning = true;
        state.finish_scan(
            [network("Far", -82), network("Near", -40), network("Mid", -60)]
                .into_iter()
                .collect(),
        );

        let ssids: Vec<_> = state
            .strongest_networks(2)
            .iter()
            .map(|n| n.ssid.clone().unwrap())
            .collect();
        assert!(!state.is_scanning);
        assert_eq!(ssids, vec!["Near".to_string(), "Mid".to_string()]);
    }
}
