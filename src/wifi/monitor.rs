use crate::wifi::platform::{EventSink, WifiPlatform};
use crate::wifi::types::{EventCategory, WifiEvent};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Monitoring,
}

/// Forwards platform WiFi events to a single callback.
///
/// Events are handed straight through on the platform's delivery thread:
/// no queue, no coalescing, no throttling.
pub struct EventMonitor {
    platform: Arc<dyn WifiPlatform>,
    state: MonitorState,
}

impl std::fmt::Debug for EventMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMonitor")
            .field("state", &self.state)
            .finish()
    }
}

impl EventMonitor {
    pub fn new(platform: Arc<dyn WifiPlatform>) -> Self {
        Self {
            platform,
            state: MonitorState::Idle,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Subscribe to every event category in one batch.
    ///
    /// A rejected batch is logged and not rolled back; the monitor is
    /// Monitoring afterwards either way.
    pub fn start<F>(&mut self, callback: F)
    where
        F: Fn(WifiEvent) + Send + Sync + 'static,
    {
        let sink: EventSink = Arc::new(callback);
        info!(categories = EventCategory::ALL.len(), "starting WiFi event monitor");
        if let Err(err) = self.platform.start_monitoring(&EventCategory::ALL, sink) {
            warn!(error = %err, "event subscription rejected");
        }
        self.state = MonitorState::Monitoring;
    }

    /// Unsubscribe from everything. No-op while Idle.
    pub fn stop(&mut self) {
        if self.state == MonitorState::Idle {
            return;
        }
        info!("stopping WiFi event monitor");
        if let Err(err) = self.platform.stop_monitoring() {
            warn!(error = %err, "event unsubscription failed");
        }
        self.state = MonitorState::Idle;
    }
}

impl Drop for EventMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wifi::fake::{FakeInterface, FakePlatform};
    use crate::wifi::types::WifiEventKind;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;

    fn platform() -> Arc<FakePlatform> {
        Arc::new(FakePlatform::with_interface(FakeInterface::named("en0")))
    }

    fn recorder() -> (Arc<Mutex<Vec<WifiEvent>>>, impl Fn(WifiEvent) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |event| sink.lock().unwrap().push(event))
    }

    #[test]
    fn starts_idle() {
        let monitor = EventMonitor::new(platform());
        assert_eq!(monitor.state(), MonitorState::Idle);
    }

    #[test]
    fn starting_twice_stays_monitoring() {
        let platform = platform();
        let mut monitor = EventMonitor::new(platform.clone());

        monitor.start(|_| {});
        monitor.start(|_| {});

        assert_eq!(monitor.state(), MonitorState::Monitoring);
        assert_eq!(platform.subscribe_calls.load(Ordering::SeqCst), 2);
        assert!(platform.is_subscribed());
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let platform = platform();
        let mut monitor = EventMonitor::new(platform.clone());

        monitor.stop();

        assert_eq!(monitor.state(), MonitorState::Idle);
        assert_eq!(platform.unsubscribe_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stop_unsubscribes_and_returns_to_idle() {
        let platform = platform();
        let mut monitor = EventMonitor::new(platform.clone());

        monitor.start(|_| {});
        monitor.stop();
        monitor.stop();

        assert_eq!(monitor.state(), MonitorState::Idle);
        assert_eq!(platform.unsubscribe_calls.load(Ordering::SeqCst), 1);
        assert!(!platform.is_subscribed());
    }

    #[test]
    fn failed_unsubscribe_still_goes_idle() {
        let platform = Arc::new(
            FakePlatform::with_interface(FakeInterface::named("en0")).rejecting_unsubscribe(),
        );
        let mut monitor = EventMonitor::new(platform.clone());

        monitor.start(|_| {});
        monitor.stop();

        assert_eq!(monitor.state(), MonitorState::Idle);
    }

    #[test]
    fn rejected_batch_keeps_partial_subscription() {
        let platform = Arc::new(
            FakePlatform::with_interface(FakeInterface::named("en0")).rejecting_subscribe(),
        );
        let (seen, callback) = recorder();
        let mut monitor = EventMonitor::new(platform.clone());

        monitor.start(callback);
        assert_eq!(monitor.state(), MonitorState::Monitoring);

        // First half of the batch was accepted by the platform.
        platform.emit(WifiEvent::new("en0", WifiEventKind::BssidChanged));
        platform.emit(WifiEvent::new("en0", WifiEventKind::ScanCacheUpdated));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![WifiEvent::new("en0", WifiEventKind::BssidChanged)]
        );
    }

    #[test]
    fn events_are_forwarded_in_delivery_order() {
        let platform = platform();
        let (seen, callback) = recorder();
        let mut monitor = EventMonitor::new(platform.clone());
        monitor.start(callback);

        platform.emit(WifiEvent::new("en0", WifiEventKind::SsidChanged));
        platform.emit(WifiEvent::new("en0", WifiEventKind::LinkChanged));
        platform.emit(WifiEvent::client(WifiEventKind::ConnectionInterrupted));

        let kinds: Vec<_> = seen.lock().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WifiEventKind::SsidChanged,
                WifiEventKind::LinkChanged,
                WifiEventKind::ConnectionInterrupted,
            ]
        );
    }

    #[test]
    fn link_quality_payload_is_unmodified() {
        let platform = platform();
        let (seen, callback) = recorder();
        let mut monitor = EventMonitor::new(platform.clone());
        monitor.start(callback);

        platform.emit(WifiEvent::new(
            "en0",
            WifiEventKind::LinkQualityChanged {
                rssi_dbm: -67,
                transmit_rate_mbps: 243.5,
            },
        ));

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].kind,
            WifiEventKind::LinkQualityChanged {
                rssi_dbm: -67,
                transmit_rate_mbps: 243.5,
            }
        );
    }

    #[test]
    fn drop_stops_monitoring() {
        let platform = platform();
        {
            let mut monitor = EventMonitor::new(platform.clone());
            monitor.start(|_| {});
        }
        assert!(!platform.is_subscribed());
        assert_eq!(platform.unsubscribe_calls.load(Ordering::SeqCst), 1);
    }
}
