//! Scripted platform used by unit tests.

use crate::error::{WifiError, WifiResult};
use crate::wifi::platform::{EventSink, WifiInterface, WifiPlatform};
use crate::wifi::types::{Channel, EventCategory, Network, PhyMode, WifiEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone)]
pub struct FakeInterface {
    pub name: String,
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub rssi: Option<i32>,
    pub transmit_rate: Option<f64>,
    pub channel: Option<Channel>,
    pub hardware_address: Option<String>,
    pub phy_mode: Option<PhyMode>,
    pub scan_result: Option<Vec<Network>>,
    /// Every property read fails as if the platform tool were missing
    pub fail_reads: bool,
}

impl FakeInterface {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail_reads: true,
            ..Self::named(name)
        }
    }

    fn present<T: Clone>(&self, value: &Option<T>, property: &'static str) -> WifiResult<T> {
        if self.fail_reads {
            return Err(WifiError::failed("read link state", "could not run iw"));
        }
        value.clone().ok_or(WifiError::unavailable(property))
    }
}

impl WifiInterface for FakeInterface {
    fn name(&self) -> &str {
        &self.name
    }

    fn ssid(&self) -> WifiResult<String> {
        self.present(&self.ssid, "ssid")
    }

    fn bssid(&self) -> WifiResult<String> {
        self.present(&self.bssid, "bssid")
    }

    fn rssi(&self) -> WifiResult<i32> {
        self.present(&self.rssi, "rssi")
    }

    fn transmit_rate(&self) -> WifiResult<f64> {
        self.present(&self.transmit_rate, "transmit rate")
    }

    fn channel(&self) -> WifiResult<Channel> {
        self.present(&self.channel, "channel")
    }

    fn hardware_address(&self) -> WifiResult<String> {
        self.present(&self.hardware_address, "hardware address")
    }

    fn phy_mode(&self) -> WifiResult<PhyMode> {
        self.present(&self.phy_mode, "phy mode")
    }

    fn scan(&self) -> WifiResult<Vec<Network>> {
        self.scan_result
            .clone()
            .ok_or_else(|| WifiError::failed("scan for networks", "radio is off"))
    }
}

#[derive(Default)]
pub struct FakePlatform {
    pub interface: Option<Arc<FakeInterface>>,
    pub fail_subscribe: bool,
    pub fail_unsubscribe: bool,
    pub subscribe_calls: AtomicUsize,
    pub unsubscribe_calls: AtomicUsize,
    subscription: Mutex<Option<(Vec<EventCategory>, EventSink)>>,
}

impl FakePlatform {
    pub fn with_interface(interface: FakeInterface) -> Self {
        Self {
            interface: Some(Arc::new(interface)),
            ..Default::default()
        }
    }

    pub fn without_interface() -> Self {
        Self::default()
    }

    pub fn rejecting_subscribe(mut self) -> Self {
        self.fail_subscribe = true;
        self
    }

    pub fn rejecting_unsubscribe(mut self) -> Self {
        self.fail_unsubscribe = true;
        self
    }

    /// Deliver an event the way a platform notification thread would
    pub fn emit(&self, event: WifiEvent) {
        let sink = match self.subscription.lock() {
            Ok(guard) => guard.as_ref().and_then(|(categories, sink)| {
                categories
                    .contains(&event.kind.category())
                    .then(|| sink.clone())
            }),
            Err(_) => None,
        };
        if let Some(sink) = sink {
            sink(event);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

impl WifiPlatform for FakePlatform {
    fn default_interface(&self) -> Option<Arc<dyn WifiInterface>> {
        self.interface
            .clone()
            .map(|interface| interface as Arc<dyn WifiInterface>)
    }

    fn interface_names(&self) -> Vec<String> {
        self.interface
            .iter()
            .map(|interface| interface.name.clone())
            .collect()
    }

    fn start_monitoring(&self, categories: &[EventCategory], sink: EventSink) -> WifiResult<()> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        // A failing batch still leaves the first half subscribed.
        let accepted = if self.fail_subscribe {
            categories[..categories.len() / 2].to_vec()
        } else {
            categories.to_vec()
        };
        if let Ok(mut guard) = self.subscription.lock() {
            *guard = Some((accepted, sink));
        }
        if self.fail_subscribe {
            return Err(WifiError::failed("start monitoring", "permission denied"));
        }
        Ok(())
    }

    fn stop_monitoring(&self) -> WifiResult<()> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_unsubscribe {
            return Err(WifiError::failed("stop monitoring", "client invalidated"));
        }
        if let Ok(mut guard) = self.subscription.lock() {
            *guard = None;
        }
        Ok(())
    }
}
