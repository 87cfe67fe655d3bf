//! Windows backend built on the Native WLAN API.

mod handle;
mod interface;
mod listener;

use crate::error::{WifiError, WifiResult};
use crate::wifi::platform::{EventSink, WifiInterface, WifiPlatform};
use crate::wifi::types::EventCategory;
use handle::WlanHandle;
use interface::WlanInterface;
use listener::WlanListener;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Default)]
pub struct WlanPlatform {
    listener: Mutex<Option<WlanListener>>,
}

impl WlanPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn default_wlan_interface(&self) -> WifiResult<Arc<WlanInterface>> {
        let handle = WlanHandle::open()?;
        let entry = handle
            .interfaces()?
            .into_iter()
            .next()
            .ok_or(WifiError::NoDefaultInterface)?;
        Ok(Arc::new(WlanInterface::new(handle, entry)))
    }

    fn replace_listener(&self, listener: Option<WlanListener>) {
        let previous = match self.listener.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, listener),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), listener),
        };
        // Unregisters on drop
        drop(previous);
    }
}

impl WifiPlatform for WlanPlatform {
    fn default_interface(&self) -> Option<Arc<dyn WifiInterface>> {
        match self.default_wlan_interface() {
            Ok(interface) => Some(interface as Arc<dyn WifiInterface>),
            Err(err) => {
                debug!(error = %err, "no default WLAN interface");
                None
            }
        }
    }

    fn interface_names(&self) -> Vec<String> {
        WlanHandle::open()
            .and_then(|handle| handle.interfaces())
            .map(|entries| entries.into_iter().map(|e| e.description).collect())
            .unwrap_or_else(|err| {
                debug!(error = %err, "cannot enumerate WLAN interfaces");
                Vec::new()
            })
    }

    fn start_monitoring(&self, categories: &[EventCategory], sink: EventSink) -> WifiResult<()> {
        self.replace_listener(None);
        let interface = self.default_wlan_interface()?;
        let listener = WlanListener::register(interface, categories, sink)?;
        self.replace_listener(Some(listener));
        Ok(())
    }

    fn stop_monitoring(&self) -> WifiResult<()> {
        self.replace_listener(None);
        Ok(())
    }
}
