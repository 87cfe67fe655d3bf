use crate::config;
use crate::error::{WifiError, WifiResult, win32_status_to_string};
use crate::wifi::platform::{EventSink, WifiInterface};
use crate::wifi::types::{EventCategory, WifiEvent, WifiEventKind};
use crate::wifi::windows::handle::WlanHandle;
use crate::wifi::windows::interface::WlanInterface;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use windows::Win32::{Foundation::ERROR_SUCCESS, NetworkManagement::WiFi::*};

/// State shared with the notification callback
struct NotificationContext {
    sink: EventSink,
    wanted: HashSet<EventCategory>,
    interface: Arc<WlanInterface>,
}

/// WLAN notification registration that receives WiFi events
#[derive(Debug)]
pub struct WlanListener {
    handle: WlanHandle,
    context: *mut std::ffi::c_void,
}

unsafe impl Send for WlanListener {}
unsafe impl Sync for WlanListener {}

impl Drop for WlanListener {
    fn drop(&mut self) {
        unsafe {
            let result = WlanRegisterNotification(
                self.handle.as_raw(),
                WLAN_NOTIFICATION_SOURCE_NONE,
                true,
                None,
                None,
                None,
                None,
            );
            if result != ERROR_SUCCESS.0 {
                debug!(
                    reason = %win32_status_to_string(result),
                    "failed to unregister WLAN notifications"
                );
            }
            // WlanHandle will be dropped automatically
            let _ = Box::from_raw(self.context as *mut NotificationContext);
        }
    }
}

fn is_code(code: u32, expected: i32) -> bool {
    code == expected as u32
}

/// The WLAN service's mapping of its 0-100 signal quality to dBm
fn quality_to_dbm(quality: u32) -> i32 {
    quality.min(100) as i32 / 2 - 100
}

/// Signal quality carried by a signal quality notification
fn reported_quality(data: &L2_NOTIFICATION_DATA) -> Option<u32> {
    if data.pData.is_null() || (data.dwDataSize as usize) < std::mem::size_of::<u32>() {
        return None;
    }
    // SAFETY: signal quality notifications carry a single ULONG in pData
    Some(unsafe { *(data.pData as *const u32) })
}

/// Prefer the driver's current RSSI and rate, then the notification's own
/// quality figure, then the sentinels. The event is never dropped.
fn link_quality_kind(
    rssi_dbm: Option<i32>,
    quality: Option<u32>,
    transmit_rate_mbps: Option<f64>,
) -> WifiEventKind {
    WifiEventKind::LinkQualityChanged {
        rssi_dbm: rssi_dbm
            .or(quality.map(quality_to_dbm))
            .unwrap_or(config::DEFAULT_RSSI_DBM),
        transmit_rate_mbps: transmit_rate_mbps.unwrap_or(config::DEFAULT_TRANSMIT_RATE_MBPS),
    }
}

/// Name an event after the bound interface. Other adapters only surface
/// through their arrival and removal, as client-level events.
fn attribute(kind: WifiEventKind, from_bound: bool, interface: &str) -> Option<WifiEvent> {
    match kind {
        WifiEventKind::ConnectionInterrupted | WifiEventKind::ConnectionInvalidated
            if from_bound =>
        {
            Some(WifiEvent::client(kind))
        }
        WifiEventKind::VirtualInterfaceStateChanged if !from_bound => {
            Some(WifiEvent::client(kind))
        }
        _ if from_bound => Some(WifiEvent::new(interface, kind)),
        _ => None,
    }
}

/// Map a WLAN notification to at most one event kind
fn map_notification(
    data: &L2_NOTIFICATION_DATA,
    context: &NotificationContext,
) -> Option<WifiEventKind> {
    let code = data.NotificationCode;

    if data.NotificationSource == WLAN_NOTIFICATION_SOURCE_ACM {
        if is_code(code, wlan_notification_acm_connection_complete.0)
            || is_code(code, wlan_notification_acm_disconnected.0)
        {
            return Some(WifiEventKind::SsidChanged);
        }
        if is_code(code, wlan_notification_acm_connection_attempt_fail.0) {
            return Some(WifiEventKind::ConnectionInterrupted);
        }
        if is_code(code, wlan_notification_acm_scan_list_refresh.0) {
            return Some(WifiEventKind::ScanCacheUpdated);
        }
        if is_code(code, wlan_notification_acm_interface_removal.0)
            && data.InterfaceGuid == context.interface.guid()
        {
            return Some(WifiEventKind::ConnectionInvalidated);
        }
        if is_code(code, wlan_notification_acm_interface_arrival.0)
            || is_code(code, wlan_notification_acm_interface_removal.0)
        {
            return Some(WifiEventKind::VirtualInterfaceStateChanged);
        }
        return None;
    }

    if data.NotificationSource == WLAN_NOTIFICATION_SOURCE_MSM {
        if data.InterfaceGuid != context.interface.guid() {
            return None;
        }
        if is_code(code, wlan_notification_msm_associated.0)
            || is_code(code, wlan_notification_msm_roaming_end.0)
        {
            return Some(WifiEventKind::BssidChanged);
        }
        if is_code(code, wlan_notification_msm_connected.0)
            || is_code(code, wlan_notification_msm_disconnected.0)
        {
            return Some(WifiEventKind::LinkChanged);
        }
        if is_code(code, wlan_notification_msm_signal_quality_change.0) {
            return Some(link_quality_kind(
                context.interface.rssi().ok(),
                reported_quality(data),
                context.interface.transmit_rate().ok(),
            ));
        }
        if is_code(code, wlan_notification_msm_radio_state_change.0) {
            return Some(WifiEventKind::PowerStateChanged);
        }
        if is_code(code, wlan_notification_msm_adapter_operation_mode_change.0) {
            return Some(WifiEventKind::ModeChanged);
        }
    }

    None
}

unsafe extern "system" fn notification_callback(
    data: *mut L2_NOTIFICATION_DATA,
    context: *mut std::ffi::c_void,
) {
    if data.is_null() || context.is_null() {
        return;
    }

    // SAFETY: We checked for null above.
    // The context is a pointer to NotificationContext created in WlanListener::register
    let (data, context) = unsafe { (&*data, &*(context as *const NotificationContext)) };

    let Some(kind) = map_notification(data, context) else {
        return;
    };
    if !context.wanted.contains(&kind.category()) {
        return;
    }

    let from_bound = data.InterfaceGuid == context.interface.guid();
    if let Some(event) = attribute(kind, from_bound, context.interface.name()) {
        (context.sink)(event);
    }
}

impl WlanListener {
    /// Register for ACM and MSM notifications in one call
    pub fn register(
        interface: Arc<WlanInterface>,
        categories: &[EventCategory],
        sink: EventSink,
    ) -> WifiResult<Self> {
        let wlan_handle = WlanHandle::open()?;
        let handle = wlan_handle.as_raw();

        // Box the context to pass it to the callback
        let context = Box::into_raw(Box::new(NotificationContext {
            sink,
            wanted: categories.iter().copied().collect(),
            interface,
        }));

        unsafe {
            let result = WlanRegisterNotification(
                handle,
                WLAN_NOTIFICATION_SOURCE_ACM | WLAN_NOTIFICATION_SOURCE_MSM,
                false,
                Some(notification_callback),
                Some(context as *mut std::ffi::c_void),
                None,
                None,
            );

            if result != ERROR_SUCCESS.0 {
                let _ = Box::from_raw(context); // Cleanup
                return Err(WifiError::failed(
                    "start monitoring",
                    win32_status_to_string(result),
                ));
            }
        }

        Ok(WlanListener {
            handle: wlan_handle,
            context: context as *mut std::ffi::c_void,
        })
    }
}
