use crate::config;
use crate::error::{WifiError, WifiResult, win32_status_to_string};
use crate::wifi::platform::WifiInterface;
use crate::wifi::types::{
    Channel, ChannelBand, ChannelWidth, Network, PhyMode, channel_from_frequency_mhz,
};
use crate::wifi::windows::handle::{InterfaceEntry, WlanHandle};
use windows::{
    Win32::{
        Foundation::{ERROR_INVALID_STATE, ERROR_SUCCESS},
        NetworkManagement::WiFi::*,
    },
    core::GUID,
};

fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn ssid_to_string(ssid: &DOT11_SSID) -> Option<String> {
    let len = (ssid.uSSIDLength as usize).min(ssid.ucSSID.len());
    (len > 0).then(|| String::from_utf8_lossy(&ssid.ucSSID[..len]).to_string())
}

#[allow(non_upper_case_globals)]
fn phy_mode(phy: DOT11_PHY_TYPE) -> PhyMode {
    match phy {
        dot11_phy_type_ofdm => PhyMode::A,
        dot11_phy_type_hrdsss => PhyMode::B,
        dot11_phy_type_erp => PhyMode::G,
        dot11_phy_type_ht => PhyMode::N,
        dot11_phy_type_vht => PhyMode::Ac,
        _ => PhyMode::Unknown,
    }
}

/// A wireless interface reached through the Native WLAN API
#[derive(Debug)]
pub struct WlanInterface {
    handle: WlanHandle,
    guid: GUID,
    name: String,
}

impl WlanInterface {
    pub fn new(handle: WlanHandle, entry: InterfaceEntry) -> Self {
        Self {
            handle,
            guid: entry.guid,
            name: entry.description,
        }
    }

    pub fn guid(&self) -> GUID {
        self.guid
    }

    /// Query a fixed-size interface property
    fn query<T: Copy>(&self, opcode: WLAN_INTF_OPCODE, property: &'static str) -> WifiResult<T> {
        unsafe {
            let mut data_size = 0;
            let mut data_ptr: *mut std::ffi::c_void = std::ptr::null_mut();
            let mut opcode_value_type = wlan_opcode_value_type_invalid;

            let result = WlanQueryInterface(
                self.handle.as_raw(),
                &self.guid,
                opcode,
                None,
                &mut data_size,
                &mut data_ptr,
                Some(&mut opcode_value_type),
            );

            if result == ERROR_INVALID_STATE.0 {
                return Err(WifiError::unavailable(property));
            }
            if result != ERROR_SUCCESS.0 {
                return Err(WifiError::failed(
                    "query interface",
                    win32_status_to_string(result),
                ));
            }
            if data_ptr.is_null() || (data_size as usize) < std::mem::size_of::<T>() {
                if !data_ptr.is_null() {
                    WlanFreeMemory(data_ptr);
                }
                return Err(WifiError::unavailable(property));
            }

            let value = *(data_ptr as *const T);
            WlanFreeMemory(data_ptr);
            Ok(value)
        }
    }

    fn association(&self, property: &'static str) -> WifiResult<WLAN_ASSOCIATION_ATTRIBUTES> {
        let connection: WLAN_CONNECTION_ATTRIBUTES =
            self.query(wlan_intf_opcode_current_connection, property)?;
        if connection.isState != wlan_interface_state_connected {
            return Err(WifiError::unavailable(property));
        }
        Ok(connection.wlanAssociationAttributes)
    }
}

impl WifiInterface for WlanInterface {
    fn name(&self) -> &str {
        &self.name
    }

    fn ssid(&self) -> WifiResult<String> {
        ssid_to_string(&self.association("ssid")?.dot11Ssid)
            .ok_or(WifiError::unavailable("ssid"))
    }

    fn bssid(&self) -> WifiResult<String> {
        Ok(format_mac(&self.association("bssid")?.dot11Bssid))
    }

    fn rssi(&self) -> WifiResult<i32> {
        self.query::<i32>(wlan_intf_opcode_rssi, "rssi")
    }

    fn transmit_rate(&self) -> WifiResult<f64> {
        // ulTxRate is reported in kbps
        Ok(self.association("transmit rate")?.ulTxRate as f64 / 1000.0)
    }

    fn channel(&self) -> WifiResult<Channel> {
        let number = self.query::<u32>(wlan_intf_opcode_channel_number, "channel")?;
        let band = if number <= 14 {
            ChannelBand::Ghz2
        } else {
            ChannelBand::Ghz5
        };
        // The WLAN API does not expose the channel width.
        Ok(Channel {
            number,
            width: ChannelWidth::Unknown,
            band,
        })
    }

    fn hardware_address(&self) -> WifiResult<String> {
        Err(WifiError::unavailable("hardware address"))
    }

    fn phy_mode(&self) -> WifiResult<PhyMode> {
        Ok(phy_mode(self.association("phy mode")?.dot11PhyType))
    }

    fn scan(&self) -> WifiResult<Vec<Network>> {
        unsafe {
            let result = WlanScan(self.handle.as_raw(), &self.guid, None, None, None);
            if result != ERROR_SUCCESS.0 {
                return Err(WifiError::failed(
                    "scan for networks",
                    win32_status_to_string(result),
                ));
            }
        }

        // WlanScan only requests a scan; give the driver time to refresh its list
        std::thread::sleep(std::time::Duration::from_millis(config::SCAN_DELAY_MS));

        unsafe {
            let mut bss_list: *mut WLAN_BSS_LIST = std::ptr::null_mut();
            let result = WlanGetNetworkBssList(
                self.handle.as_raw(),
                &self.guid,
                None,
                dot11_BSS_type_any,
                false,
                None,
                &mut bss_list,
            );
            if result != ERROR_SUCCESS.0 || bss_list.is_null() {
                return Err(WifiError::failed(
                    "read scan results",
                    win32_status_to_string(result),
                ));
            }

            let num_bss = (*bss_list).dwNumberOfItems as usize;
            let entries = std::slice::from_raw_parts((*bss_list).wlanBssEntries.as_ptr(), num_bss);
            let networks = entries
                .iter()
                .map(|bss| {
                    let freq_mhz = bss.ulChCenterFrequency / 1000;
                    Network {
                        ssid: ssid_to_string(&bss.dot11Ssid),
                        bssid: Some(format_mac(&bss.dot11Bssid)),
                        rssi_dbm: bss.lRssi,
                        channel_number: channel_from_frequency_mhz(freq_mhz).unwrap_or(0),
                        channel_band: ChannelBand::from_frequency_mhz(freq_mhz),
                    }
                })
                .collect();

            WlanFreeMemory(bss_list as *mut _);
            Ok(networks)
        }
    }
}
