use crate::error::{WifiError, WifiResult, win32_status_to_string};
use windows::{
    Win32::{
        Foundation::{ERROR_SUCCESS, HANDLE},
        NetworkManagement::WiFi::*,
    },
    core::GUID,
};

/// Safe wrapper around WLAN handle that automatically closes on drop
#[derive(Debug)]
pub struct WlanHandle {
    handle: HANDLE,
}

// The WLAN API handle may be used from any thread.
unsafe impl Send for WlanHandle {}
unsafe impl Sync for WlanHandle {}

/// Interface GUID and description as enumerated by the WLAN service
#[derive(Debug, Clone)]
pub struct InterfaceEntry {
    pub guid: GUID,
    pub description: String,
}

impl WlanHandle {
    /// Open a new WLAN handle
    pub fn open() -> WifiResult<Self> {
        let mut negotiated_version = 0;
        let mut handle = HANDLE::default();
        unsafe {
            let result = WlanOpenHandle(2, None, &mut negotiated_version, &mut handle);
            if result != ERROR_SUCCESS.0 {
                return Err(WifiError::failed(
                    "open WLAN handle",
                    win32_status_to_string(result),
                ));
            }
        }
        Ok(Self { handle })
    }

    /// Get the raw handle for API calls
    pub fn as_raw(&self) -> HANDLE {
        self.handle
    }

    /// Enumerate the wireless interfaces, in WLAN service order
    pub fn interfaces(&self) -> WifiResult<Vec<InterfaceEntry>> {
        unsafe {
            let mut interface_list: *mut WLAN_INTERFACE_INFO_LIST = std::ptr::null_mut();
            let result = WlanEnumInterfaces(self.handle, None, &mut interface_list);
            if result != ERROR_SUCCESS.0 {
                return Err(WifiError::failed(
                    "enumerate interfaces",
                    win32_status_to_string(result),
                ));
            }

            let count = (*interface_list).dwNumberOfItems as usize;
            let infos = std::slice::from_raw_parts((*interface_list).InterfaceInfo.as_ptr(), count);
            let entries = infos
                .iter()
                .map(|info| {
                    let description = &info.strInterfaceDescription;
                    let len = description
                        .iter()
                        .position(|&c| c == 0)
                        .unwrap_or(description.len());
                    InterfaceEntry {
                        guid: info.InterfaceGuid,
                        description: String::from_utf16_lossy(&description[..len]),
                    }
                })
                .collect();
            WlanFreeMemory(interface_list as *mut _);
            Ok(entries)
        }
    }
}

impl Drop for WlanHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = WlanCloseHandle(self.handle, None);
        }
    }
}
