/// Typed errors for wifiglance WiFi operations
use thiserror::Error;

/// Result type alias for WiFi operations
pub type WifiResult<T> = Result<T, WifiError>;

/// Errors that can occur while talking to the platform WiFi facility
#[derive(Error, Debug, Clone)]
pub enum WifiError {
    #[error("No default WiFi interface found")]
    NoDefaultInterface,

    #[error("Property unavailable: {property}")]
    PropertyUnavailable { property: &'static str },

    #[error("Failed to {operation}: {reason}")]
    PlatformOperationFailed {
        operation: &'static str,
        reason: String,
    },
}

impl WifiError {
    pub fn unavailable(property: &'static str) -> Self {
        WifiError::PropertyUnavailable { property }
    }

    pub fn failed(operation: &'static str, reason: impl Into<String>) -> Self {
        WifiError::PlatformOperationFailed {
            operation,
            reason: reason.into(),
        }
    }
}

/// Convert a Win32 / WLAN API status code to a human-readable string
#[cfg_attr(not(windows), allow(dead_code))]
pub fn win32_status_to_string(code: u32) -> String {
    match code {
        0 => "Success".to_string(),
        5 => "Access Denied".to_string(),
        6 => "Invalid Handle".to_string(),
        8 => "Not Enough Memory".to_string(),
        50 => "Not Supported".to_string(),
        87 => "Invalid Parameter".to_string(),
        1062 => "WLAN Service Not Running".to_string(),
        1168 => "Not Found".to_string(),
        1169 => "No Match".to_string(),
        1206 => "Bad Profile".to_string(),
        5023 => "Invalid State".to_string(),
        _ => format!("Unknown Error (Code: {code}, 0x{code:X})"),
    }
}
