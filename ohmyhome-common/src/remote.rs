//! Requests understood by the device-control service
//!
//! Only actuator state goes over the wire; every other setting is local to the
//! panel.
//!
//! # Example Requests
//!
//! ```plain
//! POST /mode           {"mode": "manual_only"}
//! POST /device/update  {"device": "system", "state": "ON", "reason": "manual_frontend"}
//! ```

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{Mode, Setting, SettingValue};

pub const SYSTEM_DEVICE: &str = "system";
pub const MANUAL_FRONTEND: &str = "manual_frontend";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRequest {
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceState {
    On,
    Off,
}

impl From<bool> for DeviceState {
    fn from(on: bool) -> Self {
        if on { DeviceState::On } else { DeviceState::Off }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    pub device: CompactString,
    pub state: DeviceState,
    /// Who asked for the change
    pub reason: CompactString,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RemoteRequest {
    Mode(ModeRequest),
    DeviceUpdate(DeviceUpdate),
}

impl RemoteRequest {
    /// The request that commits `value`, or `None` if `setting` is local only
    pub fn for_change(setting: Setting, value: &SettingValue) -> Option<Self> {
        match (setting, value) {
            (Setting::Mode, SettingValue::Mode(mode)) => {
                Some(RemoteRequest::Mode(ModeRequest { mode: *mode }))
            }
            (Setting::SystemOn, SettingValue::Switch(on)) => {
                Some(RemoteRequest::DeviceUpdate(DeviceUpdate {
                    device: CompactString::const_new(SYSTEM_DEVICE),
                    state: DeviceState::from(*on),
                    reason: CompactString::const_new(MANUAL_FRONTEND),
                }))
            }
            _ => None,
        }
    }

    pub const fn path(&self) -> &'static str {
        match self {
            RemoteRequest::Mode(_) => "/mode",
            RemoteRequest::DeviceUpdate(_) => "/device/update",
        }
    }
}
