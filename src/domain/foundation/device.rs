//! Device classification for registered user devices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Class of a registered device, as assigned at pairing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Desk machine used for operational work.
    Workstation,
    /// Personal phone or tablet.
    Personal,
    /// Household kiosk or shared tablet.
    Shared,
}

impl DeviceClass {
    /// Returns all device classes in canonical order.
    pub fn all() -> &'static [DeviceClass] {
        &[
            DeviceClass::Workstation,
            DeviceClass::Personal,
            DeviceClass::Shared,
        ]
    }

    /// Returns the stable storage key for this device class.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Workstation => "workstation",
            DeviceClass::Personal => "personal",
            DeviceClass::Shared => "shared",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workstation" => Ok(DeviceClass::Workstation),
            "personal" => Ok(DeviceClass::Personal),
            "shared" => Ok(DeviceClass::Shared),
            other => Err(ValidationError::invalid_format(
                "device_class",
                format!("unknown device class '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_round_trips_through_from_str() {
        for device in DeviceClass::all() {
            assert_eq!(device.as_str().parse::<DeviceClass>().unwrap(), *device);
        }
    }
}
