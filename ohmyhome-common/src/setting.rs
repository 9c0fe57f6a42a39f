use core::{fmt::Display, str::FromStr};

use crate::{Domain, Mode, OutOfDomain, ParseError, SettingValue, Theme, settings};

settings! {
    /// A named piece of automation configuration or device state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Setting {
        /// Colour scheme of the panel
        Theme {
            key: "theme",
            legacy_key: None,
            domain: Domain::Theme,
            default: SettingValue::Theme(Theme::Dark),
            remote: false,
        },
        Mode {
            key: "mode",
            legacy_key: None,
            domain: Domain::Mode,
            default: SettingValue::Mode(Mode::ComfortPriority),
            remote: true,
        },
        /// Master switch of the whole automation system
        SystemOn {
            key: "systemOn",
            legacy_key: None,
            domain: Domain::Switch,
            default: SettingValue::Switch(false),
            remote: true,
        },
        /// Light sensor level that triggers automations (%)
        LuminanceThreshold {
            key: "luminanceThreshold",
            legacy_key: Some("luminance"),
            domain: Domain::Range { min: 0, max: 100 },
            default: SettingValue::Level(50),
            remote: false,
        },
        /// Desired light actuator intensity (%)
        LightIntensityTarget {
            key: "lightIntensityTarget",
            legacy_key: Some("light"),
            domain: Domain::Range { min: 0, max: 100 },
            default: SettingValue::Level(50),
            remote: false,
        },
        /// Relative humidity above which the fan runs (%)
        HumidityThreshold {
            key: "humidityThreshold",
            legacy_key: Some("humidity"),
            domain: Domain::Range { min: 0, max: 100 },
            default: SettingValue::Level(60),
            remote: false,
        },
        /// Thermostat target (°C)
        TemperatureThreshold {
            key: "temperatureThreshold",
            legacy_key: Some("temperature"),
            domain: Domain::Range { min: 18, max: 30 },
            default: SettingValue::Level(24),
            remote: false,
        },
    }
}

impl Setting {
    pub fn validate(&self, value: &SettingValue) -> Result<(), OutOfDomain> {
        if self.domain().contains(value) {
            Ok(())
        } else {
            Err(OutOfDomain { setting: *self, value: *value })
        }
    }

    pub fn parse_value(&self, raw: &str) -> Result<SettingValue, ParseError> {
        self.domain()
            .parse(raw)
            .ok_or_else(|| ParseError::InvalidValue { setting: *self, raw: raw.into() })
    }

    /// The other value of a two-valued setting, `None` for the rest
    pub fn toggled(&self, value: &SettingValue) -> Option<SettingValue> {
        self.domain().toggled(value)
    }
}

impl Display for Setting {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Setting {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Setting::ALL
            .iter()
            .find(|setting| setting.key() == s || setting.legacy_key() == Some(s))
            .copied()
            .ok_or_else(|| ParseError::UnknownSetting(s.into()))
    }
}
