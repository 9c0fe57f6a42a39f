use core::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub const fn other(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(()),
        }
    }
}

/// Automation strategy of the house controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Automations may override schedules to keep thresholds
    ComfortPriority,
    /// Only explicit user commands move actuators
    ManualOnly,
    /// Only the configured schedule moves actuators
    ScheduleOnly,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::ComfortPriority, Mode::ManualOnly, Mode::ScheduleOnly];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::ComfortPriority => "comfort_priority",
            Mode::ManualOnly => "manual_only",
            Mode::ScheduleOnly => "schedule_only",
        }
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL.into_iter().find(|m| m.as_str() == s).ok_or(())
    }
}

/// Value of a single setting
///
/// The [`Display`] form is what ends up in the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Theme(Theme),
    Mode(Mode),
    Switch(bool),
    Level(i32),
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingValue::Theme(theme) => f.write_str(theme.as_str()),
            SettingValue::Mode(mode) => f.write_str(mode.as_str()),
            SettingValue::Switch(on) => write!(f, "{on}"),
            SettingValue::Level(level) => write!(f, "{level}"),
        }
    }
}

impl From<Theme> for SettingValue {
    fn from(theme: Theme) -> Self {
        SettingValue::Theme(theme)
    }
}

impl From<Mode> for SettingValue {
    fn from(mode: Mode) -> Self {
        SettingValue::Mode(mode)
    }
}

impl From<bool> for SettingValue {
    fn from(on: bool) -> Self {
        SettingValue::Switch(on)
    }
}

impl From<i32> for SettingValue {
    fn from(level: i32) -> Self {
        SettingValue::Level(level)
    }
}

/// Set of values a setting accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Theme,
    Mode,
    Switch,
    /// Inclusive integer range
    Range { min: i32, max: i32 },
}

impl Domain {
    pub fn contains(&self, value: &SettingValue) -> bool {
        match (self, value) {
            (Domain::Theme, SettingValue::Theme(_)) => true,
            (Domain::Mode, SettingValue::Mode(_)) => true,
            (Domain::Switch, SettingValue::Switch(_)) => true,
            (Domain::Range { min, max }, SettingValue::Level(level)) => (*min..=*max).contains(level),
            _ => false,
        }
    }

    /// Parses the natural string form of a value, rejecting anything outside the domain
    pub fn parse(&self, raw: &str) -> Option<SettingValue> {
        let raw = raw.trim();

        let value = match self {
            Domain::Theme => SettingValue::Theme(raw.parse().ok()?),
            Domain::Mode => SettingValue::Mode(raw.parse().ok()?),
            Domain::Switch => SettingValue::Switch(raw.parse().ok()?),
            Domain::Range { .. } => SettingValue::Level(raw.parse().ok()?),
        };

        self.contains(&value).then_some(value)
    }

    /// The other value of a two-valued domain
    pub fn toggled(&self, value: &SettingValue) -> Option<SettingValue> {
        match (self, value) {
            (Domain::Theme, SettingValue::Theme(theme)) => Some(SettingValue::Theme(theme.other())),
            (Domain::Switch, SettingValue::Switch(on)) => Some(SettingValue::Switch(!on)),
            _ => None,
        }
    }
}
