use compact_str::CompactString;

use crate::{Setting, SettingValue};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{value} is outside the domain of {setting}")]
pub struct OutOfDomain {
    pub setting: Setting,
    pub value: SettingValue,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown setting: {0}")]
    UnknownSetting(CompactString),
    #[error("invalid value {raw:?} for {setting}")]
    InvalidValue {
        setting: Setting,
        raw: CompactString,
    },
}
