//! Raw parameter vocabulary of the TH10/TH16 and the payloads built from it.
//!
//! The device reports and accepts flat JSON objects. Keys and values used here
//! follow the LAN-mode firmware exactly; anything not listed is passed through
//! untouched by the switch base.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw parameter mapping as reported by or sent to the device.
pub type Params = serde_json::Map<String, Value>;

pub const KEY_SWITCH: &str = "switch";
pub const KEY_MAIN_SWITCH: &str = "mainSwitch";
pub const KEY_DEVICE_TYPE: &str = "deviceType";
pub const KEY_TARGETS: &str = "targets";
pub const KEY_CURRENT_TEMPERATURE: &str = "currentTemperature";
pub const KEY_CURRENT_HUMIDITY: &str = "currentHumidity";

/// Reported instead of a reading when the probe is unplugged.
pub const VALUE_UNAVAILABLE: &str = "unavailable";

/// Relay position as written in `switch` / `mainSwitch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

/// Operating mode discriminator found in `deviceType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Plain relay, driven by `switch`.
    Normal,
    /// Relay driven by the temperature `targets`.
    Temperature,
}

impl DeviceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Temperature => "temperature",
        }
    }
}

/// Switch change applied when a target bound is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub switch: Power,
}

/// A temperature bound paired with the reaction to apply when it is reached.
///
/// Exactly one of `target_high` / `target_low` is set by the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_high: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_low: Option<i32>,
    pub reaction: Reaction,
}

impl Target {
    /// Reaction fired when the reading rises to `bound`.
    pub fn high(bound: i32, switch: Power) -> Self {
        Self {
            target_high: Some(bound),
            target_low: None,
            reaction: Reaction { switch },
        }
    }

    /// Reaction fired when the reading falls to `bound`.
    pub fn low(bound: i32, switch: Power) -> Self {
        Self {
            target_high: None,
            target_low: Some(bound),
            reaction: Reaction { switch },
        }
    }
}

/// Payload that puts the relay in normal mode with the given position.
pub fn power_params(power: Power) -> Params {
    let mut params = Params::new();
    params.insert(KEY_SWITCH.into(), power.as_str().into());
    params.insert(KEY_MAIN_SWITCH.into(), power.as_str().into());
    params.insert(KEY_DEVICE_TYPE.into(), DeviceType::Normal.as_str().into());
    params
}

/// Payload for thermostat mode with the given targets.
pub fn targets_params(targets: &[Target]) -> Result<Params> {
    let mut params = Params::new();
    params.insert(KEY_MAIN_SWITCH.into(), Power::On.as_str().into());
    params.insert(
        KEY_DEVICE_TYPE.into(),
        DeviceType::Temperature.as_str().into(),
    );
    params.insert(KEY_TARGETS.into(), serde_json::to_value(targets)?);
    Ok(params)
}

/// Heater control: relay off at `high`, back on at `low`.
///
/// Bounds are passed through unchecked.
pub fn heat_targets_params(low: i32, high: i32) -> Result<Params> {
    targets_params(&[Target::high(high, Power::Off), Target::low(low, Power::On)])
}

/// Cooler control: relay on at `high`, off again at `low`.
pub fn cool_targets_params(low: i32, high: i32) -> Result<Params> {
    targets_params(&[Target::high(high, Power::On), Target::low(low, Power::Off)])
}

/// Looks up a string value, treating non-strings as absent.
pub fn get_str<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

/// Reads a probe value that may be reported as a number or a numeric string.
pub fn get_reading(params: &Params, key: &str) -> Option<f64> {
    match params.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.eq_ignore_ascii_case(VALUE_UNAVAILABLE) => None,
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
