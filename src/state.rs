//! Derived switch state.
//! Computed from the basic info and params snapshots on every read; never stored.

use crate::params::{DeviceType, KEY_DEVICE_TYPE, KEY_SWITCH, Params, Power, get_str};
use log::debug;

define_named_enum! {
    /// The four states a TH switch can be observed in.
    pub enum SwitchState {
        /// Normal mode, relay closed.
        On = "ON",
        /// Normal mode, relay open.
        Off = "OFF",
        /// Thermostat mode; the relay follows the temperature targets.
        Temperature = "TEMPERATURE",
        /// Anything else, including missing keys.
        Unknown = "UNKNOWN",
    }
}

/// Classifies the device from its `deviceType` and `switch` values.
///
/// Absent keys never fail: a missing `deviceType` reads as an empty string and
/// a missing `switch` as `UNKNOWN`.
pub fn derive_state(basic_info: &Params, params: &Params) -> SwitchState {
    let device_type = get_str(basic_info, KEY_DEVICE_TYPE).unwrap_or("");
    let switch = get_str(params, KEY_SWITCH).unwrap_or(SwitchState::Unknown.as_str());

    if device_type == DeviceType::Normal.as_str() && switch == Power::Off.as_str() {
        SwitchState::Off
    } else if device_type == DeviceType::Normal.as_str() && switch == Power::On.as_str() {
        SwitchState::On
    } else if device_type == DeviceType::Temperature.as_str() {
        SwitchState::Temperature
    } else {
        debug!(
            "Unknown state {} / deviceType {} returned.",
            switch, device_type
        );
        SwitchState::Unknown
    }
}

fn in_normal_mode_with(basic_info: &Params, params: &Params, power: Power) -> bool {
    match (
        get_str(params, KEY_SWITCH),
        get_str(basic_info, KEY_DEVICE_TYPE),
    ) {
        (Some(switch), Some(device_type)) => {
            switch == power.as_str() && device_type == DeviceType::Normal.as_str()
        }
        _ => false,
    }
}

/// True only for a normal-mode device whose relay reports `on`.
pub fn is_on(basic_info: &Params, params: &Params) -> bool {
    in_normal_mode_with(basic_info, params, Power::On)
}

/// True only for a normal-mode device whose relay reports `off`.
pub fn is_off(basic_info: &Params, params: &Params) -> bool {
    in_normal_mode_with(basic_info, params, Power::Off)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn map(value: Value) -> Params {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn normal_on_off() {
        let info = map(json!({"deviceType": "normal"}));
        assert_eq!(derive_state(&info, &map(json!({"switch": "on"}))), SwitchState::On);
        assert_eq!(derive_state(&info, &map(json!({"switch": "off"}))), SwitchState::Off);
    }

    #[test]
    fn temperature_ignores_switch() {
        let info = map(json!({"deviceType": "temperature"}));
        for params in [
            json!({"switch": "on"}),
            json!({"switch": "off"}),
            json!({"switch": "flicker"}),
            json!({}),
        ] {
            assert_eq!(derive_state(&info, &map(params)), SwitchState::Temperature);
        }
    }

    #[test]
    fn unknown_combinations() {
        let cases = [
            (json!({}), json!({})),
            (json!({}), json!({"switch": "on"})),
            (json!({"deviceType": "normal"}), json!({})),
            (json!({"deviceType": "normal"}), json!({"switch": "ON"})),
            (json!({"deviceType": "pulse"}), json!({"switch": "off"})),
            (json!({"deviceType": 3}), json!({"switch": "on"})),
        ];
        for (info, params) in cases {
            assert_eq!(derive_state(&map(info), &map(params)), SwitchState::Unknown);
        }
    }

    #[test]
    fn device_type_read_from_basic_info_only() {
        let info = map(json!({}));
        let params = map(json!({"switch": "on", "deviceType": "normal"}));
        assert_eq!(derive_state(&info, &params), SwitchState::Unknown);
        assert!(!is_on(&info, &params));
    }

    #[test]
    fn predicates() {
        let normal = map(json!({"deviceType": "normal"}));
        let temp = map(json!({"deviceType": "temperature"}));
        let on = map(json!({"switch": "on"}));
        let off = map(json!({"switch": "off"}));
        let empty = Params::new();

        assert!(is_on(&normal, &on));
        assert!(!is_off(&normal, &on));
        assert!(is_off(&normal, &off));
        assert!(!is_on(&normal, &off));

        assert!(!is_on(&temp, &on));
        assert!(!is_off(&temp, &off));

        assert!(!is_on(&normal, &empty));
        assert!(!is_off(&normal, &empty));
        assert!(!is_on(&empty, &on));
        assert!(!is_off(&empty, &off));
        assert!(!is_on(&empty, &empty));
    }

    #[test]
    fn state_names() {
        assert_eq!(SwitchState::Temperature.as_str(), "TEMPERATURE");
        assert_eq!(SwitchState::Unknown.to_string(), "UNKNOWN");
        assert_eq!("on".parse::<SwitchState>().unwrap(), SwitchState::On);
        assert_eq!("OFF".parse::<SwitchState>().unwrap(), SwitchState::Off);
        assert!("dim".parse::<SwitchState>().is_err());
    }
}
