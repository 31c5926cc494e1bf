//! Sonoff TH10/TH16 (temperature/humidity relay) adapter.
//!
//! A stateless lens over a [`SwitchBase`]: every property re-reads the base's
//! snapshots, and every command is a single `update_params` call whose result
//! is returned as-is.
//!
//! ```rust,no_run
//! use sonoff_th::{LoggingSink, Switch, SwitchState, TemperatureHumiditySwitch};
//!
//! # async fn run() -> sonoff_th::error::Result<()> {
//! let th = TemperatureHumiditySwitch::new(Switch::new("1000abcdef", LoggingSink));
//! th.turn_on().await?;
//! if th.state() == SwitchState::Temperature {
//!     println!("thermostat mode, reading {:?}", th.current_temperature());
//! }
//! # Ok(())
//! # }
//! ```

use crate::base::SwitchBase;
use crate::error::{Result, SwitchError};
use crate::params::{
    self, KEY_CURRENT_HUMIDITY, KEY_CURRENT_TEMPERATURE, Power, cool_targets_params,
    heat_targets_params, power_params,
};
use crate::state::{self, SwitchState};
use log::debug;

/// Device State Adapter for the TH10/TH16.
#[derive(Debug, Clone)]
pub struct TemperatureHumiditySwitch<B> {
    base: B,
}

impl<B: SwitchBase> TemperatureHumiditySwitch<B> {
    pub fn new(base: B) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn into_base(self) -> B {
        self.base
    }

    pub fn device_id(&self) -> &str {
        self.base.device_id()
    }

    /// Current derived state: `ON`, `OFF`, `TEMPERATURE` or `UNKNOWN`.
    pub fn state(&self) -> SwitchState {
        state::derive_state(&self.base.basic_info(), &self.base.params())
    }

    /// Whether the device is in normal mode with the relay on.
    pub fn is_on(&self) -> bool {
        state::is_on(&self.base.basic_info(), &self.base.params())
    }

    /// Whether the device is in normal mode with the relay off.
    pub fn is_off(&self) -> bool {
        state::is_off(&self.base.basic_info(), &self.base.params())
    }

    /// Last temperature reported by the probe, if any.
    pub fn current_temperature(&self) -> Option<f64> {
        params::get_reading(&self.base.params(), KEY_CURRENT_TEMPERATURE)
    }

    /// Last relative humidity reported by the probe, if any.
    pub fn current_humidity(&self) -> Option<f64> {
        params::get_reading(&self.base.params(), KEY_CURRENT_HUMIDITY)
    }

    /// Turn the switch on (normal mode).
    pub async fn turn_on(&self) -> Result<()> {
        debug!("Switch turn_on called.");
        self.base.update_params(power_params(Power::On)).await
    }

    /// Turn the switch off (normal mode).
    pub async fn turn_off(&self) -> Result<()> {
        debug!("Switch turn_off called.");
        self.base.update_params(power_params(Power::Off)).await
    }

    /// Set the target temperatures for heating.
    ///
    /// The relay opens when the reading reaches `high` and closes again at
    /// `low`. Values are sent unchecked.
    pub async fn set_heat_targets(&self, low: i32, high: i32) -> Result<()> {
        debug!("Switch set_heat_targets {}/{} called.", low, high);
        self.base.update_params(heat_targets_params(low, high)?).await
    }

    /// Set the target temperatures for cooling.
    ///
    /// The relay closes when the reading reaches `high` and opens again at
    /// `low`. Values are sent unchecked.
    pub async fn set_cool_targets(&self, low: i32, high: i32) -> Result<()> {
        debug!("Switch set_cool_targets {}/{} called.", low, high);
        self.base.update_params(cool_targets_params(low, high)?).await
    }

    /// Request a state directly. Only `ON` and `OFF` can be requested;
    /// thermostat mode needs targets, see [`set_heat_targets`](Self::set_heat_targets).
    pub async fn set_state(&self, state: SwitchState) -> Result<()> {
        match state {
            SwitchState::On => self.turn_on().await,
            SwitchState::Off => self.turn_off().await,
            other => Err(SwitchError::InvalidState(other.to_string())),
        }
    }
}
