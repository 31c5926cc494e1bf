//! # sonoff-th
//!
//! State adapter for Sonoff TH10/TH16 temperature/humidity switches in LAN mode.
//! Derives the switch state from the device's reported parameters and builds
//! the parameter payloads for on/off and thermostat commands.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sonoff_th::{LoggingSink, Switch, TemperatureHumiditySwitch};
//!
//! # async fn run() {
//! let th = TemperatureHumiditySwitch::new(Switch::new("DEVICE_ID", LoggingSink));
//! // th.set_heat_targets(18, 21).await; // Asynchronous call
//! # }
//! ```
//!
#[macro_use]
pub mod macros;
pub mod base;
pub mod config;
pub mod error;
pub mod params;
pub mod state;
pub mod switch;
pub mod th;

pub use base::SwitchBase;
pub use config::{SwitchBuilder, SwitchConfig};
pub use error::SwitchError;
pub use params::{Params, Power, Target};
pub use state::SwitchState;
pub use switch::{LoggingSink, ParamSink, Switch, SwitchEvent};
pub use th::TemperatureHumiditySwitch;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> &'static str {
    VERSION
}
