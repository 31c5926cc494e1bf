//! Switch configuration and builder.

use crate::error::Result;
use crate::params::Params;
use crate::switch::{ParamSink, Switch};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
const DEFAULT_QUEUE_SIZE: usize = 32;
const DEFAULT_EVENT_CAPACITY: usize = 16;

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_queue_size() -> usize {
    DEFAULT_QUEUE_SIZE
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

/// Settings for a [`Switch`], loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfig {
    /// Device identifier
    pub device_id: String,
    /// How long a single mutation may take before failing with `Timeout`
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Capacity of the pending mutation queue
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
    /// Capacity of the event broadcast buffer
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl SwitchConfig {
    pub fn new<I: Into<String>>(device_id: I) -> Self {
        Self {
            device_id: device_id.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            queue_size: DEFAULT_QUEUE_SIZE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Parses a configuration object, filling in defaults for omitted fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Builder for [`Switch`].
///
/// ```rust,no_run
/// use sonoff_th::{LoggingSink, SwitchBuilder};
/// use std::time::Duration;
///
/// # async fn run() {
/// let switch = SwitchBuilder::new("1000abcdef")
///     .request_timeout(Duration::from_secs(3))
///     .build(LoggingSink);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SwitchBuilder {
    config: SwitchConfig,
    basic_info: Params,
    params: Params,
}

impl SwitchBuilder {
    pub fn new<I: Into<String>>(device_id: I) -> Self {
        Self::from_config(SwitchConfig::new(device_id))
    }

    pub fn from_config(config: SwitchConfig) -> Self {
        Self {
            config,
            basic_info: Params::new(),
            params: Params::new(),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn queue_size(mut self, size: usize) -> Self {
        self.config.queue_size = size;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Initial basic info, e.g. taken from the discovery record.
    pub fn basic_info(mut self, basic_info: Params) -> Self {
        self.basic_info = basic_info;
        self
    }

    /// Initial params, e.g. taken from the discovery record.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    /// Creates the switch and spawns its dispatch task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build<S: ParamSink>(self, sink: S) -> Switch {
        let mut config = self.config;
        config.queue_size = config.queue_size.max(1);
        config.event_capacity = config.event_capacity.max(1);
        Switch::spawn(config, self.basic_info, self.params, sink)
    }
}
