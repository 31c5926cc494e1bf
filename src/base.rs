//! The capability seam between device adapters and whatever owns device state.

use crate::error::Result;
use crate::params::Params;
use std::future::Future;
use std::sync::Arc;

/// Access to a switch's reported state and its mutation entry point.
///
/// Reads return snapshots; an adapter re-reads on every property access, so
/// freshness is whatever the implementor last stored. `update_params` hands a
/// mapping to the implementor, which decides how and when it reaches the
/// device. Its errors are surfaced to callers unchanged.
pub trait SwitchBase: Send + Sync {
    /// Identifier of the underlying device.
    fn device_id(&self) -> &str;

    /// Snapshot of the device metadata (`deviceType` among others).
    fn basic_info(&self) -> Params;

    /// Snapshot of the last reported device parameters.
    fn params(&self) -> Params;

    /// Requests that `params` be applied to the device.
    fn update_params(&self, params: Params) -> impl Future<Output = Result<()>> + Send;
}

impl<B: SwitchBase> SwitchBase for Arc<B> {
    fn device_id(&self) -> &str {
        B::device_id(self)
    }

    fn basic_info(&self) -> Params {
        B::basic_info(self)
    }

    fn params(&self) -> Params {
        B::params(self)
    }

    fn update_params(&self, params: Params) -> impl Future<Output = Result<()>> + Send {
        B::update_params(self, params)
    }
}

impl<B: SwitchBase> SwitchBase for &B {
    fn device_id(&self) -> &str {
        B::device_id(self)
    }

    fn basic_info(&self) -> Params {
        B::basic_info(self)
    }

    fn params(&self) -> Params {
        B::params(self)
    }

    fn update_params(&self, params: Params) -> impl Future<Output = Result<()>> + Send {
        B::update_params(self, params)
    }
}
