//! In-process switch base.
//! Stores the state reported for one device and dispatches parameter
//! mutations, in submission order, to a transport sink.

use crate::base::SwitchBase;
use crate::config::{SwitchBuilder, SwitchConfig};
use crate::error::{Result, SwitchError};
use crate::params::Params;
use futures_core::stream::Stream;
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Duration, timeout};
use tokio_util::sync::CancellationToken;

/// Carries parameter mutations to the device.
///
/// This is where a LAN client plugs in: it receives the raw mapping and is
/// responsible for framing, encryption and delivery. Returning an error fails
/// the corresponding `update_params` call with that same error.
pub trait ParamSink: Send + Sync + 'static {
    fn send(&self, device_id: &str, params: Params) -> impl Future<Output = Result<()>> + Send;
}

/// A sink that only logs what it is given and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl ParamSink for LoggingSink {
    async fn send(&self, device_id: &str, params: Params) -> Result<()> {
        info!("Switch {} update_params: {}", device_id, Value::Object(params));
        Ok(())
    }
}

/// Notification emitted when reported state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchEvent {
    /// Basic info was replaced; carries the new mapping.
    BasicInfo(Params),
    /// Params were merged; carries only the keys whose values changed.
    Params(Params),
}

/// A mutation waiting for the dispatch task.
struct PendingUpdate {
    params: Params,
    resp_tx: oneshot::Sender<Result<()>>,
}

/// Shared mutable state of a switch.
struct SwitchInner {
    basic_info: Params,
    params: Params,
    stopped: bool,
    last_report: Option<Instant>,
}

/// Handle to a switch's reported state and its mutation queue.
///
/// Cloning is cheap; all clones share state and the dispatch task. The task
/// exits once [`stop`](Self::stop) is called or every handle is dropped.
#[derive(Clone)]
pub struct Switch {
    id: String,
    state: Arc<RwLock<SwitchInner>>,
    tx: mpsc::Sender<PendingUpdate>,
    event_tx: broadcast::Sender<SwitchEvent>,
    cancel_token: CancellationToken,
}

impl Switch {
    // -------------------------------------------------------------------------
    // Public API
    // -------------------------------------------------------------------------

    /// Create a switch with default settings. Must be called within a Tokio runtime.
    pub fn new<I, S>(id: I, sink: S) -> Self
    where
        I: Into<String>,
        S: ParamSink,
    {
        SwitchBuilder::new(id).build(sink)
    }

    pub(crate) fn spawn<S: ParamSink>(
        config: SwitchConfig,
        basic_info: Params,
        params: Params,
        sink: S,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_size);
        let (event_tx, _) = broadcast::channel(config.event_capacity);
        let cancel_token = CancellationToken::new();

        let task = DispatchTask {
            device_id: config.device_id.clone(),
            sink,
            request_timeout: config.request_timeout(),
            cancel_token: cancel_token.clone(),
        };
        tokio::spawn(task.run(rx));

        info!("Switch {} created", config.device_id);
        Self {
            id: config.device_id,
            state: Arc::new(RwLock::new(SwitchInner {
                basic_info,
                params,
                stopped: false,
                last_report: None,
            })),
            tx,
            event_tx,
            cancel_token,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn basic_info(&self) -> Params {
        self.with_state(|s| s.basic_info.clone())
    }

    pub fn params(&self) -> Params {
        self.with_state(|s| s.params.clone())
    }

    /// Time of the last report applied through [`apply_params`](Self::apply_params).
    pub fn last_report(&self) -> Option<Instant> {
        self.with_state(|s| s.last_report)
    }

    pub fn is_stopped(&self) -> bool {
        self.with_state(|s| s.stopped)
    }

    /// Replaces the device metadata.
    pub fn set_basic_info(&self, basic_info: Params) {
        self.with_state_mut(|s| s.basic_info = basic_info.clone());
        let _ = self.event_tx.send(SwitchEvent::BasicInfo(basic_info));
    }

    /// Merges a (possibly partial) device report into the stored params.
    ///
    /// An event is emitted only when at least one value actually changed.
    pub fn apply_params(&self, report: Params) {
        let changed = self.with_state_mut(|s| {
            s.last_report = Some(Instant::now());
            let mut changed = Params::new();
            for (key, value) in report {
                if s.params.get(&key) != Some(&value) {
                    s.params.insert(key.clone(), value.clone());
                    changed.insert(key, value);
                }
            }
            changed
        });

        if changed.is_empty() {
            debug!("Report for switch {} changed nothing", self.id);
        } else {
            debug!("Report for switch {} changed {:?}", self.id, changed);
            let _ = self.event_tx.send(SwitchEvent::Params(changed));
        }
    }

    /// Queues `params` for the sink and waits for the outcome.
    ///
    /// Stored params are left as they are; the device's next report is
    /// expected to reflect the mutation.
    pub async fn update_params(&self, params: Params) -> Result<()> {
        if self.is_stopped() {
            return Err(SwitchError::Closed);
        }

        debug!("update_params for switch {}: {:?}", self.id, params);
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(PendingUpdate { params, resp_tx })
            .await
            .map_err(|_| SwitchError::Closed)?;
        resp_rx.await.map_err(|_| SwitchError::Closed)?
    }

    /// Returns a Stream of state change events.
    pub fn stream(&self) -> impl Stream<Item = SwitchEvent> + Send + 'static {
        let mut rx = self.event_tx.subscribe();
        async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        }
    }

    /// Stops the dispatch task permanently. Pending and later updates fail with `Closed`.
    pub fn stop(&self) {
        info!("Stopping switch {}", self.id);
        self.with_state_mut(|s| s.stopped = true);
        self.cancel_token.cancel();
    }

    // -------------------------------------------------------------------------
    // Internal State Helpers
    // -------------------------------------------------------------------------

    fn with_state<R>(&self, f: impl FnOnce(&SwitchInner) -> R) -> R {
        f(&self.state.read())
    }

    fn with_state_mut<R>(&self, f: impl FnOnce(&mut SwitchInner) -> R) -> R {
        f(&mut self.state.write())
    }
}

impl std::fmt::Debug for Switch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Switch")
            .field("id", &self.id)
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl SwitchBase for Switch {
    fn device_id(&self) -> &str {
        self.id()
    }

    fn basic_info(&self) -> Params {
        Switch::basic_info(self)
    }

    fn params(&self) -> Params {
        Switch::params(self)
    }

    fn update_params(&self, params: Params) -> impl Future<Output = Result<()>> + Send {
        Switch::update_params(self, params)
    }
}

// -------------------------------------------------------------------------
// Background dispatch
// -------------------------------------------------------------------------

struct DispatchTask<S> {
    device_id: String,
    sink: S,
    request_timeout: Duration,
    cancel_token: CancellationToken,
}

impl<S: ParamSink> DispatchTask<S> {
    async fn run(self, mut rx: mpsc::Receiver<PendingUpdate>) {
        debug!("Starting dispatch task for switch {}", self.device_id);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    debug!("Dispatch task for {} received stop signal", self.device_id);
                    break;
                }
                update = rx.recv() => {
                    match update {
                        Some(update) => self.dispatch(update).await,
                        None => {
                            debug!("All handles for switch {} dropped, stopping task", self.device_id);
                            break;
                        }
                    }
                }
            }
        }

        rx.close();
        while let Ok(update) = rx.try_recv() {
            let _ = update.resp_tx.send(Err(SwitchError::Closed));
        }
        debug!("Dispatch task for {} exited", self.device_id);
    }

    async fn dispatch(&self, update: PendingUpdate) {
        let PendingUpdate { params, resp_tx } = update;

        if self.cancel_token.is_cancelled() {
            let _ = resp_tx.send(Err(SwitchError::Closed));
            return;
        }

        // Stop wins over a sink that is ready in the same poll
        let result = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(SwitchError::Closed),
            res = timeout(self.request_timeout, self.sink.send(&self.device_id, params)) => {
                res.unwrap_or(Err(SwitchError::Timeout))
            }
        };

        match &result {
            Ok(()) => {}
            Err(SwitchError::Timeout) => warn!(
                "update_params for switch {} timed out after {}ms",
                self.device_id,
                self.request_timeout.as_millis()
            ),
            Err(e) => error!("update_params failed for switch {}: {}", self.device_id, e),
        }

        let _ = resp_tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn apply_params_merges_reports() {
        let switch = Switch::new("t1", LoggingSink);
        switch.apply_params(map(json!({"switch": "off", "currentTemperature": "21.0"})));
        switch.apply_params(map(json!({"switch": "on"})));

        assert_eq!(
            switch.params(),
            map(json!({"switch": "on", "currentTemperature": "21.0"}))
        );
        assert!(switch.last_report().is_some());
    }

    #[tokio::test]
    async fn set_basic_info_replaces() {
        let switch = SwitchBuilder::new("t2")
            .basic_info(map(json!({"deviceType": "normal", "fwVersion": "3.5.0"})))
            .build(LoggingSink);
        switch.set_basic_info(map(json!({"deviceType": "temperature"})));
        assert_eq!(switch.basic_info(), map(json!({"deviceType": "temperature"})));
    }

    #[tokio::test]
    async fn update_does_not_touch_stored_params() {
        let switch = SwitchBuilder::new("t3")
            .params(map(json!({"switch": "off"})))
            .build(LoggingSink);
        switch.update_params(map(json!({"switch": "on"}))).await.unwrap();
        assert_eq!(switch.params(), map(json!({"switch": "off"})));
    }

    #[tokio::test]
    async fn debug_shows_id_and_stopped() {
        let switch = Switch::new("t5", LoggingSink);
        assert_eq!(
            format!("{:?}", switch),
            "Switch { id: \"t5\", stopped: false, .. }"
        );
        switch.stop();
        assert!(format!("{:?}", switch).contains("stopped: true"));
    }

    #[tokio::test]
    async fn stop_rejects_updates() {
        let switch = Switch::new("t4", LoggingSink);
        switch.stop();
        assert!(switch.is_stopped());
        assert_eq!(
            switch.update_params(Params::new()).await,
            Err(SwitchError::Closed)
        );
    }
}
