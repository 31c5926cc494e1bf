//! Diagnostic log output of the state classification.

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use serde_json::{Value, json};
use sonoff_th::Params;
use sonoff_th::state::{SwitchState, derive_state};

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn map(value: Value) -> Params {
    value.as_object().cloned().expect("object")
}

#[test]
fn unknown_state_is_logged_with_observed_values() {
    log::set_logger(&LOGGER).expect("logger already set");
    log::set_max_level(LevelFilter::Debug);

    let on = derive_state(&map(json!({"deviceType": "normal"})), &map(json!({"switch": "on"})));
    assert_eq!(on, SwitchState::On);
    assert!(RECORDS.lock().is_empty());

    let unknown = derive_state(&map(json!({"deviceType": "pulse"})), &map(json!({})));
    assert_eq!(unknown, SwitchState::Unknown);

    let records = RECORDS.lock().clone();
    assert_eq!(records.len(), 1);
    let (level, message) = &records[0];
    assert_eq!(*level, Level::Debug);
    assert!(message.contains("UNKNOWN"), "{message}");
    assert!(message.contains("pulse"), "{message}");
}
