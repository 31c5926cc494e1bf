/**
 * TH Control Example
 *
 * Drives a TemperatureHumiditySwitch against a simulated device: mutations are
 * handed to a channel, and a small task plays the device by reporting the
 * resulting params back into the switch.
 */
use serde_json::json;
use sonoff_th::error::Result;
use sonoff_th::{ParamSink, Params, SwitchBuilder, TemperatureHumiditySwitch};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

struct SimulatedLink {
    tx: mpsc::Sender<Params>,
}

impl ParamSink for SimulatedLink {
    async fn send(&self, device_id: &str, params: Params) -> Result<()> {
        println!("[LINK] -> {}: {}", device_id, serde_json::Value::Object(params.clone()));
        self.tx
            .send(params)
            .await
            .map_err(|e| sonoff_th::SwitchError::Transport(e.to_string()))
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("--- sonoff-th - TH Control ---");

    // 1. Build the switch with what discovery would have told us
    let (tx, mut rx) = mpsc::channel(8);
    let switch = SwitchBuilder::new("1000abcdef")
        .basic_info(json!({"deviceType": "normal"}).as_object().cloned().unwrap_or_default())
        .params(json!({"switch": "off", "currentTemperature": "20.4", "currentHumidity": "48"})
            .as_object()
            .cloned()
            .unwrap_or_default())
        .build(SimulatedLink { tx });

    // 2. The simulated device echoes every accepted mutation as a report
    let device = switch.clone();
    tokio::spawn(async move {
        while let Some(mut params) = rx.recv().await {
            if let Some(device_type) = params.remove("deviceType") {
                let mut info = device.basic_info();
                info.insert("deviceType".into(), device_type);
                device.set_basic_info(info);
            }
            device.apply_params(params);
        }
    });

    let th = TemperatureHumiditySwitch::new(switch);
    println!(
        "[INFO] state={} temperature={:?} humidity={:?}",
        th.state(),
        th.current_temperature(),
        th.current_humidity()
    );

    println!("[STEP 1] Switching ON...");
    if let Err(e) = th.turn_on().await {
        eprintln!("[ERROR] turn_on failed: {}", e);
    }
    sleep(Duration::from_millis(100)).await;
    println!("[INFO] state={} is_on={}", th.state(), th.is_on());

    println!("[STEP 2] Heating between 18 and 21...");
    if let Err(e) = th.set_heat_targets(18, 21).await {
        eprintln!("[ERROR] set_heat_targets failed: {}", e);
    }
    sleep(Duration::from_millis(100)).await;
    println!("[INFO] state={}", th.state());

    println!("[STEP 3] Back to manual OFF...");
    if let Err(e) = th.turn_off().await {
        eprintln!("[ERROR] turn_off failed: {}", e);
    }
    sleep(Duration::from_millis(100)).await;
    println!("[INFO] state={} is_off={}", th.state(), th.is_off());

    th.base().stop();
    println!("[INFO] Example finished.");
}
