use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use tracing::{info, warn};

use thermometer_common::{
    button::{ButtonEvent, Level, LineId},
    pipeline::{ButtonPipeline, EdgeSender},
    screen::{NetworkStatus, ScreenModel, SystemStats},
    NodeConfig, SensorMessage, TOPIC_SENSOR_TEMPERATURE, TOPIC_SENSOR_VOLTAGE,
};

// Stand-in ROM address for the simulated DS18B20.
const SIMULATED_DS18B20_ID: &str = "28FF4A2B00000042";

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = NodeConfig::default();

    let mqtt_host = std::env::var("MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let mqtt_port = std::env::var("MQTT_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(1883);

    let mut mqtt_options = MqttOptions::new(
        config.network.mqtt_client_id.clone(),
        mqtt_host,
        mqtt_port,
    );

    if let Ok(user) = std::env::var("MQTT_USER") {
        let pass = std::env::var("MQTT_PASS").unwrap_or_default();
        mqtt_options.set_credentials(user, pass);
    }

    let (mqtt, mut eventloop) = AsyncClient::new(mqtt_options, 32);

    tokio::spawn(async move {
        loop {
            if let Err(err) = eventloop.poll().await {
                warn!("mqtt poll error: {err}");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    });

    let screen = Arc::new(Mutex::new(ScreenModel::default()));

    // Simulated button hardware: a level map the sampler reads and the
    // simulation loop below flips before raising edges.
    let line0 = LineId(config.pins.button0);
    let line1 = LineId(config.pins.button1);
    let levels: Arc<Mutex<HashMap<LineId, Level>>> = Arc::new(Mutex::new(HashMap::from([
        (line0, Level::Low),
        (line1, Level::Low),
    ])));

    let sampler_levels = levels.clone();
    let pipeline = ButtonPipeline::initialize(
        [line0, line1],
        config.buttons,
        move |line| sampler_levels.lock().unwrap()[&line],
    )
    .context("failed to start button pipeline")?;

    let callback_screen = screen.clone();
    pipeline.register_callback(move |line, event| match event {
        ButtonEvent::Pressed => {
            let mut screen = callback_screen.lock().unwrap();
            let current = if line == line0 {
                screen.prev_screen()
            } else {
                screen.next_screen()
            };
            info!("button {line} pressed, switched to {current:?}");
        }
        ButtonEvent::Released => {}
        ButtonEvent::LongPress => {
            info!("button {line} long press (restart request ignored on host)");
        }
    });
    let edges = pipeline.edge_sender();

    info!("thermometer node simulation started");

    let mut tick: u64 = 0;
    let mut interval =
        tokio::time::interval(Duration::from_millis(config.sample_interval_ms));

    loop {
        interval.tick().await;
        tick = tick.saturating_add(1);

        // Hardware integration point:
        // the esp backend replaces these with DS18B20/DHT22/ADC drivers.
        let ds_temp_c = 21.5 + ((tick % 8) as f32 * 0.2);
        let dht_temp_c = 22.0 + ((tick % 6) as f32 * 0.1);
        let dht_humidity = 42.0 + ((tick % 6) as f32 * 0.5);
        let voltage_mv = 3_200 + (tick % 5) as u32 * 20;

        let ds_message = SensorMessage::new(SIMULATED_DS18B20_ID)
            .sensor("DS18B20")
            .temperature_c(ds_temp_c)
            .to_json()?;
        mqtt.publish(TOPIC_SENSOR_TEMPERATURE, QoS::AtLeastOnce, false, ds_message)
            .await
            .context("failed to publish DS18B20 message")?;

        let dht_message = SensorMessage::new(config.device_id.clone())
            .sensor("DHT22")
            .temperature_c(dht_temp_c)
            .humidity_percent(dht_humidity)
            .to_json()?;
        mqtt.publish(TOPIC_SENSOR_TEMPERATURE, QoS::AtLeastOnce, false, dht_message)
            .await
            .context("failed to publish DHT22 message")?;

        let voltage_message = SensorMessage::new(config.device_id.clone())
            .sensor("V")
            .voltage_v(voltage_mv as f32 / 1000.0)
            .to_json()?;
        mqtt.publish(TOPIC_SENSOR_VOLTAGE, QoS::AtLeastOnce, false, voltage_message)
            .await
            .context("failed to publish voltage message")?;

        {
            let mut screen = screen.lock().unwrap();
            screen.set_temperatures(ds_temp_c, dht_temp_c, dht_humidity);
            screen.set_voltage_mv(voltage_mv);
            for line in screen.render(&SystemStats::default(), &NetworkStatus::default()) {
                info!("[oled] {line}");
            }
        }

        // Every third round, simulate a press of the "next screen" button.
        if tick % 3 == 0 {
            simulate_press(&levels, &edges, line1, config.buttons.debounce_ms).await;
        }
    }
}

async fn simulate_press(
    levels: &Arc<Mutex<HashMap<LineId, Level>>>,
    edges: &EdgeSender,
    line: LineId,
    debounce_ms: u64,
) {
    levels.lock().unwrap().insert(line, Level::High);
    edges.raw_edge(line);
    tokio::time::sleep(Duration::from_millis(debounce_ms * 2)).await;

    levels.lock().unwrap().insert(line, Level::Low);
    edges.raw_edge(line);
    tokio::time::sleep(Duration::from_millis(debounce_ms * 2)).await;
}
