use std::{
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context};
use dht_sensor::dht22;
use ds18b20::{Ds18b20, Resolution};
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_svc::{
    mqtt::client::QoS,
    wifi::{AuthMethod, ClientConfiguration, Configuration},
};
use esp_idf_hal::{
    adc::{
        attenuation::DB_11,
        oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver},
        ADC1,
    },
    delay::{self, Ets, FreeRtos},
    gpio::{AnyIOPin, Gpio0, IOPin, Input, InputOutput, InterruptType, PinDriver, Pull},
    i2c::{I2cConfig, I2cDriver, I2C0},
    task::queue::Queue,
    units::FromValueType,
};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{modem::Modem, prelude::Peripherals},
    log::EspLogger,
    mqtt::client::{EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration},
    nvs::EspDefaultNvsPartition,
    wifi::{BlockingWifi, EspWifi},
};
use log::{debug, info, warn};
use one_wire_bus::{Address, OneWire};
use ssd1306::{
    mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306,
};

use thermometer_common::{
    button::{ButtonConfig, ButtonEngine, ButtonEvent, Level, LineId},
    screen::{NetworkStatus, ScreenModel, SystemStats},
    AdcConfig, NetworkConfig, NodeConfig, SensorMessage, TOPIC_SENSOR_TEMPERATURE,
    TOPIC_SENSOR_VOLTAGE,
};

const DS18B20_PIN: i32 = 4;
const DHT22_PIN: i32 = 16;
const BUTTON0_PIN: i32 = 1;
const BUTTON1_PIN: i32 = 2;

const EDGE_QUEUE_CAPACITY: usize = 10;

const WIFI_CONNECT_ATTEMPTS: u32 = 5;
const WIFI_RETRY_DELAY_MS: u64 = 3_000;

struct NodeReadings {
    ds_temperature_c: Option<f32>,
    dht: Option<(f32, f32)>,
    voltage_mv: Option<u32>,
}

struct SensorSuite {
    one_wire: OneWire<PinDriver<'static, AnyIOPin, InputOutput>>,
    ds18_address: Option<Address>,
    dht_pin: PinDriver<'static, AnyIOPin, InputOutput>,
    dht_last_read: Option<Instant>,
    dht_min_interval: Duration,
    adc_channel: AdcChannelDriver<'static, Gpio0, AdcDriver<'static, ADC1>>,
    adc_config: AdcConfig,
    delay: Ets,
}

impl SensorSuite {
    fn new(
        ds18_pin: AnyIOPin,
        dht_pin: AnyIOPin,
        adc1: ADC1,
        adc_pin: Gpio0,
        config: &NodeConfig,
    ) -> anyhow::Result<Self> {
        let mut one_wire_pin = PinDriver::input_output_od(ds18_pin)?;
        one_wire_pin.set_pull(Pull::Up)?;
        one_wire_pin.set_high()?;

        let mut dht_pin = PinDriver::input_output_od(dht_pin)?;
        dht_pin.set_pull(Pull::Up)?;
        dht_pin.set_high()?;

        let one_wire = OneWire::new(one_wire_pin)
            .map_err(|err| anyhow!("failed to initialize one-wire bus: {err:?}"))?;

        // The channel driver owns the ADC unit; nothing else reads ADC1.
        let adc = AdcDriver::new(adc1)?;
        let adc_channel = AdcChannelDriver::new(
            adc,
            adc_pin,
            &AdcChannelConfig {
                attenuation: DB_11,
                calibration: true,
                ..Default::default()
            },
        )?;

        let mut suite = Self {
            one_wire,
            ds18_address: None,
            dht_pin,
            dht_last_read: None,
            dht_min_interval: Duration::from_millis(config.dht_min_interval_ms),
            adc_channel,
            adc_config: config.adc,
            delay: Ets,
        };

        suite.refresh_ds18_address();
        Ok(suite)
    }

    fn read(&mut self) -> NodeReadings {
        NodeReadings {
            ds_temperature_c: self.read_ds_temperature_c(),
            dht: self.read_dht(),
            voltage_mv: self.read_voltage_mv(),
        }
    }

    fn refresh_ds18_address(&mut self) {
        let mut first_ds18: Option<Address> = None;
        let mut device_count = 0_u32;

        for addr in self.one_wire.devices(false, &mut self.delay) {
            match addr {
                Ok(address) => {
                    device_count = device_count.saturating_add(1);
                    if first_ds18.is_none() && address.family_code() == ds18b20::FAMILY_CODE {
                        first_ds18 = Some(address);
                    }
                }
                Err(err) => {
                    warn!("one-wire device scan failed: {err:?}");
                    break;
                }
            }
        }

        self.ds18_address = first_ds18;

        if let Some(address) = self.ds18_address {
            info!(
                "DS18B20 ready on GPIO{} ({} one-wire device(s), using {:?})",
                DS18B20_PIN, device_count, address
            );
        } else {
            warn!(
                "no DS18B20 found on GPIO{} ({} one-wire device(s) detected)",
                DS18B20_PIN, device_count
            );
        }
    }

    /// ROM address of the attached DS18B20 as 16 uppercase hex digits, used
    /// as the device id in published messages.
    fn ds18_rom_code(&self) -> Option<String> {
        self.ds18_address.map(|address| format!("{:016X}", address.0))
    }

    fn read_ds_temperature_c(&mut self) -> Option<f32> {
        if self.ds18_address.is_none() {
            self.refresh_ds18_address();
        }

        let address = self.ds18_address?;
        let sensor = match Ds18b20::new::<core::convert::Infallible>(address) {
            Ok(sensor) => sensor,
            Err(err) => {
                warn!("invalid DS18B20 address {:?}: {err:?}", address);
                self.ds18_address = None;
                return None;
            }
        };

        if let Err(err) =
            ds18b20::start_simultaneous_temp_measurement(&mut self.one_wire, &mut self.delay)
        {
            warn!("failed to start DS18B20 conversion: {err:?}");
            self.ds18_address = None;
            return None;
        }

        Resolution::Bits12.delay_for_measurement_time(&mut self.delay);

        match sensor.read_data(&mut self.one_wire, &mut self.delay) {
            Ok(data) => {
                info!("[DS18B20] Temperature: {:.1}°C", data.temperature);
                Some(data.temperature)
            }
            Err(err) => {
                warn!("failed to read DS18B20 data: {err:?}");
                self.ds18_address = None;
                None
            }
        }
    }

    fn read_dht(&mut self) -> Option<(f32, f32)> {
        if let Some(last) = self.dht_last_read {
            let since = last.elapsed();
            if since < self.dht_min_interval {
                warn!(
                    "too soon to read DHT22 again, wait {} ms",
                    (self.dht_min_interval - since).as_millis()
                );
                return None;
            }
        }

        if let Err(err) = self.dht_pin.set_high() {
            warn!("failed to set DHT22 line high before read: {err:?}");
            return None;
        }

        match dht22::blocking::read(&mut self.delay, &mut self.dht_pin) {
            Ok(reading) => {
                self.dht_last_read = Some(Instant::now());
                info!(
                    "[DHT22] Temperature: {:.1}°C, Humidity: {:.1}%",
                    reading.temperature, reading.relative_humidity
                );
                Some((reading.temperature, reading.relative_humidity))
            }
            Err(err) => {
                warn!("failed to read DHT22 on GPIO{}: {err:?}", DHT22_PIN);
                None
            }
        }
    }

    fn read_voltage_mv(&mut self) -> Option<u32> {
        // Calibrated read returns millivolts; fall back to the nominal
        // conversion from the raw count when calibration is unavailable.
        let measured_mv = match self.adc_channel.read() {
            Ok(mv) => u32::from(mv),
            Err(err) => {
                warn!("calibrated ADC read failed ({err}); using raw conversion");
                let raw = match self.adc_channel.read_raw() {
                    Ok(raw) => u32::from(raw),
                    Err(err) => {
                        warn!("failed to read ADC: {err}");
                        return None;
                    }
                };
                self.adc_config.raw_to_millivolts(raw)
            }
        };

        let corrected = self.adc_config.divider_corrected(measured_mv);
        debug!("ADC read: measured={measured_mv}mV, corrected={corrected}mV");
        Some(corrected)
    }
}

type Display = Ssd1306<
    I2CInterface<I2cDriver<'static>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// Screen model plus the (optional) panel it is drawn on. The node keeps
/// running headless when the panel is missing.
struct DisplayService {
    model: ScreenModel,
    panel: Option<Display>,
    stats: SystemStats,
    network: NetworkStatus,
}

impl DisplayService {
    fn new(i2c: I2C0, sda: AnyIOPin, scl: AnyIOPin) -> Self {
        let panel = match Self::init_panel(i2c, sda, scl) {
            Ok(panel) => {
                info!("SSD1306 initialized (SDA=GPIO8, SCL=GPIO9)");
                Some(panel)
            }
            Err(err) => {
                warn!("display init failed ({err:#}); continuing without display");
                None
            }
        };

        Self {
            model: ScreenModel::default(),
            panel,
            stats: SystemStats::default(),
            network: NetworkStatus::default(),
        }
    }

    fn init_panel(i2c: I2C0, sda: AnyIOPin, scl: AnyIOPin) -> anyhow::Result<Display> {
        let config = I2cConfig::new().baudrate(400.kHz().into());
        let i2c = I2cDriver::new(i2c, sda, scl, &config)?;

        let mut panel = Ssd1306::new(
            I2CDisplayInterface::new(i2c),
            DisplaySize128x64,
            DisplayRotation::Rotate0,
        )
        .into_buffered_graphics_mode();
        panel
            .init()
            .map_err(|err| anyhow!("no response from SSD1306: {err:?}"))?;
        Ok(panel)
    }

    fn model_mut(&mut self) -> &mut ScreenModel {
        &mut self.model
    }

    fn set_status(&mut self, stats: SystemStats, network: NetworkStatus) {
        self.stats = stats;
        self.network = network;
    }

    fn clear(&mut self) {
        if let Some(panel) = self.panel.as_mut() {
            panel.clear_buffer();
            if let Err(err) = panel.flush() {
                warn!("failed to clear display: {err:?}");
            }
        }
    }

    fn redraw(&mut self) {
        let lines = self.model.render(&self.stats, &self.network);
        let Some(panel) = self.panel.as_mut() else {
            return;
        };

        panel.clear_buffer();
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        // Title row, then up to four data rows.
        for (line, y) in lines.iter().zip([0, 16, 28, 40, 52]) {
            if let Err(err) =
                Text::with_baseline(line, Point::new(0, y), style, Baseline::Top).draw(panel)
            {
                warn!("failed to draw display line: {err:?}");
                return;
            }
        }

        if let Err(err) = panel.flush() {
            warn!("failed to refresh display: {err:?}");
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    info!("[APP] Startup..");
    info!("[APP] Free memory: {} bytes", unsafe {
        esp_idf_svc::sys::esp_get_free_heap_size()
    });

    let config = node_config();

    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let Peripherals {
        modem,
        pins,
        adc1,
        i2c0,
        ..
    } = Peripherals::take()?;

    let wifi = connect_wifi(modem, sys_loop, nvs_partition, &config.network)
        .context("wifi startup failed")?;

    let (mut mqtt, conn) = create_mqtt_client(&config.network)?;
    spawn_mqtt_poll_thread(conn)?;

    let mut sensors = SensorSuite::new(
        pins.gpio4.downgrade(),
        pins.gpio16.downgrade(),
        adc1,
        pins.gpio0,
        &config,
    )
    .context("failed to initialize sensor suite")?;

    let display = Arc::new(Mutex::new(DisplayService::new(
        i2c0,
        pins.gpio8.downgrade(),
        pins.gpio9.downgrade(),
    )));

    start_buttons(
        pins.gpio1.downgrade(),
        pins.gpio2.downgrade(),
        config.buttons,
        display.clone(),
    )
    .context("failed to initialize buttons")?;

    info!("Waiting for sensors to stabilize...");
    thread::sleep(Duration::from_millis(config.startup_settle_ms));

    let started = Instant::now();

    loop {
        let readings = sensors.read();

        if let Some(temp_c) = readings.ds_temperature_c {
            let id = sensors
                .ds18_rom_code()
                .unwrap_or_else(|| config.device_id.clone());
            match SensorMessage::new(id)
                .sensor("DS18B20")
                .temperature_c(temp_c)
                .to_json()
            {
                Ok(payload) => {
                    info!("DS18B20 message: {payload}");
                    publish(&mut mqtt, TOPIC_SENSOR_TEMPERATURE, &payload);
                }
                Err(err) => warn!("failed to format DS18B20 message: {err}"),
            }
        }

        if let Some((temp_c, humidity)) = readings.dht {
            match SensorMessage::new(config.device_id.clone())
                .sensor("DHT22")
                .temperature_c(temp_c)
                .humidity_percent(humidity)
                .to_json()
            {
                Ok(payload) => {
                    info!("DHT22 message: {payload}");
                    publish(&mut mqtt, TOPIC_SENSOR_TEMPERATURE, &payload);
                }
                Err(err) => warn!("failed to format DHT22 message: {err}"),
            }
        } else {
            warn!("skipping display temperature update, DHT22 read failed");
        }

        if let Some(voltage_mv) = readings.voltage_mv {
            info!(
                "ADC - Voltage: {} mV ({:.2} V)",
                voltage_mv,
                voltage_mv as f32 / 1000.0
            );
            match SensorMessage::new(config.device_id.clone())
                .sensor("V")
                .voltage_v(voltage_mv as f32 / 1000.0)
                .to_json()
            {
                Ok(payload) => {
                    info!("ADC message: {payload}");
                    publish(&mut mqtt, TOPIC_SENSOR_VOLTAGE, &payload);
                }
                Err(err) => warn!("failed to format voltage message: {err}"),
            }
        }

        {
            let mut display = display.lock().unwrap();
            if let (Some(ds_temp), Some((dht_temp, dht_humidity))) =
                (readings.ds_temperature_c, readings.dht)
            {
                display.model_mut().set_temperatures(ds_temp, dht_temp, dht_humidity);
            }
            if let Some(voltage_mv) = readings.voltage_mv {
                display.model_mut().set_voltage_mv(voltage_mv);
            }
            display.set_status(system_stats(started), network_status(&wifi));
            display.redraw();
        }

        thread::sleep(Duration::from_millis(config.sample_interval_ms));
    }
}

fn node_config() -> NodeConfig {
    let mut config = NodeConfig::default();

    if let Some(ssid) = option_env!("WIFI_SSID") {
        config.network.wifi_ssid = ssid.to_string();
    }
    if let Some(pass) = option_env!("WIFI_PASS") {
        config.network.wifi_pass = pass.to_string();
    }
    if let Some(url) = option_env!("MQTT_URL") {
        config.network.mqtt_url = url.to_string();
    }
    if let Some(user) = option_env!("MQTT_USER") {
        config.network.mqtt_user = user.to_string();
    }
    if let Some(pass) = option_env!("MQTT_PASS") {
        config.network.mqtt_pass = pass.to_string();
    }

    config
}

fn publish(mqtt: &mut EspMqttClient<'static>, topic: &str, payload: &str) {
    if let Err(err) = mqtt.publish(topic, QoS::AtLeastOnce, false, payload.as_bytes()) {
        warn!("publish failed for {topic}: {err:?}");
    }
}

fn connect_wifi(
    modem: Modem,
    sys_loop: EspSystemEventLoop,
    nvs_partition: EspDefaultNvsPartition,
    network: &NetworkConfig,
) -> anyhow::Result<EspWifi<'static>> {
    let mut esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs_partition))?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sys_loop)?;

    let auth_method = if network.wifi_pass.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPAWPA2Personal
    };

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: network
            .wifi_ssid
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi ssid too long"))?,
        password: network
            .wifi_pass
            .as_str()
            .try_into()
            .map_err(|_| anyhow!("wifi password too long"))?,
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("wifi started, connecting to `{}`", network.wifi_ssid);

    let mut last_err = None;
    for attempt in 1..=WIFI_CONNECT_ATTEMPTS {
        info!("wifi connect attempt {attempt}/{WIFI_CONNECT_ATTEMPTS}");
        match wifi.connect() {
            Ok(()) => match wifi.wait_netif_up() {
                Ok(()) => {
                    info!("wifi connected and netif up on attempt {attempt}");
                    last_err = None;
                    break;
                }
                Err(err) => {
                    warn!("wifi netif up failed on attempt {attempt}: {err:#}");
                    last_err = Some(err);
                }
            },
            Err(err) => {
                warn!("wifi connect failed on attempt {attempt}: {err:#}");
                last_err = Some(err);
            }
        }

        if attempt < WIFI_CONNECT_ATTEMPTS {
            let _ = wifi.disconnect();
            thread::sleep(Duration::from_millis(WIFI_RETRY_DELAY_MS));
        }
    }

    if let Some(err) = last_err {
        return Err(anyhow::Error::from(err)
            .context(format!("all {WIFI_CONNECT_ATTEMPTS} wifi connect attempts failed")));
    }

    log_wifi_rssi();
    Ok(esp_wifi)
}

fn log_wifi_rssi() {
    let mut ap_info = esp_idf_svc::sys::wifi_ap_record_t::default();
    let rc = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
    if rc == esp_idf_svc::sys::ESP_OK {
        info!("Current RSSI: {} dBm", ap_info.rssi);
    } else {
        warn!("Failed to get AP info");
    }
}

fn network_status(wifi: &EspWifi<'static>) -> NetworkStatus {
    let mut ap_info = esp_idf_svc::sys::wifi_ap_record_t::default();
    let rc = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
    if rc != esp_idf_svc::sys::ESP_OK {
        return NetworkStatus::default();
    }

    let ssid_len = ap_info
        .ssid
        .iter()
        .position(|&byte| byte == 0)
        .unwrap_or(ap_info.ssid.len());
    let ssid = String::from_utf8_lossy(&ap_info.ssid[..ssid_len]).into_owned();

    let ip = wifi
        .sta_netif()
        .get_ip_info()
        .ok()
        .map(|ip_info| ip_info.ip.to_string());

    NetworkStatus {
        connected: true,
        ssid,
        rssi_dbm: ap_info.rssi,
        ip,
    }
}

fn system_stats(started: Instant) -> SystemStats {
    SystemStats {
        free_heap_kb: unsafe { esp_idf_svc::sys::esp_get_free_heap_size() } / 1024,
        min_free_heap_kb: unsafe { esp_idf_svc::sys::esp_get_minimum_free_heap_size() } / 1024,
        uptime_secs: started.elapsed().as_secs(),
    }
}

fn create_mqtt_client(
    network: &NetworkConfig,
) -> anyhow::Result<(EspMqttClient<'static>, EspMqttConnection)> {
    let conf = MqttClientConfiguration {
        client_id: Some(network.mqtt_client_id.as_str()),
        username: if network.mqtt_user.is_empty() {
            None
        } else {
            Some(network.mqtt_user.as_str())
        },
        password: if network.mqtt_pass.is_empty() {
            None
        } else {
            Some(network.mqtt_pass.as_str())
        },
        // TLS brokers are verified against the platform certificate bundle.
        crt_bundle_attach: if network.mqtt_url.starts_with("mqtts://") {
            Some(esp_idf_svc::sys::esp_crt_bundle_attach)
        } else {
            None
        },
        keep_alive_interval: Some(Duration::from_secs(60)),
        ..Default::default()
    };

    Ok(EspMqttClient::new(&network.mqtt_url, &conf)?)
}

fn spawn_mqtt_poll_thread(mut conn: EspMqttConnection) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("mqtt-poll".to_string())
        .stack_size(8192)
        .spawn(move || loop {
            match conn.next() {
                Ok(event) => match event.payload() {
                    EventPayload::Connected(_) => info!("mqtt connected"),
                    EventPayload::Disconnected => {
                        warn!("mqtt disconnected; restarting");
                        thread::sleep(Duration::from_millis(100));
                        unsafe { esp_idf_svc::sys::esp_restart() };
                    }
                    EventPayload::Error(err) => {
                        warn!("mqtt error: {err:?}; restarting");
                        thread::sleep(Duration::from_millis(100));
                        unsafe { esp_idf_svc::sys::esp_restart() };
                    }
                    _ => {}
                },
                Err(err) => {
                    warn!("mqtt poll error: {err:?}");
                    thread::sleep(Duration::from_secs(2));
                }
            }
        })
        .context("failed to spawn mqtt thread")?;
    Ok(())
}

/// Wire both buttons: any-edge interrupts feed a FreeRTOS queue, a worker
/// drains it through the debounce engine and acts on the events.
fn start_buttons(
    button0: AnyIOPin,
    button1: AnyIOPin,
    config: ButtonConfig,
    display: Arc<Mutex<DisplayService>>,
) -> anyhow::Result<()> {
    let line0 = LineId(BUTTON0_PIN);
    let line1 = LineId(BUTTON1_PIN);

    let mut pin0 = configure_button_pin(button0)?;
    let mut pin1 = configure_button_pin(button1)?;

    let queue: Arc<Queue<i32>> = Arc::new(Queue::new(EDGE_QUEUE_CAPACITY));

    // The ISR's only action is the non-blocking enqueue; a full queue drops
    // the edge.
    let isr_queue = queue.clone();
    unsafe {
        pin0.subscribe(move || {
            let _ = isr_queue.send_back(BUTTON0_PIN, delay::NON_BLOCK);
        })?;
    }
    let isr_queue = queue.clone();
    unsafe {
        pin1.subscribe(move || {
            let _ = isr_queue.send_back(BUTTON1_PIN, delay::NON_BLOCK);
        })?;
    }

    pin0.enable_interrupt()?;
    pin1.enable_interrupt()?;

    let mut engine = ButtonEngine::new(config, &[line0, line1]);
    let debounce_ms = config.debounce_ms as u32;

    thread::Builder::new()
        .name("button-task".to_string())
        .stack_size(4096)
        .spawn(move || {
            let epoch = Instant::now();
            loop {
                let Some((gpio, _)) = queue.recv_front(delay::BLOCK) else {
                    continue;
                };

                // Debounce delay; further edges keep queueing from the ISR.
                FreeRtos::delay_ms(debounce_ms);

                let (line, pin_high) = if gpio == BUTTON0_PIN {
                    (line0, pin0.is_high())
                } else {
                    (line1, pin1.is_high())
                };
                let level = if pin_high { Level::High } else { Level::Low };

                let now_ms = epoch.elapsed().as_millis() as u64;
                let held_ms = engine.press_duration_ms(line, now_ms);

                for event in engine.settle(line, level, now_ms) {
                    match event {
                        ButtonEvent::Pressed => info!("Button GPIO {gpio} pressed"),
                        ButtonEvent::Released => info!(
                            "Button GPIO {gpio} released (held for {} ms)",
                            held_ms.unwrap_or(0)
                        ),
                        ButtonEvent::LongPress => {
                            info!("Button GPIO {gpio} long press detected")
                        }
                    }
                    handle_button_event(line, event, line0, &display);
                }

                // Interrupts auto-disable once fired; re-arm for the next edge.
                let _ = pin0.enable_interrupt();
                let _ = pin1.enable_interrupt();
            }
        })
        .context("failed to spawn button task")?;

    info!(
        "Button manager initialized (GPIO {} and {})",
        BUTTON0_PIN, BUTTON1_PIN
    );
    Ok(())
}

fn configure_button_pin(
    pin: AnyIOPin,
) -> anyhow::Result<PinDriver<'static, AnyIOPin, Input>> {
    let mut driver = PinDriver::input(pin)?;
    // Pull-down wiring, active-high.
    driver.set_pull(Pull::Down)?;
    driver.set_interrupt_type(InterruptType::AnyEdge)?;
    Ok(driver)
}

fn handle_button_event(
    line: LineId,
    event: ButtonEvent,
    line0: LineId,
    display: &Arc<Mutex<DisplayService>>,
) {
    match event {
        ButtonEvent::Pressed => {
            let mut display = display.lock().unwrap();
            let current = if line == line0 {
                display.model_mut().prev_screen()
            } else {
                display.model_mut().next_screen()
            };
            info!("switched to {current:?}");
            display.redraw();
        }
        ButtonEvent::Released => {}
        ButtonEvent::LongPress => {
            if line == line0 {
                info!("Button 0 long press: clear display");
                display.lock().unwrap().clear();
                thread::sleep(Duration::from_secs(1));
            } else {
                warn!("Button 1 long press: restarting in 2 seconds...");
                display.lock().unwrap().clear();
                thread::sleep(Duration::from_secs(2));
                unsafe { esp_idf_svc::sys::esp_restart() };
            }
        }
    }
}
