use serde::{Deserialize, Serialize};

use crate::{adc::AdcConfig, button::ButtonConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,
    /// Broker URL, `mqtt://` or `mqtts://`.
    pub mqtt_url: String,
    pub mqtt_user: String,
    pub mqtt_pass: String,
    pub mqtt_client_id: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_pass: String::new(),
            mqtt_url: "mqtt://192.168.1.100:1883".to_string(),
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
            mqtt_client_id: "thermometer".to_string(),
        }
    }
}

/// GPIO assignments matching the board layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PinConfig {
    pub onewire_bus: i32,
    pub dht22: i32,
    pub adc: i32,
    pub button0: i32,
    pub button1: i32,
    pub i2c_sda: i32,
    pub i2c_scl: i32,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            onewire_bus: 4,
            dht22: 16,
            adc: 0,
            button0: 1,
            button1: 2,
            i2c_sda: 8,
            i2c_scl: 9,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Device id used in message payloads for sensors without their own
    /// hardware address.
    pub device_id: String,
    pub network: NetworkConfig,
    pub pins: PinConfig,
    pub adc: AdcConfig,
    pub buttons: ButtonConfig,
    /// Delay between sampling rounds.
    pub sample_interval_ms: u64,
    /// One-time settle delay before the first sampling round.
    pub startup_settle_ms: u64,
    /// Minimum spacing between DHT22 reads.
    pub dht_min_interval_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device_id: "T01".to_string(),
            network: NetworkConfig::default(),
            pins: PinConfig::default(),
            adc: AdcConfig::default(),
            buttons: ButtonConfig::default(),
            sample_interval_ms: 10_000,
            startup_settle_ms: 3_000,
            dht_min_interval_ms: 2_000,
        }
    }
}
