//! Multi-screen display model for the 128x64 OLED.
//!
//! The model owns the screen cursor and the cached readings and renders
//! each screen to plain text lines; the platform backend only has to put
//! those lines on glass (or in a log, on the host).

/// Screens the buttons cycle through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Temperatures,
    Power,
    System,
    Network,
}

impl Screen {
    const ALL: [Screen; 4] = [
        Screen::Temperatures,
        Screen::Power,
        Screen::System,
        Screen::Network,
    ];

    fn index(self) -> usize {
        match self {
            Screen::Temperatures => 0,
            Screen::Power => 1,
            Screen::System => 2,
            Screen::Network => 3,
        }
    }
}

/// Heap and uptime figures shown on the system screen, sampled by the
/// platform backend at render time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStats {
    pub free_heap_kb: u32,
    pub min_free_heap_kb: u32,
    pub uptime_secs: u64,
}

/// WiFi association state shown on the network screen.
#[derive(Debug, Clone, Default)]
pub struct NetworkStatus {
    pub connected: bool,
    pub ssid: String,
    pub rssi_dbm: i8,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScreenModel {
    current: Screen,
    ds_temp_c: f32,
    dht_temp_c: f32,
    dht_humidity: f32,
    voltage_mv: u32,
}

impl Default for ScreenModel {
    fn default() -> Self {
        Self {
            current: Screen::Temperatures,
            ds_temp_c: 0.0,
            dht_temp_c: 0.0,
            dht_humidity: 0.0,
            voltage_mv: 0,
        }
    }
}

impl ScreenModel {
    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn set_screen(&mut self, screen: Screen) {
        self.current = screen;
    }

    pub fn next_screen(&mut self) -> Screen {
        self.current = Screen::ALL[(self.current.index() + 1) % Screen::ALL.len()];
        self.current
    }

    pub fn prev_screen(&mut self) -> Screen {
        let count = Screen::ALL.len();
        self.current = Screen::ALL[(self.current.index() + count - 1) % count];
        self.current
    }

    pub fn set_temperatures(&mut self, ds_temp_c: f32, dht_temp_c: f32, dht_humidity: f32) {
        self.ds_temp_c = ds_temp_c;
        self.dht_temp_c = dht_temp_c;
        self.dht_humidity = dht_humidity;
    }

    pub fn set_voltage_mv(&mut self, voltage_mv: u32) {
        self.voltage_mv = voltage_mv;
    }

    /// Render the current screen as text lines, top to bottom.
    pub fn render(&self, stats: &SystemStats, network: &NetworkStatus) -> Vec<String> {
        match self.current {
            Screen::Temperatures => vec![
                "== SENSORS ==".to_string(),
                format!("DS18B20: {:.1} *C", self.ds_temp_c),
                format!("T DHT22: {:.1} *C", self.dht_temp_c),
                format!("H DHT22: {:.1} %", self.dht_humidity),
            ],
            Screen::Power => vec![
                "== POWER ==".to_string(),
                format!("Voltage: {:.2} V", self.voltage_mv as f32 / 1000.0),
            ],
            Screen::System => vec![
                "== MEMORY ==".to_string(),
                format!("Heap: {} kB", stats.free_heap_kb),
                format!("Min: {} kB", stats.min_free_heap_kb),
                format!(
                    "Up: {}h {}m",
                    stats.uptime_secs / 3600,
                    (stats.uptime_secs % 3600) / 60
                ),
            ],
            Screen::Network => {
                if network.connected {
                    let mut lines = vec![
                        "== NETWORK ==".to_string(),
                        "WiFi: Connected".to_string(),
                        format!("SSID: {:.16}", network.ssid),
                        format!("RSSI: {} dBm", network.rssi_dbm),
                    ];
                    if let Some(ip) = &network.ip {
                        lines.push(format!("IP: {ip}"));
                    }
                    lines
                } else {
                    vec![
                        "== NETWORK ==".to_string(),
                        "WiFi: Disconnected".to_string(),
                        "Connecting...".to_string(),
                    ]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn next_screen_wraps_around() {
        let mut model = ScreenModel::default();
        assert_eq!(model.current(), Screen::Temperatures);

        assert_eq!(model.next_screen(), Screen::Power);
        assert_eq!(model.next_screen(), Screen::System);
        assert_eq!(model.next_screen(), Screen::Network);
        assert_eq!(model.next_screen(), Screen::Temperatures);
    }

    #[test]
    fn prev_screen_wraps_around() {
        let mut model = ScreenModel::default();
        assert_eq!(model.prev_screen(), Screen::Network);
        assert_eq!(model.prev_screen(), Screen::System);
    }

    #[test]
    fn temperatures_screen_lines() {
        let mut model = ScreenModel::default();
        model.set_temperatures(23.45, 21.0, 64.9);

        assert_eq!(
            model.render(&SystemStats::default(), &NetworkStatus::default()),
            vec![
                "== SENSORS ==",
                "DS18B20: 23.4 *C",
                "T DHT22: 21.0 *C",
                "H DHT22: 64.9 %",
            ]
        );
    }

    #[test]
    fn power_screen_converts_millivolts() {
        let mut model = ScreenModel::default();
        model.set_voltage_mv(3276);
        model.set_screen(Screen::Power);

        assert_eq!(
            model.render(&SystemStats::default(), &NetworkStatus::default()),
            vec!["== POWER ==", "Voltage: 3.28 V"]
        );
    }

    #[test]
    fn network_screen_truncates_long_ssid() {
        let mut model = ScreenModel::default();
        model.set_screen(Screen::Network);

        let network = NetworkStatus {
            connected: true,
            ssid: "a-very-long-network-name".to_string(),
            rssi_dbm: -61,
            ip: Some("192.168.1.50".to_string()),
        };
        let lines = model.render(&SystemStats::default(), &network);

        assert_eq!(lines[2], "SSID: a-very-long-netw");
        assert_eq!(lines[3], "RSSI: -61 dBm");
        assert_eq!(lines[4], "IP: 192.168.1.50");
    }

    #[test]
    fn network_screen_disconnected() {
        let mut model = ScreenModel::default();
        model.set_screen(Screen::Network);

        assert_eq!(
            model.render(&SystemStats::default(), &NetworkStatus::default()),
            vec!["== NETWORK ==", "WiFi: Disconnected", "Connecting..."]
        );
    }

    #[test]
    fn system_screen_formats_uptime() {
        let mut model = ScreenModel::default();
        model.set_screen(Screen::System);

        let stats = SystemStats {
            free_heap_kb: 182,
            min_free_heap_kb: 140,
            uptime_secs: 3_725,
        };
        assert_eq!(
            model.render(&stats, &NetworkStatus::default()),
            vec!["== MEMORY ==", "Heap: 182 kB", "Min: 140 kB", "Up: 1h 2m"]
        );
    }
}
