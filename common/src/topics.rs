pub const TOPIC_SENSOR_TEMPERATURE: &str = "test/sensors/temperature";
pub const TOPIC_SENSOR_VOLTAGE: &str = "test/sensors/voltage";
