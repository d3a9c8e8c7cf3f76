pub mod adc;
pub mod button;
pub mod config;
pub mod message;
pub mod pipeline;
pub mod screen;
pub mod topics;

pub use adc::AdcConfig;
pub use button::{ButtonConfig, ButtonEngine, ButtonEvent, Level, LineId, Polarity};
pub use config::{NetworkConfig, NodeConfig, PinConfig};
pub use message::SensorMessage;
pub use pipeline::{ButtonPipeline, EdgeSender, PipelineError};
pub use screen::{NetworkStatus, Screen, ScreenModel, SystemStats};
pub use topics::*;
