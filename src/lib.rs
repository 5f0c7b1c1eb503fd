// MiniDSP legacy control - Library exports for the service, tests and benchmarks

pub mod api;
pub mod catalogue;
pub mod command;
pub mod config;
pub mod device;
pub mod sink;

// Re-export commonly used types for convenience
pub use api::{ApiRequest, ApiResponse, LegacyApi, Method};
pub use catalogue::{FilterBand, InMemoryCatalogue, PresetCatalogue, PresetEntry, SearchFilters};
pub use command::{
    ChannelSelector, DeviceCommand, ErrorKind, LegacyRequest, LegacyTranslator, Outcome,
    TranslatorError,
};
pub use config::AppConfig;
pub use device::{DeviceModel, DeviceSnapshot};
pub use sink::{CommandSink, DeviceWriter, RecordingSink, RingbufSink, create_command_channel};
