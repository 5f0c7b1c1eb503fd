// Legacy command translation
//
// Architecture:
// - request: typed legacy requests and target selectors
// - protocol: closed set of low-level DeviceCommand variants
// - sequence: ordered command batches per legacy verb
// - translator: LegacyTranslator, the single writer of the DeviceModel
//
// A request is validated, expanded into a batch, delivered to the
// CommandSink as one unit, and only then mirrored onto the model.

pub mod protocol;
pub mod request;
pub mod sequence;
pub mod translator;

pub use protocol::DeviceCommand;
pub use request::{ChannelSelector, InputSelection, LegacyRequest, Target};
pub use translator::{LegacyTranslator, Outcome};

use crate::device::SlotIndex;
use crate::sink::SinkError;
use thiserror::Error;

/// Errors that can occur while handling a legacy request
#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("Invalid slot {0}, expected 1 to 4")]
    InvalidSlot(i64),

    #[error("Channel {channel} cannot be addressed on slot {slot}")]
    UnsupportedTarget { slot: i64, channel: ChannelSelector },

    #[error("Gain {value} dB outside {min} to {max} dB")]
    GainOutOfRange { value: f64, min: f64, max: f64 },

    #[error("Slot {0} cannot be activated")]
    SlotCannotActivate(SlotIndex),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Preset {id} has {count} bands, inputs hold at most {max}")]
    PresetTooLarge { id: String, count: usize, max: usize },

    #[error("Unknown preset: {0}")]
    PresetNotFound(String),

    #[error("Command sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Device state lock poisoned")]
    StatePoisoned,
}

/// Coarse classification used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request rejected before anything was sent
    Validation,
    /// Referenced preset does not exist
    NotFound,
    /// Delivery or internal failure
    Internal,
}

impl TranslatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslatorError::InvalidSlot(_)
            | TranslatorError::UnsupportedTarget { .. }
            | TranslatorError::GainOutOfRange { .. }
            | TranslatorError::SlotCannotActivate(_)
            | TranslatorError::MissingField(_)
            | TranslatorError::InvalidValue { .. }
            | TranslatorError::PresetTooLarge { .. } => ErrorKind::Validation,
            TranslatorError::PresetNotFound(_) => ErrorKind::NotFound,
            TranslatorError::Sink(_) | TranslatorError::StatePoisoned => ErrorKind::Internal,
        }
    }

    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::Internal
    }
}

pub type TranslatorResult<T> = Result<T, TranslatorError>;
