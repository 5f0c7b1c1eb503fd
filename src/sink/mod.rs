// Command sinks - delivery of serialized command batches to the unit
//
// A sink receives one whole batch per legacy request. Sinks are
// all-or-nothing: either every line of the batch is accepted, in order, or
// the batch is rejected and nothing is delivered.

pub mod channel;
pub mod recording;

pub use channel::{
    CommandConsumer, CommandProducer, DeviceWriter, RingbufSink, create_command_channel,
};
pub use recording::RecordingSink;

use thiserror::Error;

/// Errors reported by a command sink
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("Command buffer full: batch of {needed} needs room, {available} free")]
    BufferFull { needed: usize, available: usize },

    #[error("Batch rejected: {0}")]
    Rejected(String),

    #[error("Device transport disconnected")]
    Disconnected,
}

pub type SinkResult<T> = Result<T, SinkError>;

/// Transport for ordered low-level command lines
pub trait CommandSink: Send {
    /// Deliver a batch, preserving order, all or nothing
    fn send(&mut self, commands: &[String]) -> SinkResult<()>;
}
