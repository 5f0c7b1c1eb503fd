// Recording sink - keeps the delivered command trace in memory
//
// Clones share the same trace, so a test can keep one handle while the
// translator owns another.

use crate::sink::{CommandSink, SinkError, SinkResult};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Recording {
    commands: Vec<String>,
    batches: usize,
    /// Batch number (1-based, counted from now) that will be refused
    fail_in: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Drain the delivered command trace
    pub fn take_commands(&self) -> Vec<String> {
        std::mem::take(&mut self.recording().commands)
    }

    /// Copy of the delivered command trace
    pub fn commands(&self) -> Vec<String> {
        self.recording().commands.clone()
    }

    /// Number of batches accepted so far
    pub fn batch_count(&self) -> usize {
        self.recording().batches
    }

    /// Refuse the `n`-th batch sent from now on (1 = the next one)
    pub fn fail_on(&self, n: usize) {
        self.recording().fail_in = Some(n.max(1));
    }
}

impl CommandSink for RecordingSink {
    fn send(&mut self, commands: &[String]) -> SinkResult<()> {
        let mut recording = self.recording();

        if let Some(remaining) = recording.fail_in {
            if remaining <= 1 {
                recording.fail_in = None;
                return Err(SinkError::Rejected(format!(
                    "injected failure on batch of {} commands",
                    commands.len()
                )));
            }
            recording.fail_in = Some(remaining - 1);
        }

        recording.commands.extend_from_slice(commands);
        recording.batches += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_take_commands_drains_trace() {
        let spy = RecordingSink::new();
        let mut sink = spy.clone();

        sink.send(&batch(&["config 0", "input 0 mute on"])).unwrap();
        sink.send(&batch(&["mute off"])).unwrap();

        assert_eq!(spy.batch_count(), 2);
        assert_eq!(spy.take_commands(), batch(&["config 0", "input 0 mute on", "mute off"]));
        assert!(spy.take_commands().is_empty());
    }

    #[test]
    fn test_injected_failure_delivers_nothing() {
        let spy = RecordingSink::new();
        let mut sink = spy.clone();
        spy.fail_on(2);

        sink.send(&batch(&["config 1"])).unwrap();
        let result = sink.send(&batch(&["config 2", "input 0 gain -- 1.00"]));
        sink.send(&batch(&["config 3"])).unwrap();

        assert!(matches!(result, Err(SinkError::Rejected(_))));
        assert_eq!(spy.commands(), batch(&["config 1", "config 3"]));
        assert_eq!(spy.batch_count(), 2);
    }
}
