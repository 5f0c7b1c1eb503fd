// Lock-free command channel to the device writer thread

use crate::sink::{CommandSink, SinkError, SinkResult};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub type CommandProducer = ringbuf::HeapProd<String>;
pub type CommandConsumer = ringbuf::HeapCons<String>;

pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    let rb = HeapRb::<String>::new(capacity);
    rb.split()
}

/// How long a batch may wait for the writer to make room
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Sleep between room checks while a batch waits
const ROOM_POLL: Duration = Duration::from_millis(1);

/// Sink pushing command lines into the ring buffer
///
/// A batch is only accepted when the buffer has room for all of it, so the
/// writer thread never sees a partial batch. When the buffer is busy the
/// batch waits up to the send timeout for the writer to drain it.
pub struct RingbufSink {
    producer: CommandProducer,
    send_timeout: Duration,
}

impl RingbufSink {
    pub fn new(producer: CommandProducer) -> Self {
        Self::with_timeout(producer, DEFAULT_SEND_TIMEOUT)
    }

    pub fn with_timeout(producer: CommandProducer, send_timeout: Duration) -> Self {
        Self {
            producer,
            send_timeout,
        }
    }

    /// Free slots once `needed` fit or the timeout expires, whichever is first
    fn wait_for_room(&self, needed: usize) -> usize {
        let deadline = Instant::now() + self.send_timeout;
        loop {
            let available = self.producer.vacant_len();
            if available >= needed || Instant::now() >= deadline {
                return available;
            }
            thread::sleep(ROOM_POLL);
        }
    }
}

impl CommandSink for RingbufSink {
    fn send(&mut self, commands: &[String]) -> SinkResult<()> {
        let needed = commands.len();
        // A batch bigger than the whole buffer can never fit
        let available = if needed > self.producer.capacity().get() {
            self.producer.vacant_len()
        } else {
            self.wait_for_room(needed)
        };
        if available < needed {
            log::warn!(
                "Command buffer still full after {:?}: {} needed, {} free",
                self.send_timeout,
                needed,
                available
            );
            return Err(SinkError::BufferFull { needed, available });
        }

        for command in commands {
            // Room was checked above and this is the only producer
            self.producer
                .try_push(command.clone())
                .map_err(|_| SinkError::Rejected("ring buffer refused command".into()))?;
        }

        Ok(())
    }
}

/// Background thread draining the command channel into a transport
///
/// The transport callback receives each line in order. Stopping the writer
/// drains whatever is still buffered before the thread exits.
pub struct DeviceWriter {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<usize>>,
}

impl DeviceWriter {
    pub fn spawn<F>(
        mut consumer: CommandConsumer,
        poll_interval: Duration,
        mut transport: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut(&str) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::Builder::new()
            .name("device-writer".into())
            .spawn(move || {
                let mut delivered = 0;
                loop {
                    let stopping = !flag.load(Ordering::Acquire);
                    while let Some(line) = consumer.try_pop() {
                        transport(&line);
                        delivered += 1;
                    }
                    if stopping {
                        break;
                    }
                    thread::sleep(poll_interval);
                }
                delivered
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the thread and return how many lines it delivered
    pub fn stop(mut self) -> usize {
        self.shutdown()
    }

    fn shutdown(&mut self) -> usize {
        self.running.store(false, Ordering::Release);
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(delivered)) => delivered,
            Some(Err(_)) => {
                log::error!("Device writer thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for DeviceWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
