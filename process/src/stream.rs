// Duplex event streams for stdin / stdout / stderr.
//
// A `DuplexStream` is a loopback: bytes written to it come back out of its
// readable side, either pushed to `Data` listeners or buffered until someone
// reads them. Filesystem code drives stdio through this contract without
// caring whether a console is attached.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use spin::Mutex;

// ---------------------------------------------------------------------------
// Errors and events
// ---------------------------------------------------------------------------

/// Stream-level error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The stream was created without a readable side.
    NotReadable,
    /// The stream was created without a writable side.
    NotWritable,
    /// `end()` was called; no more data will flow.
    Ended,
    /// A collaborator reported a failure.
    Failed(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::NotReadable => write!(f, "stream is not readable"),
            StreamError::NotWritable => write!(f, "stream is not writable"),
            StreamError::Ended => write!(f, "stream has ended"),
            StreamError::Failed(msg) => write!(f, "stream failed: {}", msg),
        }
    }
}

/// Event kinds a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Data,
    End,
    Error,
}

/// An event delivered to stream listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A chunk of data flowed through the stream.
    Data(Vec<u8>),
    /// The stream ended.
    End,
    /// The stream reported an error.
    Error(StreamError),
}

impl StreamEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StreamEvent::Data(_) => EventKind::Data,
            StreamEvent::End => EventKind::End,
            StreamEvent::Error(_) => EventKind::Error,
        }
    }
}

/// Event listener.
pub type EventListener = Arc<dyn Fn(&StreamEvent) + Send + Sync>;

// ---------------------------------------------------------------------------
// DuplexStream
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Listeners {
    data: Vec<EventListener>,
    end: Vec<EventListener>,
    error: Vec<EventListener>,
}

impl Listeners {
    fn of(&self, kind: EventKind) -> &Vec<EventListener> {
        match kind {
            EventKind::Data => &self.data,
            EventKind::End => &self.end,
            EventKind::Error => &self.error,
        }
    }

    fn of_mut(&mut self, kind: EventKind) -> &mut Vec<EventListener> {
        match kind {
            EventKind::Data => &mut self.data,
            EventKind::End => &mut self.end,
            EventKind::Error => &mut self.error,
        }
    }
}

#[derive(Default)]
struct StreamState {
    buffer: VecDeque<u8>,
    ended: bool,
}

/// A readable and/or writable event stream.
///
/// Locks are never held while listeners run, so a listener may write to or
/// subscribe on the stream that invoked it.
pub struct DuplexStream {
    readable: bool,
    writable: bool,
    state: Mutex<StreamState>,
    listeners: Mutex<Listeners>,
}

impl DuplexStream {
    /// Create a stream with the requested capabilities.
    pub fn new(readable: bool, writable: bool) -> Self {
        Self {
            readable,
            writable,
            state: Mutex::new(StreamState::default()),
            listeners: Mutex::new(Listeners::default()),
        }
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_ended(&self) -> bool {
        self.state.lock().ended
    }

    /// Bytes waiting for a reader.
    pub fn buffered_len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.lock().of(kind).len()
    }

    /// Subscribe to `kind` events.
    ///
    /// The first `Data` listener switches the stream into flowing mode: any
    /// buffered bytes are delivered to it immediately as one chunk.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&StreamEvent) + Send + Sync + 'static,
    {
        let first_data = {
            let mut listeners = self.listeners.lock();
            let slot = listeners.of_mut(kind);
            slot.push(Arc::new(listener));
            kind == EventKind::Data && slot.len() == 1
        };
        if !first_data {
            return;
        }
        let pending: Vec<u8> = self.state.lock().buffer.drain(..).collect();
        if !pending.is_empty() {
            self.emit(StreamEvent::Data(pending));
        }
    }

    /// Drop every listener for `kind`.
    pub fn remove_all_listeners(&self, kind: EventKind) {
        self.listeners.lock().of_mut(kind).clear();
    }

    /// Write `bytes` into the stream.
    ///
    /// On a stream without a readable side the bytes are accepted and
    /// discarded, since nothing could ever consume them.
    pub fn write(&self, bytes: &[u8]) -> Result<(), StreamError> {
        if !self.writable {
            return Err(StreamError::NotWritable);
        }
        {
            let mut state = self.state.lock();
            if state.ended {
                return Err(StreamError::Ended);
            }
            log::trace!("[KPIO Process] stream write: {} bytes", bytes.len());
            if bytes.is_empty() || !self.readable {
                return Ok(());
            }
            if self.listeners.lock().data.is_empty() {
                state.buffer.extend(bytes.iter().copied());
                return Ok(());
            }
        }
        self.emit(StreamEvent::Data(bytes.to_vec()));
        Ok(())
    }

    /// Write a UTF-8 string.
    pub fn write_str(&self, s: &str) -> Result<(), StreamError> {
        self.write(s.as_bytes())
    }

    /// Drain up to `max` buffered bytes.
    ///
    /// Returns an empty vec when nothing is buffered, and `Ended` once the
    /// stream has ended and the buffer is exhausted.
    pub fn read(&self, max: usize) -> Result<Vec<u8>, StreamError> {
        if !self.readable {
            return Err(StreamError::NotReadable);
        }
        let mut state = self.state.lock();
        if state.buffer.is_empty() && state.ended {
            return Err(StreamError::Ended);
        }
        let n = max.min(state.buffer.len());
        Ok(state.buffer.drain(..n).collect())
    }

    /// End the stream. `End` listeners fire once; later calls are no-ops.
    pub fn end(&self) {
        {
            let mut state = self.state.lock();
            if state.ended {
                return;
            }
            state.ended = true;
        }
        self.emit(StreamEvent::End);
    }

    /// Report `err` to `Error` listeners.
    pub fn fail(&self, err: StreamError) {
        log::warn!("[KPIO Process] stream error: {}", err);
        self.emit(StreamEvent::Error(err));
    }

    fn emit(&self, event: StreamEvent) {
        // Snapshot so listeners can re-enter the stream.
        let targets: Vec<EventListener> = self.listeners.lock().of(event.kind()).clone();
        for listener in &targets {
            listener(&event);
        }
    }
}

impl fmt::Debug for DuplexStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexStream")
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("buffered", &self.buffered_len())
            .field("ended", &self.is_ended())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Constructs stdio streams for a new process.
pub trait StreamFactory: Send + Sync {
    /// Create an independent stream with the requested capabilities.
    fn create(&self, readable: bool, writable: bool) -> Arc<DuplexStream>;
}

/// Factory producing in-memory loopback streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopbackStreamFactory;

impl StreamFactory for LoopbackStreamFactory {
    fn create(&self, readable: bool, writable: bool) -> Arc<DuplexStream> {
        Arc::new(DuplexStream::new(readable, writable))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn collector(stream: &DuplexStream) -> Arc<Mutex<Vec<u8>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        stream.on(EventKind::Data, move |event| {
            if let StreamEvent::Data(bytes) = event {
                sink.lock().extend_from_slice(bytes);
            }
        });
        seen
    }

    #[test]
    fn buffered_write_then_read() {
        let s = DuplexStream::new(true, true);
        s.write(b"hello").unwrap();
        assert_eq!(s.buffered_len(), 5);
        assert_eq!(s.read(3).unwrap(), b"hel".to_vec());
        assert_eq!(s.read(10).unwrap(), b"lo".to_vec());
        assert!(s.read(10).unwrap().is_empty());
    }

    #[test]
    fn data_listener_receives_writes() {
        let s = DuplexStream::new(true, true);
        let seen = collector(&s);
        s.write_str("abc").unwrap();
        s.write_str("def").unwrap();
        assert_eq!(*seen.lock(), b"abcdef".to_vec());
        assert_eq!(s.buffered_len(), 0);
    }

    #[test]
    fn first_data_listener_flushes_buffer() {
        let s = DuplexStream::new(true, true);
        s.write(b"queued").unwrap();
        let seen = collector(&s);
        assert_eq!(*seen.lock(), b"queued".to_vec());
        assert_eq!(s.buffered_len(), 0);
    }

    #[test]
    fn capability_checks() {
        let read_only = DuplexStream::new(true, false);
        assert_eq!(read_only.write(b"x"), Err(StreamError::NotWritable));

        let write_only = DuplexStream::new(false, true);
        assert_eq!(write_only.read(1), Err(StreamError::NotReadable));
    }

    #[test]
    fn write_only_stream_discards_data() {
        let s = DuplexStream::new(false, true);
        let seen = collector(&s);
        s.write(b"nowhere to go").unwrap();
        s.write(b"still nowhere").unwrap();
        assert_eq!(s.buffered_len(), 0);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn end_fires_once_and_blocks_writes() {
        static ENDS: AtomicUsize = AtomicUsize::new(0);
        let s = DuplexStream::new(true, true);
        s.on(EventKind::End, |_| {
            ENDS.fetch_add(1, Ordering::SeqCst);
        });
        s.write(b"tail").unwrap();
        s.end();
        s.end();
        assert!(s.is_ended());
        assert_eq!(ENDS.load(Ordering::SeqCst), 1);
        assert_eq!(s.write(b"more"), Err(StreamError::Ended));
        assert_eq!(s.read(10).unwrap(), b"tail".to_vec());
        assert_eq!(s.read(10), Err(StreamError::Ended));
    }

    #[test]
    fn error_listeners() {
        let s = DuplexStream::new(true, true);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        s.on(EventKind::Error, move |event| sink.lock().push(event.clone()));
        s.fail(StreamError::Failed(String::from("console detached")));
        assert_eq!(
            *seen.lock(),
            vec![StreamEvent::Error(StreamError::Failed(String::from(
                "console detached"
            )))]
        );
    }

    #[test]
    fn listener_may_reenter_stream() {
        let s = Arc::new(DuplexStream::new(true, true));
        let inner = s.clone();
        s.on(EventKind::End, move |_| {
            assert_eq!(inner.write(b"x"), Err(StreamError::Ended));
            assert_eq!(inner.listener_count(EventKind::End), 1);
        });
        s.end();
    }

    #[test]
    fn remove_listeners_returns_to_buffering() {
        let s = DuplexStream::new(true, true);
        let seen = collector(&s);
        s.remove_all_listeners(EventKind::Data);
        s.write(b"z").unwrap();
        assert!(seen.lock().is_empty());
        assert_eq!(s.buffered_len(), 1);
    }

    #[test]
    fn factory_creates_independent_streams() {
        let factory = LoopbackStreamFactory;
        let a = factory.create(true, true);
        let b = factory.create(true, true);
        assert!(!Arc::ptr_eq(&a, &b));
        a.write(b"only a").unwrap();
        assert_eq!(b.buffered_len(), 0);
    }
}
