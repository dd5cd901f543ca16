use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, warn};

use crate::config::PortConfig;
use crate::transport::framer::FrameBuffer;
use crate::transport::tty::TtyPort;
use crate::transport::{Channel, SerialIo};
use crate::{ClientResult, Error};

/// State the listener thread shares with callers of `readable`/`read`/`send`.
struct Shared {
    state: Mutex<LinkState>,
    frames: Condvar,
}

struct LinkState {
    framer: FrameBuffer,
    listener_failure: Option<String>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Framed connection to one MCU.
///
/// A background listener is the sole reader of the device: it drains inbound
/// bytes, feeds the frame buffer and wakes anyone parked in [`Channel::readable`].
/// All shared state sits behind one mutex, so `send`, `readable` and `read`
/// may be called from any thread. Dropping the connection stops the listener,
/// joins it and closes the device.
pub struct Connection<T: SerialIo + 'static> {
    io: Arc<T>,
    shared: Arc<Shared>,
    listening: Arc<AtomicBool>,
    listener: Option<JoinHandle<()>>,
    readable_timeout: Duration,
}

impl Connection<TtyPort> {
    /// Opens and configures the device, then starts listening on it.
    pub fn open(cfg: &PortConfig) -> ClientResult<Self> {
        let port = TtyPort::open(&cfg.path, cfg.baud)?;
        Self::start(port, cfg)
    }
}

impl<T: SerialIo + 'static> Connection<T> {
    /// Starts the listener over an already-open device.
    pub fn start(io: T, cfg: &PortConfig) -> ClientResult<Self> {
        let io = Arc::new(io);
        let shared = Arc::new(Shared {
            state: Mutex::new(LinkState {
                framer: FrameBuffer::new(&cfg.head, &cfg.tail, cfg.capacity),
                listener_failure: None,
            }),
            frames: Condvar::new(),
        });
        let listening = Arc::new(AtomicBool::new(true));

        let listener = thread::Builder::new().name("mculink-listener".into()).spawn({
            let io = Arc::clone(&io);
            let shared = Arc::clone(&shared);
            let listening = Arc::clone(&listening);
            move || listen(io.as_ref(), &shared, &listening)
        })?;

        Ok(Self {
            io,
            shared,
            listening,
            listener: Some(listener),
            readable_timeout: cfg.readable_timeout,
        })
    }
}

fn listen<T: SerialIo>(io: &T, shared: &Shared, listening: &AtomicBool) {
    while listening.load(Ordering::Acquire) {
        let data = match io.read_available() {
            Ok(data) => data,
            Err(err) => {
                // Fatal: leave a cause behind for callers and stop reading.
                error!("serial listener aborting: {err}");
                shared.lock().listener_failure = Some(err.to_string());
                shared.frames.notify_all();
                return;
            }
        };
        if data.is_empty() {
            continue;
        }
        let mut state = shared.lock();
        state.framer.feed(&data);
        if state.framer.readable() {
            shared.frames.notify_one();
        }
    }
}

impl<T: SerialIo + 'static> Channel for Connection<T> {
    fn send(&self, payload: &[u8]) -> ClientResult<()> {
        // The lock serializes writers and is held for the whole write.
        let state = self.shared.lock();
        let wire = state.framer.encode(payload);
        self.io.write_all(&wire)
    }

    fn readable(&self) -> ClientResult<bool> {
        let state = self.shared.lock();
        if let Some(cause) = &state.listener_failure {
            return Err(Error::ListenerDead(cause.clone()));
        }
        if state.framer.readable() {
            return Ok(true);
        }
        // One bounded wait, then report whatever the queue holds. Callers
        // needing a longer horizon poll.
        let (state, _) = self
            .shared
            .frames
            .wait_timeout(state, self.readable_timeout)
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(cause) = &state.listener_failure {
            return Err(Error::ListenerDead(cause.clone()));
        }
        Ok(state.framer.readable())
    }

    fn read(&self) -> ClientResult<Vec<u8>> {
        let mut state = self.shared.lock();
        if let Some(cause) = &state.listener_failure {
            return Err(Error::ListenerDead(cause.clone()));
        }
        state.framer.read()
    }
}

impl<T: SerialIo + 'static> Drop for Connection<T> {
    fn drop(&mut self) {
        self.listening.store(false, Ordering::Release);
        if let Some(listener) = self.listener.take() {
            if listener.join().is_err() {
                warn!("serial listener panicked during shutdown");
            }
        }
        // The device closes once the listener's Arc clone is gone.
    }
}
