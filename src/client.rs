// Synchronous request/reply front end over one framed connection.

use crate::transport::Channel;
use crate::{ClientResult, Error};

/// One-at-a-time RPC surface of a connection.
///
/// The client borrows the channel and never interprets payloads; callers are
/// expected to serialize their `run` calls, since the transport carries no
/// request/reply correlation of its own.
pub struct McuClient<'a> {
    chan: &'a dyn Channel,
}

impl std::fmt::Debug for McuClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McuClient").finish_non_exhaustive()
    }
}

impl<'a> McuClient<'a> {
    pub fn new(chan: &'a dyn Channel) -> Self {
        Self { chan }
    }

    /// Sends one framed request and returns the next inbound frame.
    pub fn run(&self, request: &[u8]) -> ClientResult<Vec<u8>> {
        self.chan.send(request)?;
        loop {
            if !self.chan.readable()? {
                return Err(Error::Timeout);
            }
            match self.chan.read() {
                Ok(frame) => return Ok(frame),
                // Raced another reader off the queue; wait for the next frame.
                Err(Error::Empty) => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    struct StubChannel {
        sent: RefCell<Vec<Vec<u8>>>,
        replies: RefCell<VecDeque<Vec<u8>>>,
    }

    impl StubChannel {
        fn new(replies: &[&[u8]]) -> Self {
            Self {
                sent: RefCell::new(Vec::new()),
                replies: RefCell::new(replies.iter().map(|frame| frame.to_vec()).collect()),
            }
        }
    }

    impl Channel for StubChannel {
        fn send(&self, payload: &[u8]) -> ClientResult<()> {
            self.sent.borrow_mut().push(payload.to_vec());
            Ok(())
        }

        fn readable(&self) -> ClientResult<bool> {
            Ok(!self.replies.borrow().is_empty())
        }

        fn read(&self) -> ClientResult<Vec<u8>> {
            self.replies.borrow_mut().pop_front().ok_or(Error::Empty)
        }
    }

    #[test]
    fn run_consumes_exactly_one_frame_per_request() {
        let chan = StubChannel::new(&[b"first", b"second"]);
        let client = McuClient::new(&chan);
        assert_eq!(b"first".to_vec(), client.run(b"req-a").unwrap());
        assert_eq!(b"second".to_vec(), client.run(b"req-b").unwrap());
        assert_eq!(2, chan.sent.borrow().len());
    }

    #[test]
    fn run_surfaces_timeout_when_no_reply_arrives() {
        let chan = StubChannel::new(&[]);
        let client = McuClient::new(&chan);
        assert!(matches!(client.run(b"req"), Err(Error::Timeout)));
    }
}
