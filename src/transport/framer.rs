use std::collections::VecDeque;

use bytes::{Buf, BufMut, BytesMut};

use crate::{ClientResult, Error};

/// Head/tail framing over a byte stream.
///
/// Inbound bytes accumulate up to `capacity` (oldest bytes are discarded
/// beyond that) and every complete `head .. tail` payload moves into a FIFO
/// of extracted frames. Partial frames survive across `feed` calls, so the
/// stream may be delivered in arbitrary chunks. Locking is the caller's
/// responsibility.
#[derive(Debug)]
pub struct FrameBuffer {
    head: Vec<u8>,
    tail: Vec<u8>,
    capacity: usize,
    acc: BytesMut,
    frames: VecDeque<Vec<u8>>,
}

impl FrameBuffer {
    pub fn new(head: &[u8], tail: &[u8], capacity: usize) -> Self {
        debug_assert!(!head.is_empty() && !tail.is_empty());
        Self {
            head: head.to_vec(),
            tail: tail.to_vec(),
            capacity,
            acc: BytesMut::with_capacity(capacity),
            frames: VecDeque::new(),
        }
    }

    /// Appends raw bytes and extracts every frame they complete.
    pub fn feed(&mut self, data: &[u8]) {
        self.acc.put_slice(data);
        if self.acc.len() > self.capacity {
            let excess = self.acc.len() - self.capacity;
            self.acc.advance(excess);
        }
        self.extract();
    }

    /// True iff at least one extracted frame is queued.
    pub fn readable(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Removes and returns the oldest extracted frame.
    pub fn read(&mut self) -> ClientResult<Vec<u8>> {
        self.frames.pop_front().ok_or(Error::Empty)
    }

    /// Wire form of one outbound payload: `head .. payload .. tail`.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.head.len() + payload.len() + self.tail.len());
        wire.extend_from_slice(&self.head);
        wire.extend_from_slice(payload);
        wire.extend_from_slice(&self.tail);
        wire
    }

    fn extract(&mut self) {
        loop {
            let Some(head_at) = find(&self.acc, &self.head) else {
                // Nothing before a full head can open a frame; keep only a
                // trailing fragment that may still grow into one.
                let keep = partial_suffix(&self.acc, &self.head);
                let drop = self.acc.len() - keep;
                self.acc.advance(drop);
                return;
            };
            // Bytes ahead of the earliest head cannot belong to any frame.
            self.acc.advance(head_at);
            let body_at = self.head.len();
            let Some(tail_at) = find(&self.acc[body_at..], &self.tail) else {
                return;
            };
            self.frames
                .push_back(self.acc[body_at..body_at + tail_at].to_vec());
            self.acc.advance(body_at + tail_at + self.tail.len());
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length of the longest strict suffix of `acc` that is a prefix of `pat`.
fn partial_suffix(acc: &[u8], pat: &[u8]) -> usize {
    let longest = acc.len().min(pat.len() - 1);
    (1..=longest)
        .rev()
        .find(|&k| acc[acc.len() - k..] == pat[..k])
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framer(capacity: usize) -> FrameBuffer {
        FrameBuffer::new(b"H", b"T", capacity)
    }

    #[test]
    fn extracts_frames_in_arrival_order() {
        let mut buf = framer(64);
        buf.feed(b"xxHabcTyyHdefT");
        assert_eq!(b"abc".to_vec(), buf.read().unwrap());
        assert_eq!(b"def".to_vec(), buf.read().unwrap());
        assert!(!buf.readable());
    }

    #[test]
    fn frame_split_across_feeds() {
        let mut buf = framer(64);
        buf.feed(b"Hab");
        assert!(!buf.readable());
        buf.feed(b"c");
        assert!(!buf.readable());
        buf.feed(b"Tgarb");
        assert_eq!(b"abc".to_vec(), buf.read().unwrap());
        assert!(!buf.readable());
    }

    #[test]
    fn empty_payload_is_a_valid_frame() {
        let mut buf = framer(64);
        buf.feed(b"HT");
        assert_eq!(Vec::<u8>::new(), buf.read().unwrap());
    }

    #[test]
    fn overflow_discards_oldest_bytes_only() {
        let mut buf = framer(8);
        buf.feed(b"AAAAAAAAHabcT");
        assert_eq!(b"abc".to_vec(), buf.read().unwrap());
        assert!(!buf.readable());
    }

    #[test]
    fn frame_straddling_discard_boundary_is_never_emitted() {
        let mut buf = framer(8);
        // Nine bytes: the head is trimmed away, so no frame may surface.
        buf.feed(b"HabcdefgT");
        assert!(!buf.readable());
        assert!(matches!(buf.read(), Err(Error::Empty)));
        // The stream recovers on the next complete frame.
        buf.feed(b"HxyT");
        assert_eq!(b"xy".to_vec(), buf.read().unwrap());
    }

    #[test]
    fn multibyte_markers_split_mid_marker() {
        let mut buf = FrameBuffer::new(b"MSG_HEADER", b"MSG_TAIL", 256);
        buf.feed(b"noiseMSG_HE");
        assert!(!buf.readable());
        buf.feed(b"ADER{\"result\":0}MSG_T");
        assert!(!buf.readable());
        buf.feed(b"AILmore");
        assert_eq!(b"{\"result\":0}".to_vec(), buf.read().unwrap());
        assert!(!buf.readable());
    }

    #[test]
    fn chunking_never_changes_the_extracted_frames() {
        let stream = b"..MSG_HEADERoneMSG_TAIL..MSG_HEADERMSG_TAILMSG_HEADERtwoMSG_TAIL";
        for chunk in 1..=stream.len() {
            let mut buf = FrameBuffer::new(b"MSG_HEADER", b"MSG_TAIL", 1024);
            for piece in stream.chunks(chunk) {
                buf.feed(piece);
            }
            assert_eq!(b"one".to_vec(), buf.read().unwrap(), "chunk size {chunk}");
            assert_eq!(Vec::<u8>::new(), buf.read().unwrap(), "chunk size {chunk}");
            assert_eq!(b"two".to_vec(), buf.read().unwrap(), "chunk size {chunk}");
            assert!(!buf.readable(), "chunk size {chunk}");
        }
    }

    #[test]
    fn head_inside_payload_takes_earliest_tail() {
        let mut buf = framer(64);
        buf.feed(b"HaHbTtrailT");
        // Earliest head wins, earliest tail after it closes the frame.
        assert_eq!(b"aHb".to_vec(), buf.read().unwrap());
        // "trailT" has no head before it, so it is consumed.
        assert!(!buf.readable());
    }

    #[test]
    fn encode_brackets_payload_with_markers() {
        let buf = framer(64);
        assert_eq!(b"HabcT".to_vec(), buf.encode(b"abc"));
        assert_eq!(b"HT".to_vec(), buf.encode(b""));
    }

    #[test]
    fn read_on_empty_queue_fails() {
        let mut buf = framer(64);
        assert!(matches!(buf.read(), Err(Error::Empty)));
    }
}
