//! Incremental length-prefixed framing with a bounded head buffer.
//!
//! Every message on the wire is a varint-length-prefixed frame:
//!
//! ```text
//! +--------------------+--------------------+
//! | length (varint ≤5) |   payload          |
//! +--------------------+--------------------+
//! ```
//!
//! The hardest inbound frame (full chunk data) can be larger than the memory
//! we are willing to spend on it, so the assembler captures only a
//! fixed-capacity prefix of each payload — enough to parse the near-player
//! vertical slice — and counts the rest as it is drained from the wire.
//! Truncation is reported, not fatal; downstream decoders bail out when a
//! read runs past the retained head bytes.

/// Bytes of each payload retained for parsing.
pub const FRAME_HEAD_CAP: usize = 98_304;

/// Absolute cap on a declared frame length. Anything larger is a protocol
/// violation and aborts the connection.
pub const MAX_FRAME_LEN: u32 = 1_048_576;

/// Fatal framing violations. Either one invalidates the byte stream, so the
/// caller must drop the connection (not the process).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The varint length prefix ran past five bytes.
    #[error("frame length prefix exceeded 5 bytes")]
    BadLengthPrefix,

    /// The declared frame length exceeds [`MAX_FRAME_LEN`].
    #[error("declared frame length {0} exceeds cap {MAX_FRAME_LEN}")]
    FrameTooLarge(u32),
}

/// Result of one [`FrameAssembler::accept`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// How many input bytes were consumed.
    pub consumed: usize,
    /// Whether a complete frame is now available via
    /// [`FrameAssembler::current_frame`].
    pub frame_complete: bool,
}

/// A completed frame: the retained payload prefix plus bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Up to [`FRAME_HEAD_CAP`] bytes of the payload.
    pub head: &'a [u8],
    /// The full declared payload length.
    pub total_len: usize,
    /// True iff the payload did not fit in the head buffer.
    pub truncated: bool,
}

/// Splits an unbounded incoming byte stream into frames.
///
/// Feed bytes with [`accept`](Self::accept); when it reports a complete
/// frame, read it with [`current_frame`](Self::current_frame), then call
/// [`clear_frame`](Self::clear_frame) before feeding more bytes. The
/// assembler and the frame consumer are deliberately separate steps so a
/// dispatcher can borrow the head buffer without holding the assembler
/// mutably.
pub struct FrameAssembler {
    // Length-prefix accumulator.
    len_accum: u32,
    len_shift: u32,
    // Current frame, once the prefix is known.
    remaining: u32,
    total_len: u32,
    head: Box<[u8; FRAME_HEAD_CAP]>,
    head_len: usize,
    frame_ready: bool,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self {
            len_accum: 0,
            len_shift: 0,
            remaining: 0,
            total_len: 0,
            head: Box::new([0u8; FRAME_HEAD_CAP]),
            head_len: 0,
            frame_ready: false,
        }
    }

    /// Discard all in-flight state (session reset).
    pub fn reset(&mut self) {
        self.len_accum = 0;
        self.len_shift = 0;
        self.remaining = 0;
        self.total_len = 0;
        self.head_len = 0;
        self.frame_ready = false;
    }

    /// Consume a prefix of `input`, stopping as soon as a frame completes.
    ///
    /// Call again with the unconsumed tail after handling the frame.
    pub fn accept(&mut self, input: &[u8]) -> Result<Progress, FrameError> {
        debug_assert!(!self.frame_ready, "clear_frame() before feeding more bytes");

        let mut consumed = 0;

        while consumed < input.len() {
            if self.remaining == 0 && self.total_len == 0 {
                // Parsing the varint length prefix, one byte at a time —
                // the transport may deliver bytes arbitrarily slowly.
                if self.len_shift > 28 {
                    return Err(FrameError::BadLengthPrefix);
                }
                let b = input[consumed];
                consumed += 1;
                self.len_accum |= u32::from(b & 0x7F) << self.len_shift;
                self.len_shift += 7;
                if b & 0x80 != 0 {
                    continue;
                }
                if self.len_accum > MAX_FRAME_LEN {
                    return Err(FrameError::FrameTooLarge(self.len_accum));
                }
                self.total_len = self.len_accum;
                self.remaining = self.len_accum;
                self.len_accum = 0;
                self.len_shift = 0;
                self.head_len = 0;
                if self.remaining == 0 {
                    // Zero-length frame completes immediately (and is
                    // dropped downstream for lacking a packet id).
                    self.frame_ready = true;
                    return Ok(Progress {
                        consumed,
                        frame_complete: true,
                    });
                }
                continue;
            }

            // Streaming payload bytes.
            let take = (input.len() - consumed).min(self.remaining as usize);
            let chunk = &input[consumed..consumed + take];
            if self.head_len < FRAME_HEAD_CAP {
                let copy_n = take.min(FRAME_HEAD_CAP - self.head_len);
                self.head[self.head_len..self.head_len + copy_n]
                    .copy_from_slice(&chunk[..copy_n]);
                self.head_len += copy_n;
            }
            self.remaining -= take as u32;
            consumed += take;

            if self.remaining == 0 {
                self.frame_ready = true;
                return Ok(Progress {
                    consumed,
                    frame_complete: true,
                });
            }
        }

        Ok(Progress {
            consumed,
            frame_complete: false,
        })
    }

    /// The completed frame, if [`accept`](Self::accept) reported one.
    pub fn current_frame(&self) -> Option<FrameView<'_>> {
        if !self.frame_ready {
            return None;
        }
        Some(FrameView {
            head: &self.head[..self.head_len],
            total_len: self.total_len as usize,
            truncated: self.head_len < self.total_len as usize,
        })
    }

    /// Forget the completed frame and get ready for the next prefix.
    pub fn clear_frame(&mut self) {
        self.frame_ready = false;
        self.total_len = 0;
        self.head_len = 0;
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_varint;

    /// Prefix `payload` with its varint length.
    fn frame_bytes(payload: &[u8]) -> Vec<u8> {
        let mut prefix = [0u8; 5];
        let n = encode_varint(&mut prefix, payload.len() as i32).unwrap();
        let mut out = prefix[..n].to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_single_frame_roundtrip() {
        let mut asm = FrameAssembler::new();
        let wire = frame_bytes(b"hello");

        let p = asm.accept(&wire).unwrap();
        assert_eq!(p.consumed, wire.len());
        assert!(p.frame_complete);

        let frame = asm.current_frame().unwrap();
        assert_eq!(frame.head, b"hello");
        assert_eq!(frame.total_len, 5);
        assert!(!frame.truncated);
    }

    #[test]
    fn test_incomplete_until_all_bytes_arrive() {
        let mut asm = FrameAssembler::new();
        let wire = frame_bytes(b"abcdef");

        // Length prefix plus half the payload.
        let p = asm.accept(&wire[..4]).unwrap();
        assert!(!p.frame_complete);
        assert!(asm.current_frame().is_none());

        let p = asm.accept(&wire[4..]).unwrap();
        assert!(p.frame_complete);
        assert_eq!(asm.current_frame().unwrap().head, b"abcdef");
    }

    #[test]
    fn test_byte_at_a_time_delivery() {
        let mut asm = FrameAssembler::new();
        let wire = frame_bytes(b"slow");

        let mut completions = 0;
        for b in &wire {
            let p = asm.accept(std::slice::from_ref(b)).unwrap();
            if p.frame_complete {
                completions += 1;
                assert_eq!(asm.current_frame().unwrap().head, b"slow");
                asm.clear_frame();
            }
        }
        assert_eq!(completions, 1, "exactly one completion event");
    }

    #[test]
    fn test_two_frames_in_one_buffer() {
        let mut asm = FrameAssembler::new();
        let mut wire = frame_bytes(b"aaa");
        wire.extend_from_slice(&frame_bytes(b"bbbb"));

        let p = asm.accept(&wire).unwrap();
        assert!(p.frame_complete);
        assert_eq!(asm.current_frame().unwrap().head, b"aaa");
        asm.clear_frame();

        let p = asm.accept(&wire[p.consumed..]).unwrap();
        assert!(p.frame_complete);
        assert_eq!(asm.current_frame().unwrap().head, b"bbbb");
    }

    #[test]
    fn test_oversized_payload_is_truncated_not_fatal() {
        let mut asm = FrameAssembler::new();
        let total = FRAME_HEAD_CAP + 1000;
        let payload = vec![0x5Au8; total];
        let wire = frame_bytes(&payload);

        let p = asm.accept(&wire).unwrap();
        assert!(p.frame_complete);
        let frame = asm.current_frame().unwrap();
        assert_eq!(frame.head.len(), FRAME_HEAD_CAP);
        assert_eq!(frame.total_len, total);
        assert!(frame.truncated);
    }

    #[test]
    fn test_truncated_flag_false_at_exact_cap() {
        let mut asm = FrameAssembler::new();
        let payload = vec![1u8; FRAME_HEAD_CAP];
        let wire = frame_bytes(&payload);

        asm.accept(&wire).unwrap();
        let frame = asm.current_frame().unwrap();
        assert_eq!(frame.head.len(), FRAME_HEAD_CAP);
        assert!(!frame.truncated);
    }

    #[test]
    fn test_declared_length_over_cap_is_fatal() {
        let mut asm = FrameAssembler::new();
        let mut prefix = [0u8; 5];
        let n = encode_varint(&mut prefix, (MAX_FRAME_LEN + 1) as i32).unwrap();
        let err = asm.accept(&prefix[..n]).unwrap_err();
        assert_eq!(err, FrameError::FrameTooLarge(MAX_FRAME_LEN + 1));
    }

    #[test]
    fn test_length_prefix_overflow_is_fatal() {
        let mut asm = FrameAssembler::new();
        let bytes = [0x80u8, 0x80, 0x80, 0x80, 0x80, 0x01];
        let err = asm.accept(&bytes).unwrap_err();
        assert_eq!(err, FrameError::BadLengthPrefix);
    }

    #[test]
    fn test_zero_length_frame_completes_immediately() {
        let mut asm = FrameAssembler::new();
        let p = asm.accept(&[0x00]).unwrap();
        assert!(p.frame_complete);
        let frame = asm.current_frame().unwrap();
        assert!(frame.head.is_empty());
        assert_eq!(frame.total_len, 0);
        assert!(!frame.truncated);
    }

    #[test]
    fn test_reset_discards_partial_frame() {
        let mut asm = FrameAssembler::new();
        let wire = frame_bytes(b"partial");
        asm.accept(&wire[..5]).unwrap();

        asm.reset();

        // A fresh frame parses cleanly from the start.
        let wire2 = frame_bytes(b"ok");
        let p = asm.accept(&wire2).unwrap();
        assert!(p.frame_complete);
        assert_eq!(asm.current_frame().unwrap().head, b"ok");
    }

    #[test]
    fn test_accept_stops_at_frame_boundary() {
        let mut asm = FrameAssembler::new();
        let mut wire = frame_bytes(b"xy");
        wire.extend_from_slice(&[0xFF; 8]); // garbage past the frame

        let p = asm.accept(&wire).unwrap();
        assert!(p.frame_complete);
        // Only the frame's own bytes were consumed.
        assert_eq!(p.consumed, wire.len() - 8);
    }
}
