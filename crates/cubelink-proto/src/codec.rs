//! Primitive (de)serialization for the wire protocol.
//!
//! Varints are 7 bits per byte with the continuation bit high and
//! little-endian group order; a 32-bit signed value is cast unsigned before
//! encoding, so negative values always occupy five bytes. Fixed-width
//! integers are big-endian; floats travel as their IEEE bit patterns.
//!
//! Every read returns `Option` and advances the cursor only on success.
//! Callers treat any `None` as "drop this packet" — a short or malformed
//! payload must never abort the connection by itself.

/// Maximum number of bytes a varint may occupy on the wire.
pub const VARINT_MAX_BYTES: usize = 5;

/// Capacity of a [`PacketWriter`]. Serverbound packets are small; the
/// largest (login start with a full-length name) fits comfortably.
pub const PACKET_WRITER_CAP: usize = 320;

/// Cursor-based reader over a received packet payload.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Read a protocol varint as a signed 32-bit value.
    ///
    /// Rejects a sixth continuation byte as malformed.
    pub fn read_varint(&mut self) -> Option<i32> {
        let mut value: u32 = 0;
        let mut shift: u32 = 0;
        loop {
            if shift > 28 {
                return None;
            }
            let b = self.read_u8()?;
            value |= u32::from(b & 0x7F) << shift;
            if b & 0x80 == 0 {
                return Some(value as i32);
            }
            shift += 7;
        }
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        let bytes = self.read_bytes(2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        let bytes = self.read_bytes(4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        let bytes = self.read_bytes(8)?;
        let mut out = [0u8; 8];
        out.copy_from_slice(bytes);
        Some(u64::from_be_bytes(out))
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_f32(&mut self) -> Option<f32> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    /// Read exactly `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(out)
    }

    /// Advance the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Option<()> {
        if self.remaining() < n {
            return None;
        }
        self.pos += n;
        Some(())
    }

    /// Read a varint-length-prefixed byte string.
    pub fn read_str_bytes(&mut self) -> Option<&'a [u8]> {
        let len = self.read_varint()?;
        if len < 0 {
            return None;
        }
        self.read_bytes(len as usize)
    }
}

/// Encode a varint into `out`, returning the number of bytes written.
///
/// Returns `None` if `out` is too short.
pub fn encode_varint(out: &mut [u8], v: i32) -> Option<usize> {
    let mut u = v as u32;
    let mut n = 0;
    loop {
        if n >= out.len() {
            return None;
        }
        let mut b = (u & 0x7F) as u8;
        u >>= 7;
        if u != 0 {
            b |= 0x80;
        }
        out[n] = b;
        n += 1;
        if u == 0 {
            return Some(n);
        }
    }
}

/// Fixed-capacity builder for one outbound packet body.
///
/// Writes past the capacity poison the writer instead of panicking; a
/// poisoned writer reports `ok() == false` and must not be sent.
#[derive(Debug)]
pub struct PacketWriter {
    data: [u8; PACKET_WRITER_CAP],
    len: usize,
    ok: bool,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self {
            data: [0; PACKET_WRITER_CAP],
            len: 0,
            ok: true,
        }
    }

    /// Whether every write so far fit within the capacity.
    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The packet body written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub fn write_bytes(&mut self, src: &[u8]) {
        if !self.ok || self.len + src.len() > PACKET_WRITER_CAP {
            self.ok = false;
            return;
        }
        self.data[self.len..self.len + src.len()].copy_from_slice(src);
        self.len += src.len();
    }

    pub fn write_varint(&mut self, v: i32) {
        let mut u = v as u32;
        loop {
            let mut b = (u & 0x7F) as u8;
            u >>= 7;
            if u != 0 {
                b |= 0x80;
            }
            self.write_u8(b);
            if u == 0 {
                break;
            }
        }
    }

    pub fn write_u16(&mut self, v: u16) {
        self.write_bytes(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_be_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_be_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    /// Write a varint-length-prefixed UTF-8 string.
    pub fn write_str(&mut self, s: &str) {
        self.write_varint(s.len() as i32);
        self.write_bytes(s.as_bytes());
    }
}

impl Default for PacketWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
