//! Low-level wire helpers shared by the record codecs.
//!
//! All multi-byte integers are big-endian. Encoding writes into a
//! caller-supplied buffer that must already be large enough; decoding
//! consumes a [`Bytes`] stream, keeping a snapshot of the record start so
//! the CRC can be recomputed over the exact bytes read.

use bytes::{Buf, Bytes};

use crate::crc;
use crate::error::{FormatError, FormatResult};

/// Size of a record's leading version tag in bytes.
pub const VERSION_FIELD_SIZE: usize = 2;

/// Serialized size of a length-prefixed string field.
///
/// An absent string and an empty string share the same wire form: a zero
/// length prefix with no bytes.
pub(crate) fn string_field_size(s: &str) -> usize {
    4 + s.len()
}

/// Cursor over a caller-supplied output buffer.
///
/// Construction fails with [`FormatError::InvalidArgument`] when the buffer
/// cannot hold the full record, before any byte is written.
pub(crate) struct RecordWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> RecordWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8], required: usize) -> FormatResult<Self> {
        if buf.len() < required {
            return Err(FormatError::invalid_argument(format!(
                "output buffer too small: record needs {required} bytes, buffer has {}",
                buf.len()
            )));
        }
        Ok(Self { buf, pos: 0 })
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf[self.pos] = v;
        self.pos += 1;
    }

    pub(crate) fn put_u16(&mut self, v: u16) {
        self.put_bytes(&v.to_be_bytes());
    }

    pub(crate) fn put_i16(&mut self, v: i16) {
        self.put_bytes(&v.to_be_bytes());
    }

    pub(crate) fn put_i32(&mut self, v: i32) {
        self.put_bytes(&v.to_be_bytes());
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.put_bytes(&v.to_be_bytes());
    }

    pub(crate) fn put_u64(&mut self, v: u64) {
        self.put_bytes(&v.to_be_bytes());
    }

    pub(crate) fn put_i64(&mut self, v: i64) {
        self.put_bytes(&v.to_be_bytes());
    }

    pub(crate) fn put_bytes(&mut self, v: &[u8]) {
        self.buf[self.pos..self.pos + v.len()].copy_from_slice(v);
        self.pos += v.len();
    }

    /// Writes a length-prefixed string field.
    pub(crate) fn put_string(&mut self, s: &str) -> FormatResult<()> {
        let len = u32::try_from(s.len()).map_err(|_| {
            FormatError::invalid_argument("string field exceeds 4-byte length field")
        })?;
        self.put_u32(len);
        self.put_bytes(s.as_bytes());
        Ok(())
    }

    /// Appends the CRC trailer over every byte written so far.
    pub(crate) fn put_crc(&mut self) {
        let value = crc::crc(&self.buf[..self.pos]);
        self.put_u64(value);
    }

    #[cfg(test)]
    pub(crate) fn written(&self) -> usize {
        self.pos
    }
}

/// Cursor over an input stream, tracking the bytes covered by the CRC.
///
/// The reader advances the caller's stream as it goes; a snapshot taken at
/// construction lets [`RecordReader::crc_pair`] recompute the checksum over
/// exactly the bytes consumed before the trailer.
pub(crate) struct RecordReader<'a> {
    stream: &'a mut Bytes,
    snapshot: Bytes,
    start_len: usize,
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(stream: &'a mut Bytes) -> Self {
        let snapshot = stream.clone();
        let start_len = stream.len();
        Self {
            stream,
            snapshot,
            start_len,
        }
    }

    fn consumed(&self) -> usize {
        self.start_len - self.stream.len()
    }

    /// Bytes left in the stream.
    pub(crate) fn remaining(&self) -> usize {
        self.stream.len()
    }

    fn need(&self, n: usize, what: &str) -> FormatResult<()> {
        if self.stream.len() < n {
            return Err(FormatError::data_corrupt(format!(
                "unexpected end of record reading {what}"
            )));
        }
        Ok(())
    }

    pub(crate) fn read_u8(&mut self, what: &str) -> FormatResult<u8> {
        self.need(1, what)?;
        Ok(self.stream.get_u8())
    }

    pub(crate) fn read_u16(&mut self, what: &str) -> FormatResult<u16> {
        self.need(2, what)?;
        Ok(self.stream.get_u16())
    }

    pub(crate) fn read_i16(&mut self, what: &str) -> FormatResult<i16> {
        self.need(2, what)?;
        Ok(self.stream.get_i16())
    }

    pub(crate) fn read_i32(&mut self, what: &str) -> FormatResult<i32> {
        self.need(4, what)?;
        Ok(self.stream.get_i32())
    }

    pub(crate) fn read_u32(&mut self, what: &str) -> FormatResult<u32> {
        self.need(4, what)?;
        Ok(self.stream.get_u32())
    }

    pub(crate) fn read_u64(&mut self, what: &str) -> FormatResult<u64> {
        self.need(8, what)?;
        Ok(self.stream.get_u64())
    }

    pub(crate) fn read_i64(&mut self, what: &str) -> FormatResult<i64> {
        self.need(8, what)?;
        Ok(self.stream.get_i64())
    }

    /// Reads `n` raw bytes, zero-copy.
    pub(crate) fn read_bytes(&mut self, n: usize, what: &str) -> FormatResult<Bytes> {
        self.need(n, what)?;
        Ok(self.stream.split_to(n))
    }

    /// Reads a length-prefixed string field.
    pub(crate) fn read_string(&mut self, what: &str) -> FormatResult<String> {
        let len = self.read_u32(what)? as usize;
        let raw = self.read_bytes(len, what)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| FormatError::data_corrupt(format!("{what} is not valid UTF-8")))
    }

    /// Reads the trailer and returns `(stored, computed)` without comparing.
    ///
    /// The computed value covers every byte consumed before the trailer.
    pub(crate) fn crc_pair(&mut self) -> FormatResult<(u64, u64)> {
        let covered = self.consumed();
        let computed = crc::crc(&self.snapshot[..covered]);
        let stored = self.read_u64("crc")?;
        Ok((stored, computed))
    }

    /// Reads the trailer and fails with `DataCorrupt` on mismatch.
    pub(crate) fn verify_crc(&mut self) -> FormatResult<()> {
        let (stored, computed) = self.crc_pair()?;
        if stored != computed {
            return Err(FormatError::data_corrupt(format!(
                "crc mismatch: stored {stored:#018x}, computed {computed:#018x}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_rejects_undersized_buffer() {
        let mut buf = [0u8; 4];
        let result = RecordWriter::new(&mut buf, 8);
        assert!(matches!(result, Err(FormatError::InvalidArgument { .. })));
    }

    #[test]
    fn writer_tracks_position() {
        let mut buf = [0u8; 16];
        let mut w = RecordWriter::new(&mut buf, 16).unwrap();
        w.put_u16(7);
        w.put_u32(9);
        w.put_string("ab").unwrap();
        assert_eq!(w.written(), 2 + 4 + 4 + 2);
    }

    #[test]
    fn reader_eof_is_corruption() {
        let mut stream = Bytes::from_static(&[0x01]);
        let mut r = RecordReader::new(&mut stream);
        let err = r.read_u16("version").unwrap_err();
        assert!(matches!(err, FormatError::DataCorrupt { .. }));
    }

    #[test]
    fn crc_roundtrip_through_cursors() {
        let mut buf = vec![0u8; 2 + 4 + 8];
        let mut w = RecordWriter::new(&mut buf, 14).unwrap();
        w.put_u16(1);
        w.put_u32(0xDEAD_BEEF);
        w.put_crc();

        let mut stream = Bytes::from(buf);
        let mut r = RecordReader::new(&mut stream);
        assert_eq!(r.read_u16("version").unwrap(), 1);
        assert_eq!(r.read_u32("value").unwrap(), 0xDEAD_BEEF);
        r.verify_crc().unwrap();
    }

    #[test]
    fn crc_mismatch_after_flip() {
        let mut buf = vec![0u8; 2 + 4 + 8];
        let mut w = RecordWriter::new(&mut buf, 14).unwrap();
        w.put_u16(1);
        w.put_u32(42);
        w.put_crc();
        buf[3] ^= 0x01;

        let mut stream = Bytes::from(buf);
        let mut r = RecordReader::new(&mut stream);
        r.read_u16("version").unwrap();
        r.read_u32("value").unwrap();
        assert!(matches!(
            r.verify_crc(),
            Err(FormatError::DataCorrupt { .. })
        ));
    }

    #[test]
    fn string_absent_and_empty_share_wire_form() {
        assert_eq!(string_field_size(""), 4);
        let mut buf = vec![0u8; 4];
        let mut w = RecordWriter::new(&mut buf, 4).unwrap();
        w.put_string("").unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0]);
    }
}
