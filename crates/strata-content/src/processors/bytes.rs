//! Little-endian cursor helpers for the binary formats.

use crate::error::{AssetError, AssetResult};

pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Next `len` bytes; a short read fails with "Unable to read `what`".
    pub(crate) fn take(&mut self, len: usize, what: &str) -> AssetResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(AssetError::corrupt(format!("Unable to read {}", what)));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self, what: &str) -> AssetResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, what: &str) -> AssetResult<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    pub(crate) fn bool(&mut self, what: &str) -> AssetResult<bool> {
        Ok(self.u8(what)? != 0)
    }

    pub(crate) fn u16(&mut self, what: &str) -> AssetResult<u16> {
        self.array(what).map(u16::from_le_bytes)
    }

    pub(crate) fn u32(&mut self, what: &str) -> AssetResult<u32> {
        self.array(what).map(u32::from_le_bytes)
    }

    pub(crate) fn u64(&mut self, what: &str) -> AssetResult<u64> {
        self.array(what).map(u64::from_le_bytes)
    }

    pub(crate) fn i32(&mut self, what: &str) -> AssetResult<i32> {
        self.array(what).map(i32::from_le_bytes)
    }

    pub(crate) fn f32(&mut self, what: &str) -> AssetResult<f32> {
        self.array(what).map(f32::from_le_bytes)
    }

    pub(crate) fn descriptor<const N: usize>(&mut self, what: &str) -> AssetResult<[u8; N]> {
        self.array(what)
    }

    /// String with an 8-bit length prefix.
    pub(crate) fn short_string(&mut self, what: &str) -> AssetResult<String> {
        let len = self.u8(what)? as usize;
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AssetError::corrupt(format!("{} is not valid UTF-8", what)))
    }
}

#[derive(Default)]
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub(crate) fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn u64(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn i32(&mut self, v: i32) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn f32(&mut self, v: f32) {
        self.bytes(&v.to_le_bytes());
    }

    /// String with an 8-bit length prefix; longer strings are rejected.
    pub(crate) fn short_string(&mut self, s: &str) -> AssetResult<()> {
        let len = u8::try_from(s.len()).map_err(|_| {
            AssetError::invalid(format!("'{}' is longer than 255 bytes", s))
        })?;
        self.u8(len);
        self.bytes(s.as_bytes());
        Ok(())
    }

    /// Count that must fit in 16 bits.
    pub(crate) fn count16(&mut self, n: usize, what: &str) -> AssetResult<()> {
        let n = u16::try_from(n)
            .map_err(|_| AssetError::invalid(format!("too many {} ({})", what, n)))?;
        self.u16(n);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_writer_little_endian() {
        let mut w = ByteWriter::new();
        w.u16(0x4815);
        w.u32(7);
        w.f32(1.5);
        w.short_string("Textures/Grass.ast").unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[..2], &[0x15, 0x48]);

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.u16("trailer").unwrap(), 0x4815);
        assert_eq!(r.u32("count").unwrap(), 7);
        assert_eq!(r.f32("value").unwrap(), 1.5);
        assert_eq!(r.short_string("name").unwrap(), "Textures/Grass.ast");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_short_read_is_corrupt() {
        let mut r = ByteReader::new(&[1, 2, 3]);
        let err = r.u32("vertex count").unwrap_err();
        assert!(err.is_corrupt());
        assert_eq!(err.to_string(), "Corrupt file: Unable to read vertex count");
    }

    #[test]
    fn test_long_string_rejected() {
        let mut w = ByteWriter::new();
        assert!(w.short_string(&"x".repeat(256)).is_err());
    }
}
