// Bounds-checked reads over a byte slice.

use lexfst::FstError;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], FstError> {
        if self.remaining() < n {
            return Err(FstError::format(
                self.pos,
                format!("unexpected end of input in {what}"),
            ));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize, what: &str) -> Result<(), FstError> {
        self.take(n, what).map(|_| ())
    }

    pub fn u16_le(&mut self, what: &str) -> Result<u16, FstError> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u16_be(&mut self, what: &str) -> Result<u16, FstError> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32_le(&mut self, what: &str) -> Result<u32, FstError> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u32_be(&mut self, what: &str) -> Result<u32, FstError> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Big-endian unsigned integer stored in `width` bytes.
    pub fn uint_be(&mut self, width: usize, what: &str) -> Result<u64, FstError> {
        let b = self.take(width, what)?;
        Ok(b.iter().fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
    }

    /// Read a little-endian `Pod` record.
    pub fn record<T: bytemuck::Pod>(&mut self, what: &str) -> Result<T, FstError> {
        let b = self.take(std::mem::size_of::<T>(), what)?;
        Ok(bytemuck::pod_read_unaligned(b))
    }
}
