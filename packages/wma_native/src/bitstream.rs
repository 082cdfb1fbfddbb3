use crate::error::{Error, Result};

/// MSB-first bit cursor over a byte slice.
///
/// Reads never go past `bit_len`; an attempt to do so returns
/// [`Error::CorruptStream`] and leaves the cursor where it was. Peeks past the
/// end see zero bits, which lets prefix-code lookups use a fixed window at the
/// tail of a buffer.
///
/// # Examples
///
/// ```rust
/// # use moosicbox_wma_native::bitstream::BitReader;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = [0b1011_0001, 0xFF];
/// let mut reader = BitReader::new(&data);
///
/// assert_eq!(reader.read_bits(4)?, 0b1011);
/// assert!(!reader.read_bit()?);
/// assert_eq!(reader.bits_left(), 11);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_len: usize,
    position: usize,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_len: data.len() * 8,
            position: 0,
        }
    }

    /// Creates a reader limited to the first `bit_len` bits of `data`.
    #[must_use]
    pub fn with_bit_len(data: &'a [u8], bit_len: usize) -> Self {
        Self {
            data,
            bit_len: bit_len.min(data.len() * 8),
            position: 0,
        }
    }

    #[must_use]
    pub const fn bits_consumed(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn bits_left(&self) -> usize {
        self.bit_len - self.position
    }

    #[must_use]
    pub const fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the next `count` bits without consuming them.
    ///
    /// Bits beyond the end of the buffer read as zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn peek_bits(&self, count: u32) -> u32 {
        debug_assert!(count <= 32);
        if count == 0 {
            return 0;
        }

        let byte = self.position / 8;
        let mut window = 0_u64;
        for i in 0..8 {
            window <<= 8;
            if let Some(&b) = self.data.get(byte + i) {
                window |= u64::from(b);
            }
        }
        window <<= self.position % 8;

        let mut value = (window >> (64 - count)) as u32;

        let left = self.bits_left();
        if (count as usize) > left {
            let missing = count as usize - left;
            value &= !((1_u64 << missing) - 1) as u32;
        }

        value
    }

    /// Reads `count` bits (at most 32) as an unsigned integer.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If fewer than `count` bits remain
    pub fn read_bits(&mut self, count: u32) -> Result<u32> {
        if count == 0 {
            return Ok(0);
        }
        if count > 32 {
            return Err(Error::CorruptStream(format!(
                "bit field of {count} bits is wider than 32"
            )));
        }
        let value = self.peek_bits(count);
        self.skip_bits(count as usize)?;
        Ok(value)
    }

    /// Reads a single bit.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If the reader is exhausted
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Advances the cursor by `count` bits.
    ///
    /// # Errors
    ///
    /// * `CorruptStream` - If fewer than `count` bits remain
    pub fn skip_bits(&mut self, count: usize) -> Result<()> {
        if count > self.bits_left() {
            return Err(Error::CorruptStream(format!(
                "read of {count} bits at bit {} overruns {} bit buffer",
                self.position, self.bit_len
            )));
        }
        self.position += count;
        Ok(())
    }

    /// Moves the cursor to the next byte boundary.
    ///
    /// Clamps to the end of the readable region.
    pub fn align_to_byte(&mut self) {
        let aligned = (self.position + 7) & !7;
        self.position = aligned.min(self.bit_len);
    }
}

/// MSB-first bit packer used to build synthetic packets in tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

#[cfg(test)]
impl BitWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn write_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    pub(crate) fn write_bit(&mut self, bit: bool) {
        if self.bit_len.is_multiple_of(8) {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    pub(crate) const fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub(crate) fn align_to_byte(&mut self) {
        while !self.bit_len.is_multiple_of(8) {
            self.write_bit(false);
        }
    }

    /// Returns the packed bytes zero padded to `len`.
    pub(crate) fn into_padded(mut self, len: usize) -> Vec<u8> {
        assert!(self.bytes.len() <= len, "writer holds more than {len} bytes");
        self.bytes.resize(len, 0);
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_read_bits_msb_first() {
        let data = [0xA5, 0x3C];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(7).unwrap(), 0b0_0101_00);
        assert_eq!(reader.read_bits(6).unwrap(), 0b11_1100);
        assert_eq!(reader.bits_left(), 0);
    }

    #[test]
    fn test_read_full_word() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x80];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(1).unwrap();
        assert_eq!(reader.read_bits(32).unwrap(), 0xBD5B_7DDF);
    }

    #[test]
    fn test_peek_pads_with_zeros() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(6).unwrap();
        assert_eq!(reader.peek_bits(4), 0b1100);
    }

    #[test]
    fn test_peek_respects_bit_len_limit() {
        let data = [0xFF, 0xFF];
        let reader = BitReader::with_bit_len(&data, 3);
        assert_eq!(reader.peek_bits(8), 0b1110_0000);
    }

    #[test_case(1, 9 ; "one_past_end")]
    #[test_case(0, 17 ; "far_past_end")]
    fn test_overread_is_corrupt(skip: usize, count: u32) {
        let data = [0x00];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(skip).unwrap();
        let before = reader.bits_consumed();
        assert!(matches!(
            reader.read_bits(count),
            Err(Error::CorruptStream(_))
        ));
        assert_eq!(reader.bits_consumed(), before);
    }

    #[test]
    fn test_align_to_byte() {
        let data = [0x00, 0xF0];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(3).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.bits_consumed(), 8);
        reader.align_to_byte();
        assert_eq!(reader.bits_consumed(), 8);
        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
    }

    #[test]
    fn test_writer_matches_reader() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        writer.write_bits(0x1_2345, 17);
        writer.write_bit(true);
        let len = writer.bit_len();
        let bytes = writer.into_padded(4);

        let mut reader = BitReader::with_bit_len(&bytes, len);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(17).unwrap(), 0x1_2345);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.bits_left(), 0);
    }
}
