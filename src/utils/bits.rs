use crate::error::{DemuxError, Result};

/// A bit-level reader for fixed-width header fields.
///
/// Bits are consumed MSB-first, which is the layout every ADTS and MPEG
/// systems header uses.
///
/// Example:
/// ```
/// use demuxkit::utils::BitReader;
///
/// let data = [0b10110011];
/// let mut reader = BitReader::new(&data);
///
/// assert_eq!(reader.read_bit().unwrap(), true);   // 1
/// assert_eq!(reader.read_bits(3).unwrap(), 0b011); // 011
/// ```
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_offset: usize,
    bit_offset: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader from a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte_offset: 0,
            bit_offset: 0,
        }
    }

    /// Reads a single bit. Returns true for 1, false for 0.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.byte_offset >= self.data.len() {
            return Err(DemuxError::Parser("reached end of header data".into()));
        }

        let bit = (self.data[self.byte_offset] >> (7 - self.bit_offset)) & 1;
        self.bit_offset += 1;

        if self.bit_offset == 8 {
            self.bit_offset = 0;
            self.byte_offset += 1;
        }

        Ok(bit == 1)
    }

    /// Reads n bits as a big-endian number.
    ///
    /// Returns error if n > 32 or end of data is reached.
    pub fn read_bits(&mut self, n: u32) -> Result<u32> {
        if n > 32 {
            return Err(DemuxError::Parser(format!("cannot read {} bits at once", n)));
        }
        if n as usize > self.available_bits() {
            return Err(DemuxError::Parser("reached end of header data".into()));
        }

        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Reads a single-bit flag.
    pub fn read_flag(&mut self) -> Result<bool> {
        self.read_bit()
    }

    /// Skips n bits in the stream.
    pub fn skip_bits(&mut self, n: u32) -> Result<()> {
        if n as usize > self.available_bits() {
            return Err(DemuxError::Parser("skip past end of header data".into()));
        }
        let total = self.bit_offset as usize + n as usize;
        self.byte_offset += total / 8;
        self.bit_offset = (total % 8) as u8;
        Ok(())
    }

    /// Returns number of bits available to read.
    pub fn available_bits(&self) -> usize {
        (self.data.len() - self.byte_offset) * 8 - self.bit_offset as usize
    }
}

/// MSB-first bit writer, the inverse of [`BitReader`].
#[derive(Debug, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_offset: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_offset == 0 {
            self.data.push(0);
        }
        if bit {
            // push above guarantees a last byte
            if let Some(last) = self.data.last_mut() {
                *last |= 1 << (7 - self.bit_offset);
            }
        }
        self.bit_offset = (self.bit_offset + 1) % 8;
    }

    /// Writes the low `n` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, n: u32) {
        for i in (0..n.min(32)).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Returns the written bytes; a trailing partial byte is zero-padded.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_read_bits() {
        let data = [0b10110011];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(5).unwrap(), 0b10011);

        // Cross-byte boundary
        let data = [0b10110011, 0b01011010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(8).unwrap(), 0b10011010);

        let data = [0b10101010];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(0).unwrap(), 0);

        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        assert!(reader.read_bits(33).is_err());
    }

    #[test]
    fn test_skip_and_available() {
        let data = [0xFF, 0x0F];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.available_bits(), 16);
        reader.skip_bits(12).unwrap();
        assert_eq!(reader.available_bits(), 4);
        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert!(reader.skip_bits(1).is_err());
    }

    #[test]
    fn test_error_on_end_of_data() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        reader.read_bits(8).unwrap();
        assert!(reader.read_bit().is_err());

        // A failed wide read leaves the position untouched
        let mut reader = BitReader::new(&data);
        reader.read_bits(4).unwrap();
        assert!(reader.read_bits(5).is_err());
        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
    }

    #[test]
    fn test_writer_pads_partial_byte() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3);
        assert_eq!(writer.into_bytes(), vec![0b1010_0000]);
    }

    #[quickcheck]
    fn prop_writer_reader_agree(fields: Vec<(u32, u8)>) -> bool {
        let fields: Vec<(u32, u32)> = fields
            .into_iter()
            .map(|(v, n)| {
                let n = (n % 32) as u32 + 1;
                let mask = if n == 32 { u32::MAX } else { (1 << n) - 1 };
                (v & mask, n)
            })
            .collect();

        let mut writer = BitWriter::new();
        for &(v, n) in &fields {
            writer.write_bits(v, n);
        }
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        fields
            .iter()
            .all(|&(v, n)| matches!(reader.read_bits(n), Ok(r) if r == v))
    }
}
