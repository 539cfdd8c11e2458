use crate::{Error, load_le};

/// Accepted values of a block header's bit offset.
pub const BIT_OFFSET_RANGE: std::ops::RangeInclusive<i32> = -7..=0;

/// Reader for the entropy-coded payloads: bytes are pulled from the tail of
/// the buffer toward its head, and bits are served from the top of the
/// accumulator.
///
/// The encoder appends bits LSB-first and emits symbols in reverse, so the
/// decoder sees them in stream order.
#[derive(Debug)]
pub struct ReverseBitReader<'src> {
    src: &'src [u8],
    buf: u64,
    bit_count: u8,
}

impl<'src> ReverseBitReader<'src> {
    /// `bit_offset` is the number of unused high bits of the last payload
    /// byte, negated.
    pub fn new(src: &'src [u8], bit_offset: i32) -> Result<Self, Error> {
        if !BIT_OFFSET_RANGE.contains(&bit_offset) {
            return Err(Error::InvalidBitOffset(bit_offset));
        }

        let (n_bytes, bit_count) = if bit_offset != 0 {
            (8, (64 + bit_offset) as u8)
        } else {
            (7, 56)
        };

        if src.len() < n_bytes {
            return Err(Error::Underflow {
                requested: n_bytes,
                available: src.len(),
            });
        }

        let start = src.len() - n_bytes;
        let buf = load_le(&src[start..]);
        if buf >> bit_count != 0 {
            return Err(Error::DirtyPadding);
        }

        Ok(Self {
            src: &src[..start],
            buf,
            bit_count,
        })
    }

    #[inline(always)]
    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }

    /// Tops the accumulator up with whole bytes, leaving at least 56 bits
    /// available.
    #[inline(always)]
    pub fn refill(&mut self) -> Result<(), Error> {
        debug_assert!(self.bit_count < 64);

        let n_bits = (63 - self.bit_count) & !7;
        if n_bits == 0 {
            return Ok(());
        }

        let n_bytes = (n_bits / 8) as usize;
        if self.src.len() < n_bytes {
            return Err(Error::Underflow {
                requested: n_bytes,
                available: self.src.len(),
            });
        }

        let start = self.src.len() - n_bytes;
        let incoming = load_le(&self.src[start..]);

        self.buf = (self.buf << n_bits) | incoming;
        self.bit_count += n_bits;
        self.src = &self.src[..start];
        Ok(())
    }

    /// Takes the top `n_bits` of the accumulator. Does not refill.
    #[inline(always)]
    pub fn read(&mut self, n_bits: u8) -> Result<u64, Error> {
        if n_bits > self.bit_count {
            return Err(Error::NotEnoughBits {
                requested: n_bits as usize,
                remaining: self.bit_count as usize,
            });
        }

        self.bit_count -= n_bits;
        let ret = self.buf >> self.bit_count;
        self.buf &= (1u64 << self.bit_count) - 1;

        Ok(ret)
    }

    #[inline(always)]
    pub fn bytes_remaining(&self) -> usize {
        self.src.len()
    }
}
