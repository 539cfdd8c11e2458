use crate::Error;

/// LSB-first reader over a byte slice, consumed head to tail.
#[derive(Debug)]
pub struct BitReader<'src> {
    src: &'src [u8],
    buf: u64,
    bit_count: u8,
}

impl<'src> BitReader<'src> {
    pub fn new(src: &'src [u8]) -> Result<Self, Error> {
        if src.is_empty() {
            return Err(Error::EmptyStream);
        }

        let mut ret = Self {
            src,
            buf: 0,
            bit_count: 0,
        };
        ret.refill();

        Ok(ret)
    }

    #[inline(always)]
    pub fn read(&mut self, n_bits: u8) -> Result<u64, Error> {
        assert!(n_bits <= 56);

        let ret = self.peek_padded(n_bits);
        self.consume(n_bits)?;
        Ok(ret)
    }

    /// Returns the next `n_bits` without consuming them. Bits past the end of
    /// the stream read as zero.
    #[inline(always)]
    pub fn peek_padded(&mut self, n_bits: u8) -> u64 {
        assert!(n_bits <= 56);

        if self.bit_count < n_bits {
            self.refill();
        }

        self.buf & ((1u64 << n_bits) - 1)
    }

    #[inline(always)]
    pub fn consume(&mut self, n_bits: u8) -> Result<(), Error> {
        if self.bit_count < n_bits {
            self.refill();

            if self.bit_count < n_bits {
                return Err(Error::NotEnoughBits {
                    requested: n_bits as usize,
                    remaining: self.bits_remaining(),
                });
            }
        }

        self.buf >>= n_bits;
        self.bit_count -= n_bits;
        Ok(())
    }

    #[inline(always)]
    pub fn bits_remaining(&self) -> usize {
        self.bit_count as usize + self.src.len() * 8
    }

    #[cold]
    fn refill(&mut self) {
        debug_assert!(self.bit_count < 64);

        let count = ((64 - self.bit_count) / 8) as usize;
        if count == 0 {
            return;
        }

        let to_read = count.min(self.src.len());
        if to_read < 8 {
            return self.refill_cold(to_read);
        }

        debug_assert_eq!(self.bit_count, 0);

        self.buf = crate::load_le(&self.src[..8]);
        self.bit_count = 64;
        self.src = &self.src[8..];
    }

    #[cold]
    fn refill_cold(&mut self, count: usize) {
        let to_read = count.min(self.src.len());

        for (idx, &byte) in self.src[..to_read].iter().enumerate() {
            self.buf |= (byte as u64) << (self.bit_count + (idx as u8) * 8);
        }

        self.bit_count += (to_read * 8) as u8;
        self.src = &self.src[to_read..];
    }
}
