use crate::prelude::*;

/// Ring buffer over the most recent output, in front of the real writer.
///
/// Every decoded byte passes through here: literals are appended, matches are
/// replayed from the ring. Bytes reach the writer as soon as they are
/// produced.
#[derive(Debug)]
pub struct Window<'b, W: std::io::Write> {
    buf: &'b mut [u8],
    out: W,
    mask: usize,
    index: usize,
    total: u64,
}

impl<'b, W: std::io::Write> Window<'b, W> {
    pub fn new(buf: &'b mut [u8], out: W) -> Self {
        assert!(buf.len().is_power_of_two());

        let mask = buf.len() - 1;
        Self {
            buf,
            out,
            mask,
            index: 0,
            total: 0,
        }
    }

    /// Bytes written since the start of the stream.
    #[inline(always)]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline(always)]
    fn advance(&mut self, n_bytes: usize) {
        self.index = (self.index + n_bytes) & self.mask;
        self.total += n_bytes as u64;
    }

    pub fn read_from(
        &mut self,
        src: &mut impl lzfse_io::Reader,
        len: usize,
    ) -> Result<(), Error> {
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(self.buf.len() - self.index);

            let target = &mut self.buf[self.index..self.index + n];
            src.read_exact(target)?;
            self.out.write_all(target)?;

            self.advance(n);
            remaining -= n;
        }

        Ok(())
    }

    #[inline(always)]
    pub fn push_buf(&mut self, data: &[u8]) -> Result<(), Error> {
        self.out.write_all(data)?;

        for chunk in data.chunks(self.buf.len()) {
            let first = chunk.len().min(self.buf.len() - self.index);
            let (head, tail) = chunk.split_at(first);

            self.buf[self.index..self.index + first].copy_from_slice(head);
            self.buf[..tail.len()].copy_from_slice(tail);
            self.advance(chunk.len());
        }

        Ok(())
    }

    /// Replays `n_bytes` starting `offset` bytes back. Overlapping copies
    /// (`offset < n_bytes`) repeat the bytes produced by this same call.
    pub fn copy_within(&mut self, offset: usize, n_bytes: usize) -> Result<(), Error> {
        if offset == 0 || offset as u64 > self.total {
            return Err(Error::InvalidBackReference {
                distance: offset,
                total: self.total,
            });
        }

        if offset > self.buf.len() {
            return Err(Error::DistanceBeyondWindow {
                distance: offset,
                window: self.buf.len(),
            });
        }

        let mut remaining = n_bytes;
        while remaining > 0 {
            let start = self.index;
            let n = remaining.min(self.buf.len() - start);
            let src_start = start.wrapping_sub(offset) & self.mask;

            if offset >= n && src_start + n <= self.buf.len() {
                self.buf.copy_within(src_start..src_start + n, start);
            } else {
                for idx in start..start + n {
                    self.buf[idx] = self.buf[idx.wrapping_sub(offset) & self.mask];
                }
            }

            self.out.write_all(&self.buf[start..start + n])?;
            self.advance(n);
            remaining -= n;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        Ok(())
    }
}
