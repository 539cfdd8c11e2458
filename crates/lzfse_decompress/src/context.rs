use std::io::Read;

use crate::{
    D_ALPHABET, L_ALPHABET, LITERAL_STATES, LITERALS_PER_BLOCK, M_ALPHABET,
    lzfse_header::Header, prelude::*,
};

/// Per-stream decoding state, reused from one block to the next.
pub struct Context<R: lzfse_io::Reader> {
    pub src: R,

    /// Decoded literals of the current LZFSE block. Literals are decoded four
    /// at a time, hence the slack.
    pub literals_buf: Vec<u8>,

    /// Entropy-coded or LZVN payload of the current block.
    pub scratch_buf: Scratch,

    pub fse: Box<FSEContext>,
}

impl<R: lzfse_io::Reader> Context<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            literals_buf: vec![0; LITERALS_PER_BLOCK + 64],
            scratch_buf: Scratch::default(),
            fse: Box::default(),
        }
    }
}

impl<R: lzfse_io::Reader> std::fmt::Debug for Context<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("literals_buf", &self.literals_buf.len())
            .field("scratch_buf", &self.scratch_buf.capacity())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct FSEContext {
    pub l: lzfse_fse::ValueTable<{ L_ALPHABET.n_states() }>,
    pub m: lzfse_fse::ValueTable<{ M_ALPHABET.n_states() }>,
    pub d: lzfse_fse::ValueTable<{ D_ALPHABET.n_states() }>,
    pub literal: lzfse_fse::DecodingTable<LITERAL_STATES>,
}

impl FSEContext {
    pub fn rebuild(&mut self, header: &Header) -> Result<(), Error> {
        self.l
            .rebuild(header.l_freq(), L_ALPHABET.v_bits(), L_ALPHABET.v_base())?;
        self.m
            .rebuild(header.m_freq(), M_ALPHABET.v_bits(), M_ALPHABET.v_base())?;
        self.d
            .rebuild(header.d_freq(), D_ALPHABET.v_bits(), D_ALPHABET.v_base())?;
        self.literal.rebuild(header.literal_freq())?;

        Ok(())
    }
}

/// Byte arena for block payloads. The allocation only ever grows.
#[derive(Debug, Default)]
pub struct Scratch {
    buf: Vec<u8>,
}

impl Scratch {
    /// Replaces the contents with `pad` zero bytes followed by exactly `len`
    /// bytes of `src`. The arena grows with the bytes actually read, so a
    /// bogus length fails on truncation before it can exhaust memory.
    pub fn fill(
        &mut self,
        src: &mut impl std::io::Read,
        pad: usize,
        len: usize,
    ) -> Result<&[u8], Error> {
        self.buf.clear();
        self.buf.resize(pad, 0);

        let read = src.by_ref().take(len as u64).read_to_end(&mut self.buf)?;
        if read != len {
            return Err(Error::Truncated);
        }

        Ok(&self.buf)
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_fill_pads_and_reads() -> Result<(), Error> {
        let mut scratch = Scratch::default();
        let mut src: &[u8] = &[1, 2, 3, 4, 5];

        assert_eq!(scratch.fill(&mut src, 2, 3)?, [0, 0, 1, 2, 3]);
        assert_eq!(src, [4, 5]);

        let capacity = scratch.capacity();
        assert_eq!(scratch.fill(&mut src, 0, 1)?, [4]);
        assert!(scratch.capacity() >= capacity);

        Ok(())
    }

    #[test]
    fn test_scratch_fill_truncated() {
        let mut scratch = Scratch::default();
        let mut src: &[u8] = &[1, 2];

        assert!(matches!(
            scratch.fill(&mut src, 8, 3),
            Err(Error::Truncated)
        ));
    }
}
