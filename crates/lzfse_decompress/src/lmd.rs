use lzfse_fse::ValueDecoder;
use lzfse_io::ReverseBitReader;

use crate::{context::Context, lzfse_header::Header, prelude::*, window::Window};

/// Zero bytes in front of the L, M, D payload, for the final refills.
pub const LMD_PAYLOAD_PAD: usize = 32;

impl<R: lzfse_io::Reader> Context<R> {
    /// Reads the L, M, D payload of an LZFSE block and replays every
    /// (literal run, match) pair into `window`. Expects `literals_buf` to
    /// hold the block's decoded literals.
    pub fn lmd<W: std::io::Write>(
        &mut self,
        header: &Header,
        window: &mut Window<'_, W>,
    ) -> Result<(), Error> {
        let payload = self.scratch_buf.fill(
            &mut self.src,
            LMD_PAYLOAD_PAD,
            header.n_lmd_payload_bytes as usize,
        )?;

        let mut br = ReverseBitReader::new(payload, header.lmd_bits)?;
        let mut l_decoder = ValueDecoder::new(&self.fse.l, header.l_state)?;
        let mut m_decoder = ValueDecoder::new(&self.fse.m, header.m_state)?;
        let mut d_decoder = ValueDecoder::new(&self.fse.d, header.d_state)?;

        let literals = &self.literals_buf[..header.n_literals as usize];
        let mut literal_idx = 0;
        let mut d_prev = 0;

        for _ in 0..header.n_matches {
            // L, M and D take at most 14 + 17 + 23 bits.
            br.refill()?;
            let l = l_decoder.decode(&mut br)? as usize;
            let m = m_decoder.decode(&mut br)? as usize;
            let d = d_decoder.decode(&mut br)? as usize;
            if d != 0 {
                d_prev = d;
            }

            let run = literals.get(literal_idx..literal_idx + l).ok_or(
                Error::LiteralsOverread {
                    idx: literal_idx,
                    len: l,
                },
            )?;
            window.push_buf(run)?;
            literal_idx += l;

            // Every pair needs a distance, even one with an empty match.
            if d_prev == 0 {
                return Err(Error::MissingPreviousDistance);
            }

            if m == 0 {
                continue;
            }

            window.copy_within(d_prev, m)?;
        }

        Ok(())
    }
}
