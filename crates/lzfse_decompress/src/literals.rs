use lzfse_fse::{Decoder, DecodingTable};
use lzfse_io::ReverseBitReader;

use crate::{LITERAL_STATES, context::Context, lzfse_header::Header, prelude::*};

/// Zero bytes in front of the literal payload, for the final refills.
pub const LITERAL_PAYLOAD_PAD: usize = 8;

impl<R: lzfse_io::Reader> Context<R> {
    /// Reads the literal payload of an LZFSE block and decodes it into
    /// `literals_buf`. The entropy tables must already be built.
    pub fn literals(&mut self, header: &Header) -> Result<(), Error> {
        let payload = self.scratch_buf.fill(
            &mut self.src,
            LITERAL_PAYLOAD_PAD,
            header.n_literal_payload_bytes as usize,
        )?;

        let n_literals = (header.n_literals as usize).next_multiple_of(4);
        decode_literals(
            payload,
            header.literal_bits,
            &self.fse.literal,
            header.literal_states,
            &mut self.literals_buf[..n_literals],
        )
    }
}

/// Runs the four interleaved literal decoders, one byte each in turn, until
/// `dst` is full. `dst.len()` must be a multiple of 4.
pub fn decode_literals(
    payload: &[u8],
    bit_offset: i32,
    table: &DecodingTable<LITERAL_STATES>,
    states: [u16; 4],
    dst: &mut [u8],
) -> Result<(), Error> {
    debug_assert_eq!(dst.len() % 4, 0);

    let mut br = ReverseBitReader::new(payload, bit_offset)?;
    let [s0, s1, s2, s3] = states;
    let mut decoders = [
        Decoder::new(table, s0)?,
        Decoder::new(table, s1)?,
        Decoder::new(table, s2)?,
        Decoder::new(table, s3)?,
    ];

    // Four literals take at most 40 bits.
    for chunk in dst.chunks_exact_mut(4) {
        br.refill()?;
        for (literal, decoder) in chunk.iter_mut().zip(decoders.iter_mut()) {
            *literal = decoder.decode(&mut br)?;
        }
    }

    Ok(())
}
