use lzfse_io::{BIT_OFFSET_RANGE, BitReader, ReadU16, ReadU32};

use crate::{
    D_ALPHABET, ENCODE_SYMBOLS, L_ALPHABET, LITERAL_STATES, LITERAL_SYMBOLS,
    LITERALS_PER_BLOCK, M_ALPHABET, MATCHES_PER_BLOCK, prelude::*,
};

/// Bytes following the `bvx1` magic.
pub const V1_HEADER_SIZE: usize = 768;
/// Fixed bytes following the `bvx2` magic.
pub const V2_HEADER_SIZE: usize = 28;
/// The v2 `header_size` field also counts the magic.
const V2_FIXED_SIZE: u32 = 4 + V2_HEADER_SIZE as u32;
/// Largest compact frequency table: every symbol using the 14 bit code.
const MAX_COMPACT_FREQ_SIZE: usize = (ENCODE_SYMBOLS * 14).div_ceil(8);

const_assert!(V1_HEADER_SIZE == 46 + 2 * ENCODE_SYMBOLS + 2);
const_assert!(MAX_COMPACT_FREQ_SIZE == 630);

const L_FREQ: std::ops::Range<usize> = 0..L_ALPHABET.n_symbols();
const M_FREQ: std::ops::Range<usize> = L_FREQ.end..L_FREQ.end + M_ALPHABET.n_symbols();
const D_FREQ: std::ops::Range<usize> = M_FREQ.end..M_FREQ.end + D_ALPHABET.n_symbols();
const LITERAL_FREQ: std::ops::Range<usize> = D_FREQ.end..D_FREQ.end + LITERAL_SYMBOLS;
const_assert!(LITERAL_FREQ.end == ENCODE_SYMBOLS);

/// Code length of a compact frequency, keyed by its low 5 bits.
const FREQ_NBITS_TABLE: [u8; 32] = [
    2, 3, 2, 5, 2, 3, 2, 8, 2, 3, 2, 5, 2, 3, 2, 14, 2, 3, 2, 5, 2, 3, 2, 8, 2, 3,
    2, 5, 2, 3, 2, 14,
];

/// Value of a compact frequency, keyed by its low 5 bits. The 8 and 14 bit
/// codes carry their value in the upper bits and read as 0 here.
const FREQ_VALUE_TABLE: [u16; 32] = [
    0, 2, 1, 4, 0, 3, 1, 0, 0, 2, 1, 5, 0, 3, 1, 0, 0, 2, 1, 6, 0, 3, 1, 0, 0, 2, 1,
    7, 0, 3, 1, 0,
];

/// Parameters of one LZFSE block, in the expanded form of the `bvx1` header.
/// `bvx2` headers are unpacked into the same shape.
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    pub n_raw_bytes: u32,
    pub n_literals: u32,
    pub n_matches: u32,
    pub n_literal_payload_bytes: u32,
    pub n_lmd_payload_bytes: u32,

    /// Bit offset of the literal payload, in `-7..=0`.
    pub literal_bits: i32,
    pub literal_states: [u16; 4],

    /// Bit offset of the L, M, D payload, in `-7..=0`.
    pub lmd_bits: i32,
    pub l_state: u16,
    pub m_state: u16,
    pub d_state: u16,

    /// L, M, D and literal weights, in that order.
    pub freqs: [u16; ENCODE_SYMBOLS],
}

impl Header {
    pub fn read_v1(src: &mut impl lzfse_io::Reader) -> Result<Self, Error> {
        let mut buf = [0u8; V1_HEADER_SIZE];
        src.read_exact(&mut buf)?;
        let mut r = &buf[..];

        let n_raw_bytes = r.read_u32()?;
        // Literal plus L, M, D payloads; both are also given separately.
        let _n_payload_bytes = r.read_u32()?;
        let n_literals = r.read_u32()?;
        let n_matches = r.read_u32()?;
        let n_literal_payload_bytes = r.read_u32()?;
        let n_lmd_payload_bytes = r.read_u32()?;

        let literal_bits = r.read_u32()? as i32;
        let mut literal_states = [0; 4];
        for state in &mut literal_states {
            *state = r.read_u16()?;
        }

        let lmd_bits = r.read_u32()? as i32;
        let l_state = r.read_u16()?;
        let m_state = r.read_u16()?;
        let d_state = r.read_u16()?;

        let mut freqs = [0; ENCODE_SYMBOLS];
        for freq in &mut freqs {
            *freq = r.read_u16()?;
        }

        let header = Self {
            n_raw_bytes,
            n_literals,
            n_matches,
            n_literal_payload_bytes,
            n_lmd_payload_bytes,
            literal_bits,
            literal_states,
            lmd_bits,
            l_state,
            m_state,
            d_state,
            freqs,
        };

        header.validate()?;
        Ok(header)
    }

    pub fn read_v2(src: &mut impl lzfse_io::Reader) -> Result<Self, Error> {
        let n_raw_bytes = src.read_u32()?;
        let v0 = src.read_u64()?;
        let v1 = src.read_u64()?;
        let v2 = src.read_u64()?;

        let header_size = field(v2, 0, 32);
        if header_size < V2_FIXED_SIZE {
            return Err(Error::HeaderFieldOutOfBounds {
                field: "header_size",
                value: header_size as i64,
            });
        }

        let n_compact = (header_size - V2_FIXED_SIZE) as usize;
        if n_compact > MAX_COMPACT_FREQ_SIZE {
            return Err(Error::HeaderFieldOutOfBounds {
                field: "header_size",
                value: header_size as i64,
            });
        }

        let mut freqs = [0; ENCODE_SYMBOLS];
        if n_compact > 0 {
            let mut buf = [0u8; MAX_COMPACT_FREQ_SIZE];
            let compact = &mut buf[..n_compact];
            src.read_exact(compact)?;
            decode_compact_freqs(compact, &mut freqs)?;
        }

        let header = Self {
            n_raw_bytes,
            n_literals: field(v0, 0, 20),
            n_literal_payload_bytes: field(v0, 20, 20),
            n_matches: field(v0, 40, 20),
            literal_bits: field(v0, 60, 3) as i32 - 7,
            literal_states: [
                field(v1, 0, 10) as u16,
                field(v1, 10, 10) as u16,
                field(v1, 20, 10) as u16,
                field(v1, 30, 10) as u16,
            ],
            n_lmd_payload_bytes: field(v1, 40, 20),
            lmd_bits: field(v1, 60, 3) as i32 - 7,
            l_state: field(v2, 32, 10) as u16,
            m_state: field(v2, 42, 10) as u16,
            d_state: field(v2, 52, 10) as u16,
            freqs,
        };

        header.validate()?;
        Ok(header)
    }

    pub fn l_freq(&self) -> &[u16] {
        &self.freqs[L_FREQ]
    }

    pub fn m_freq(&self) -> &[u16] {
        &self.freqs[M_FREQ]
    }

    pub fn d_freq(&self) -> &[u16] {
        &self.freqs[D_FREQ]
    }

    pub fn literal_freq(&self) -> &[u16] {
        &self.freqs[LITERAL_FREQ]
    }

    fn validate(&self) -> Result<(), Error> {
        check_bound("n_literals", self.n_literals as usize, LITERALS_PER_BLOCK + 1)?;
        check_bound("n_matches", self.n_matches as usize, MATCHES_PER_BLOCK + 1)?;

        for state in self.literal_states {
            check_bound("literal_state", state as usize, LITERAL_STATES)?;
        }
        check_bound("l_state", self.l_state as usize, L_ALPHABET.n_states())?;
        check_bound("m_state", self.m_state as usize, M_ALPHABET.n_states())?;
        check_bound("d_state", self.d_state as usize, D_ALPHABET.n_states())?;

        for (field, bits) in [("literal_bits", self.literal_bits), ("lmd_bits", self.lmd_bits)]
        {
            if !BIT_OFFSET_RANGE.contains(&bits) {
                return Err(Error::HeaderFieldOutOfBounds {
                    field,
                    value: bits as i64,
                });
            }
        }

        lzfse_fse::check_frequencies(self.l_freq(), L_ALPHABET.n_states())?;
        lzfse_fse::check_frequencies(self.m_freq(), M_ALPHABET.n_states())?;
        lzfse_fse::check_frequencies(self.d_freq(), D_ALPHABET.n_states())?;
        lzfse_fse::check_frequencies(self.literal_freq(), LITERAL_STATES)?;

        Ok(())
    }
}

impl std::fmt::Debug for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Header")
            .field("n_raw_bytes", &self.n_raw_bytes)
            .field("n_literals", &self.n_literals)
            .field("n_matches", &self.n_matches)
            .field("n_literal_payload_bytes", &self.n_literal_payload_bytes)
            .field("n_lmd_payload_bytes", &self.n_lmd_payload_bytes)
            .field("literal_bits", &self.literal_bits)
            .field("literal_states", &self.literal_states)
            .field("lmd_bits", &self.lmd_bits)
            .field("l_state", &self.l_state)
            .field("m_state", &self.m_state)
            .field("d_state", &self.d_state)
            .finish_non_exhaustive()
    }
}

#[inline(always)]
fn field(v: u64, offset: u32, n_bits: u32) -> u32 {
    ((v >> offset) & ((1 << n_bits) - 1)) as u32
}

#[inline(always)]
fn check_bound(field: &'static str, value: usize, end: usize) -> Result<(), Error> {
    if value >= end {
        return Err(Error::HeaderFieldOutOfBounds {
            field,
            value: value as i64,
        });
    }

    Ok(())
}

/// Unpacks the variable length weights of a `bvx2` header. Every code is
/// identified by its low bits; the whole payload must be used, up to the
/// padding of the last byte.
fn decode_compact_freqs(src: &[u8], freqs: &mut [u16]) -> Result<(), Error> {
    let mut br = BitReader::new(src)?;

    for freq in freqs.iter_mut() {
        let bits = br.peek_padded(14) as u16;
        let n_bits = FREQ_NBITS_TABLE[(bits & 0x1F) as usize];
        if n_bits as usize > br.bits_remaining() {
            return Err(Error::MalformedFrequencyTable);
        }

        *freq = match n_bits {
            8 => 8 + ((bits >> 4) & 0xF),
            14 => 24 + ((bits >> 4) & 0x3FF),
            _ => FREQ_VALUE_TABLE[(bits & 0x1F) as usize],
        };

        br.consume(n_bits)?;
    }

    if br.bits_remaining() >= 8 {
        return Err(Error::MalformedFrequencyTable);
    }

    Ok(())
}
