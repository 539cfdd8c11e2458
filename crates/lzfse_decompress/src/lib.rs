use lzfse_foundation::const_assert;

mod block;
mod context;
mod decoder;
mod errors;
mod literals;
mod lmd;
mod lzfse_header;
mod lzvn;
mod prelude;
mod window;

pub use decoder::{Decoder, decode};
pub use errors::Error;

/// `bvx$`: end of stream.
pub const ENDOFSTREAM_BLOCK_MAGIC: u32 = 0x2478_7662;
/// `bvx-`: raw bytes.
pub const UNCOMPRESSED_BLOCK_MAGIC: u32 = 0x2D78_7662;
/// `bvx1`: LZFSE with an expanded header.
pub const COMPRESSEDV1_BLOCK_MAGIC: u32 = 0x3178_7662;
/// `bvx2`: LZFSE with a packed header.
pub const COMPRESSEDV2_BLOCK_MAGIC: u32 = 0x3278_7662;
/// `bvxn`: LZVN.
pub const COMPRESSEDLZVN_BLOCK_MAGIC: u32 = 0x6E78_7662;

pub const MATCHES_PER_BLOCK: usize = 10_000;
pub const LITERALS_PER_BLOCK: usize = 4 * MATCHES_PER_BLOCK;

pub const LITERAL_SYMBOLS: usize = 256;
pub const LITERAL_STATES: usize = 1024;
const_assert!(LITERAL_STATES.is_power_of_two());

/// Ring buffer size, as a power of two. The largest distance an LZFSE block
/// can express is 229_372 + 2^15 - 1, below 2^18.
pub const DEFAULT_WINDOW_LOG: u8 = 18;
pub const WINDOW_LOG_RANGE: std::ops::RangeInclusive<u8> = 16..=30;
const_assert!((D_ALPHABET.max_value() as usize) < 1 << DEFAULT_WINDOW_LOG);
const_assert!(u16::MAX as usize <= 1 << *WINDOW_LOG_RANGE.start());

pub const L_ALPHABET: ValueAlphabet = ValueAlphabet {
    n_states: 64,
    v_bits: &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 3, 5, 8],
    v_base: &[
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 20, 28, 60,
    ],
};
const_assert!(L_ALPHABET.n_symbols() == 20);
const_assert!(L_ALPHABET.v_base.len() == 20);

pub const M_ALPHABET: ValueAlphabet = ValueAlphabet {
    n_states: 64,
    v_bits: &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 5, 8, 11],
    v_base: &[
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 24, 56, 312,
    ],
};
const_assert!(M_ALPHABET.n_symbols() == 20);
const_assert!(M_ALPHABET.v_base.len() == 20);

pub const D_ALPHABET: ValueAlphabet = ValueAlphabet {
    n_states: 256,
    v_bits: &[
        0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 6, 6,
        6, 6, 7, 7, 7, 7, 8, 8, 8, 8, 9, 9, 9, 9, 10, 10, 10, 10, 11, 11, 11, 11, 12,
        12, 12, 12, 13, 13, 13, 13, 14, 14, 14, 14, 15, 15, 15, 15,
    ],
    v_base: &[
        0, 1, 2, 3, 4, 6, 8, 10, 12, 16, 20, 24, 28, 36, 44, 52, 60, 76, 92, 108, 124,
        156, 188, 220, 252, 316, 380, 444, 508, 636, 764, 892, 1020, 1276, 1532, 1788,
        2044, 2556, 3068, 3580, 4092, 5116, 6140, 7164, 8188, 10236, 12284, 14332,
        16380, 20476, 24572, 28668, 32764, 40956, 49148, 57340, 65532, 81916, 98300,
        114684, 131068, 163836, 196604, 229372,
    ],
};
const_assert!(D_ALPHABET.n_symbols() == 64);
const_assert!(D_ALPHABET.v_base.len() == 64);

/// Symbols across the four frequency tables of an LZFSE header.
pub const ENCODE_SYMBOLS: usize = L_ALPHABET.n_symbols()
    + M_ALPHABET.n_symbols()
    + D_ALPHABET.n_symbols()
    + LITERAL_SYMBOLS;
const_assert!(ENCODE_SYMBOLS == 360);

/// A value-coded alphabet: symbol `s` stands for `v_base[s]` plus
/// `v_bits[s]` raw bits.
pub struct ValueAlphabet {
    n_states: usize,
    v_bits: &'static [u8],
    v_base: &'static [u32],
}

impl ValueAlphabet {
    pub const fn n_states(&self) -> usize {
        self.n_states
    }

    pub const fn n_symbols(&self) -> usize {
        self.v_bits.len()
    }

    pub const fn v_bits(&self) -> &'static [u8] {
        self.v_bits
    }

    pub const fn v_base(&self) -> &'static [u32] {
        self.v_base
    }

    /// Largest value the alphabet can express.
    pub const fn max_value(&self) -> u32 {
        let last = self.v_bits.len() - 1;
        self.v_base[last] + (1 << self.v_bits[last]) - 1
    }
}
