mod bit_reader;
mod reader;
mod reverse_bit_reader;

pub use bit_reader::BitReader;
pub use reader::*;
pub use reverse_bit_reader::{BIT_OFFSET_RANGE, ReverseBitReader};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error("Stream is empty")]
    #[diagnostic(
        code(lzfse::io::empty_stream),
        help("The input stream ended unexpectedly. Verify the input data is complete.")
    )]
    EmptyStream,

    #[error(
        "Not enough bits in stream. Requested: {requested:?}, Remaining: {remaining:?}"
    )]
    #[diagnostic(
        code(lzfse::io::not_enough_bits),
        help("Attempted to read more bits than are available in the stream.")
    )]
    NotEnoughBits { requested: usize, remaining: usize },

    #[error("Bit stream underflow. Requested: {requested} bytes, available: {available}")]
    #[diagnostic(
        code(lzfse::io::underflow),
        help("The payload is shorter than its bit stream claims.")
    )]
    Underflow { requested: usize, available: usize },

    #[error("Bit offset {0} is outside of -7..=0")]
    #[diagnostic(code(lzfse::io::invalid_bit_offset))]
    InvalidBitOffset(i32),

    #[error("Bit stream has set bits above its declared length")]
    #[diagnostic(
        code(lzfse::io::dirty_padding),
        help("The block header's bit offset does not match its payload.")
    )]
    DirtyPadding,

    #[error(transparent)]
    #[diagnostic(code(lzfse::io::io_error))]
    IO(#[from] std::io::Error),
}

/// Loads up to 8 bytes as a little-endian integer, zero-extended.
#[inline(always)]
pub(crate) fn load_le(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);

    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
