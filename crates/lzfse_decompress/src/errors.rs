#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error("Input ended before the end-of-stream block")]
    #[diagnostic(
        code(lzfse::decompress::truncated),
        help("The input stream ended unexpectedly. Verify the input data is complete.")
    )]
    Truncated,

    #[error("Unrecognized block magic 0x{0:08x}")]
    #[diagnostic(
        code(lzfse::decompress::unknown_block),
        help("The input is not an LZFSE stream, or it is corrupt.")
    )]
    UnknownBlockMagic(u32),

    #[error("Header field {field} is out of bounds: {value}")]
    #[diagnostic(code(lzfse::decompress::header_field))]
    HeaderFieldOutOfBounds { field: &'static str, value: i64 },

    #[error("Malformed compact frequency table")]
    #[diagnostic(code(lzfse::decompress::malformed_frequencies))]
    MalformedFrequencyTable,

    #[error("Invalid back-reference distance {distance} after {total} bytes")]
    #[diagnostic(
        code(lzfse::decompress::invalid_back_reference),
        help("A match points before the start of the stream.")
    )]
    InvalidBackReference { distance: usize, total: u64 },

    #[error("Back-reference distance {distance} exceeds the {window} byte window")]
    #[diagnostic(
        code(lzfse::decompress::distance_beyond_window),
        help("Decode with a larger window log.")
    )]
    DistanceBeyondWindow { distance: usize, window: usize },

    #[error("Reserved LZVN opcode 0x{0:02x}")]
    #[diagnostic(code(lzfse::decompress::reserved_opcode))]
    ReservedOpcode(u8),

    #[error("Match reuses the previous distance, but none was set")]
    #[diagnostic(code(lzfse::decompress::missing_previous_distance))]
    MissingPreviousDistance,

    #[error("Literal run of {len} bytes at {idx} overruns the decoded literals")]
    #[diagnostic(code(lzfse::decompress::literals_overread))]
    LiteralsOverread { idx: usize, len: usize },

    #[error("Block declared {expected} raw bytes, but produced {actual}")]
    #[diagnostic(code(lzfse::decompress::raw_size_mismatch))]
    RawSizeMismatch { expected: u64, actual: u64 },

    #[error("Window log {0} is out of bounds")]
    #[diagnostic(code(lzfse::decompress::window_log))]
    WindowLogOutOfBounds(u8),

    #[error(transparent)]
    #[diagnostic(transparent)]
    IO(#[from] lzfse_io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    FSE(#[from] lzfse_fse::Error),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        match value.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::Truncated,
            _ => Self::IO(lzfse_io::Error::IO(value)),
        }
    }
}
