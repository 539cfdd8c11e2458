#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] lzfse_io::Error),

    #[error("Frequency sum {sum} exceeds the {n_states} available states")]
    #[diagnostic(
        code(lzfse::fse::frequency_overflow),
        help("The block header's frequency table is corrupt.")
    )]
    FrequencyOverflow { sum: u32, n_states: usize },

    #[error("Table overflow while spreading symbol {0}")]
    #[diagnostic(code(lzfse::fse::table_overflow))]
    TableOverflow(usize),

    #[error("Too many symbols. Expected at most {max}, got {got}")]
    #[diagnostic(code(lzfse::fse::too_many_symbols))]
    TooManySymbols { got: usize, max: usize },

    #[error("Invalid state {state} for a table of {n_states} states")]
    #[diagnostic(
        code(lzfse::fse::invalid_state),
        help("The block header's initial decoder state is out of range.")
    )]
    InvalidState { state: u16, n_states: usize },
}
