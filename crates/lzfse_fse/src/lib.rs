mod decode;
mod errors;

pub use decode::{
    Decoder, DecodingTable, Entry, ValueDecoder, ValueEntry, ValueTable,
    check_frequencies,
};
pub use errors::Error;
