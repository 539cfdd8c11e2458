pub use lzfse_foundation::*;

pub use crate::errors::*;
