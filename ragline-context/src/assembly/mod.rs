//! Context compressor (C10): ranked documents in, a character-budgeted
//! string out.

mod compressor;

pub use compressor::{compress_context, DEFAULT_MAX_CHARS};
