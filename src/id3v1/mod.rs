//! ID3v1.1 codec: the fixed 128-byte trailer and its genre table.

pub mod genre;
pub mod tag;

pub use tag::{Id3Fields, TAG_SIZE};
