//! A small extension trait letting the tag operation engine truncate
//! whatever seekable sink the caller handed it, without hard-coding
//! `std::fs::File` into every function signature in `crate::ops`.

use std::io;

/// Shrinks (or, in principle, grows) the sink to exactly `len` bytes.
///
/// `Read + Write + Seek` has no truncation primitive of its own — `set_len`
/// is a `File`-specific operation. This trait is the seam that lets
/// `crate::ops`'s `_with_io` entry points stay generic while still
/// supporting the one-write-then-one-truncate rewrite the engine requires.
pub trait Truncate {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for std::fs::File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl Truncate for io::Cursor<Vec<u8>> {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.get_mut().truncate(len as usize);
        Ok(())
    }
}
