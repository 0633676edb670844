//! Error types for the apetag library.

use std::io;
use std::str::Utf8Error;
use thiserror::Error;

/// Result type for the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way a tag read, write, or validation can fail.
///
/// Parse errors carry byte offsets; size errors carry byte counts, per the
/// source specification's requirement that messages be locatable.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O failure (open, seek, read, write, truncate).
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// A utf8/external item value, or an ID3v1 text field, was not valid UTF-8.
    #[error("invalid UTF-8 in item {key:?} value: {source}")]
    InvalidUtf8 {
        key: String,
        #[source]
        source: Utf8Error,
    },

    /// Item key failed the length, alphabet, or forbidden-name rule.
    #[error("invalid item key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Item flags field had reserved bits set.
    #[error("invalid item flags 0x{flags:08x} for item at offset {offset}")]
    InvalidItemFlags { offset: u64, flags: u32 },

    /// Footer flags field failed the byte-20 or byte-23 check.
    #[error("invalid footer flags: byte20=0x{byte20:02x} byte23=0x{byte23:02x}")]
    InvalidFooterFlags { byte20: u8, byte23: u8 },

    /// The APE preamble was missing, or the header/footer preambles disagreed.
    #[error("missing or mismatched APE header/footer preamble at offset {offset}")]
    MissingHeader { offset: u64 },

    /// Header size disagreed with footer size, or the declared size exceeds the region.
    #[error("tag size mismatch: declared {declared} bytes, region holds {region} bytes")]
    SizeMismatch { declared: u64, region: u64 },

    /// Serialized tag (or a single item) exceeds the configured size limit.
    #[error("tag too large: {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { actual: usize, limit: usize },

    /// Item count exceeds what the declared tag size can hold.
    #[error("too many items: {actual} exceeds the limit of {limit} for this tag size")]
    TooManyItems { actual: usize, limit: usize },

    /// Two items mapped to the same lowercased key.
    #[error("duplicate item key {key:?}")]
    DuplicateKey { key: String },

    /// Bytes remained after the declared item count was consumed.
    #[error("{count} trailing byte(s) after the last item")]
    TrailingBytes { count: u64 },

    /// An operation that requires an existing tag found none.
    #[error("no tag present to {operation}")]
    TagMissing { operation: &'static str },

    /// Caller-supplied data was structurally invalid for the operation
    /// (non-integer track, unknown genre name, empty item set on replace, ...).
    #[error("bad argument: {0}")]
    BadArgument(String),
}
