//! apetag - read, write, update, and delete APEv2 tags with optional
//! co-resident ID3v1.1 trailers at the tail of a file.
//!
//! The crate is organized bottom-up:
//!
//! - [`tail`] classifies the last bytes of a file into one of three layouts.
//! - [`ape`] is the APEv2 container codec: parse bytes into items, build
//!   items back into the canonical on-disk form.
//! - [`id3v1`] is the fixed 128-byte ID3v1.1 trailer codec and genre table.
//! - [`ops`] drives the create/update/replace/delete/has/raw/getfields
//!   commands and performs the tail rewrite.

pub mod ape;
pub mod error;
pub mod id3v1;
mod io_ext;
pub mod ops;
pub mod tail;
pub mod util;
pub mod value;

pub use error::{Error, Result};
pub use ops::{
    create_tag, create_tag_with_io, delete_tag, delete_tag_with_io, get_fields,
    get_fields_with_io, get_new_raw_tag, get_new_raw_tag_with_io, get_raw_tag,
    get_raw_tag_with_io, has_tag, has_tag_with_io, id3_from_ape, replace_tag,
    replace_tag_with_io, update_tag, update_tag_with_io, RawTag, TagPresence, UpdateRequest,
};
pub use tail::{locate, locate_path, TailLayout};
pub use value::Value;

#[cfg(test)]
mod tests;
