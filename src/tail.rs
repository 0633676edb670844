//! Tail-of-file layout detection.
//!
//! A file ends in one of three shapes: nothing recognizable, a bare 128-byte
//! ID3v1 trailer, or an APEv2 tag (optionally followed by an ID3v1 trailer).
//! `locate` classifies which one a file has without parsing the APE item
//! stream itself — that's `crate::ape::tag::parse`'s job.

use std::io::{Read, Seek, SeekFrom};

use log::{debug, trace};

use crate::error::Result;
use crate::util::read_u32_le;

const ID3V1_SIZE: u64 = 128;
const ID3V1_IDENTIFIER: &[u8; 3] = b"TAG";
const APE_FOOTER_SIZE: u64 = 32;
const APE_PREAMBLE: &[u8; 12] = &[
    b'A', b'P', b'E', b'T', b'A', b'G', b'E', b'X', 0xD0, 0x07, 0x00, 0x00,
];

/// The tail-of-file classification produced by `locate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailLayout {
    pub file_size: u64,
    pub has_id3: bool,
    pub has_ape: bool,
    /// Start of the APE region (header if present, else first item byte).
    /// Meaningless when `has_ape` is false.
    pub ape_start: u64,
    /// Total APE region size, footer included. Meaningless when `has_ape` is false.
    pub ape_size: u32,
}

impl TailLayout {
    /// A layout describing a file with neither tag.
    pub fn empty(file_size: u64) -> Self {
        Self {
            file_size,
            has_id3: false,
            has_ape: false,
            ape_start: 0,
            ape_size: 0,
        }
    }

    /// Where a rewrite should start writing the new tail.
    ///
    /// `ape_start` is only meaningful when `has_ape` is set; when no APE tag
    /// is present, the new tail instead belongs right before the existing
    /// ID3v1 trailer (if any), or at end-of-file otherwise.
    pub fn write_start(&self) -> u64 {
        if self.has_ape {
            self.ape_start
        } else if self.has_id3 {
            self.file_size - ID3V1_SIZE
        } else {
            self.file_size
        }
    }
}

/// Classifies the tail of `source` per the three recognized layouts.
///
/// Never fails on a malformed or absent tag: an unrecognized footer simply
/// yields `has_ape = false`. Structural validation of a recognized APE
/// region happens later, in `crate::ape::tag::parse`.
pub fn locate(source: &mut (impl Read + Seek)) -> Result<TailLayout> {
    let file_size = source.seek(SeekFrom::End(0))?;

    if file_size < APE_FOOTER_SIZE {
        trace!("tail: file too small ({file_size} bytes) for any tag");
        return Ok(TailLayout::empty(file_size));
    }

    let mut has_id3 = false;
    let mut id3_len = 0u64;

    if file_size >= ID3V1_SIZE {
        source.seek(SeekFrom::End(-(ID3V1_SIZE as i64)))?;
        let mut head = [0u8; 3];
        source.read_exact(&mut head)?;
        if &head == ID3V1_IDENTIFIER {
            has_id3 = true;
            id3_len = ID3V1_SIZE;
        }
    }

    if file_size < APE_FOOTER_SIZE + id3_len {
        debug!("tail: id3={has_id3}, no room left for an APE footer");
        return Ok(TailLayout {
            file_size,
            has_id3,
            has_ape: false,
            ape_start: 0,
            ape_size: 0,
        });
    }

    source.seek(SeekFrom::End(-((APE_FOOTER_SIZE + id3_len) as i64)))?;
    let mut footer = [0u8; APE_FOOTER_SIZE as usize];
    source.read_exact(&mut footer)?;

    if &footer[0..12] != APE_PREAMBLE {
        debug!("tail: id3={has_id3}, no APE preamble at the expected offset");
        return Ok(TailLayout {
            file_size,
            has_id3,
            has_ape: false,
            ape_start: 0,
            ape_size: 0,
        });
    }

    let declared_size = read_u32_le(&footer, 12) as u64;
    let ape_size = declared_size + APE_FOOTER_SIZE;
    let ape_start = file_size.saturating_sub(id3_len).saturating_sub(ape_size);

    debug!("tail: id3={has_id3}, ape region [{ape_start}, {ape_size} bytes)");

    Ok(TailLayout {
        file_size,
        has_id3,
        has_ape: true,
        ape_start,
        ape_size: ape_size as u32,
    })
}

/// `locate` against a path, opening and closing the file for this call only.
pub fn locate_path(path: impl AsRef<std::path::Path>) -> Result<TailLayout> {
    let mut file = std::fs::File::open(path)?;
    locate(&mut file)
}
