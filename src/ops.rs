//! The tag operation engine: the command-driven layer that turns
//! `locate`+`ApeTag::parse`/`build`+`id3v1::tag` into the public
//! create/update/replace/delete/has/raw/getfields operations.
//!
//! Every operation reads the tail layout once and, if it mutates, issues
//! exactly one write followed by one truncate (see `rewrite_with_io`).
//! Callers that pass a path get a freshly opened-and-closed handle; callers
//! that pass a handle keep it open.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info};

use crate::ape::{ApeItem, ApeTag, ApeValue};
use crate::error::{Error, Result};
use crate::id3v1::{self, Id3Fields};
use crate::io_ext::Truncate;
use crate::tail::{self, TailLayout};
use crate::value::Value;

/// Whether an APE tag, an ID3v1 trailer, or both are present at the tail of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagPresence {
    pub ape: bool,
    pub id3: bool,
}

/// The raw bytes of a tag as they exist (or would exist) on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub ape: Vec<u8>,
    pub id3: Option<[u8; id3v1::TAG_SIZE]>,
}

/// A builder describing a create/update/replace mutation: items to add,
/// keys to remove, and whether a co-resident ID3v1.1 trailer should be
/// (re)written from the resulting APE fields.
///
/// Corresponds to the source library's keyword-argument `Context` for its
/// `modify*` callback family.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    add: Vec<ApeItem>,
    remove: Vec<String>,
    write_id3: bool,
    max_tag_size: Option<usize>,
}

impl UpdateRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(mut self, item: ApeItem) -> Self {
        self.add.push(item);
        self
    }

    pub fn remove_key(mut self, key: impl Into<String>) -> Self {
        self.remove.push(key.into());
        self
    }

    /// When set, a co-resident ID3v1.1 trailer is (re)generated from the
    /// resulting APE fields via the lossy APE-to-ID3 conversion. When unset,
    /// any existing ID3v1 trailer is carried through byte-for-byte.
    pub fn write_id3(mut self, yes: bool) -> Self {
        self.write_id3 = yes;
        self
    }

    /// Overrides the default 8192-byte tag size ceiling with a stricter one.
    pub fn max_tag_size(mut self, limit: usize) -> Self {
        self.max_tag_size = Some(limit);
        self
    }

    fn effective_max_tag_size(&self) -> usize {
        self.max_tag_size.unwrap_or(crate::ape::constants::MAX_TAG_SIZE)
    }
}

type Callback = fn(&ApeTag, &UpdateRequest) -> Result<ApeTag>;

/// `create`/`update`: items := (existing ∪ new) \ remove.
fn merge_callback(existing: &ApeTag, req: &UpdateRequest) -> Result<ApeTag> {
    let mut merged = existing.clone();
    for key in &req.remove {
        merged.remove(key);
    }
    for item in &req.add {
        merged.insert(item.clone());
    }
    Ok(merged)
}

/// `replace`: items := new, the existing tag is discarded entirely.
fn replace_callback(_existing: &ApeTag, req: &UpdateRequest) -> Result<ApeTag> {
    let mut replaced = ApeTag::new();
    for item in &req.add {
        replaced.insert(item.clone());
    }
    Ok(replaced)
}

/// The best-effort, lossy APE-to-ID3v1 field conversion (spec §4.4).
/// Unknown keys are discarded.
pub fn id3_from_ape(ape: &ApeTag) -> Id3Fields {
    let mut fields = Id3Fields {
        track: Some(0),
        ..Id3Fields::default()
    };

    for item in ape.items() {
        let lower = item.lower_key();
        let joined = match &item.value {
            ApeValue::Text(values) => values.join(", "),
            ApeValue::Binary(_) => continue,
        };

        if lower.starts_with("track") {
            // Whole-string integer parse, not a leading-digit-run scan: a
            // value like "3/12" discards to 0, matching the original's
            // `int(value)` conversion rather than accepting a prefix.
            let n: u32 = joined.trim().parse().unwrap_or(0);
            fields.track = Some(n.min(255) as u8);
        } else if lower == "date" {
            if let Some(year) = first_four_digit_run(&joined) {
                fields.year = year;
            }
        } else if lower == "genre" {
            if let Some(idx) = crate::id3v1::genre::index_for_name(&joined) {
                fields.genre = Some(idx);
            }
        } else if lower == "title" {
            fields.title = joined;
        } else if lower == "artist" {
            fields.artist = joined;
        } else if lower == "album" {
            fields.album = joined;
        } else if lower == "year" {
            fields.year = joined;
        } else if lower == "comment" {
            fields.comment = joined;
        }
    }

    fields
}

fn first_four_digit_run(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .windows(4)
        .find(|w| w.iter().all(|c| c.is_ascii_digit()))
        .map(|w| w.iter().collect())
}

fn id3_bytes_from_fields(fields: &Id3Fields) -> Result<[u8; id3v1::TAG_SIZE]> {
    let track = fields.track.map(|t| Value::Int(t as i64));
    let genre = fields.genre.map(|g| Value::Int(g as i64));
    id3v1::tag::build(
        &fields.title,
        &fields.artist,
        &fields.album,
        &fields.year,
        &fields.comment,
        track.as_ref(),
        genre.as_ref(),
    )
}

fn read_ape_region(io: &mut (impl Read + Seek), layout: &TailLayout) -> Result<Vec<u8>> {
    io.seek(SeekFrom::Start(layout.ape_start))?;
    let mut buf = vec![0u8; layout.ape_size as usize];
    io.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_id3_region(io: &mut (impl Read + Seek), layout: &TailLayout) -> Result<[u8; id3v1::TAG_SIZE]> {
    io.seek(SeekFrom::Start(layout.file_size - id3v1::TAG_SIZE as u64))?;
    let mut buf = [0u8; id3v1::TAG_SIZE];
    io.read_exact(&mut buf)?;
    Ok(buf)
}

/// Loads the existing APE tag, or an empty one if none is present.
fn existing_ape(io: &mut (impl Read + Seek), layout: &TailLayout) -> Result<ApeTag> {
    if layout.has_ape {
        let bytes = read_ape_region(io, layout)?;
        ApeTag::parse(&bytes)
    } else {
        Ok(ApeTag::new())
    }
}

/// Resolves the ID3v1 bytes to carry into a rewrite: regenerated from the
/// new APE fields when `write_id3` is set, preserved byte-for-byte when an
/// existing trailer is present and regeneration wasn't requested, or absent
/// otherwise.
fn resolve_id3(
    io: &mut (impl Read + Seek),
    layout: &TailLayout,
    new_ape: &ApeTag,
    req: &UpdateRequest,
) -> Result<Option<[u8; id3v1::TAG_SIZE]>> {
    if req.write_id3 {
        Ok(Some(id3_bytes_from_fields(&id3_from_ape(new_ape))?))
    } else if layout.has_id3 {
        Ok(Some(read_id3_region(io, layout)?))
    } else {
        Ok(None)
    }
}

/// The shared rewrite procedure: build, size-check, seek, write, truncate, flush.
fn rewrite_with_io(
    io: &mut (impl Read + Write + Seek + Truncate),
    layout: &TailLayout,
    new_ape: &ApeTag,
    new_id3: Option<[u8; id3v1::TAG_SIZE]>,
    max_tag_size: usize,
) -> Result<()> {
    let ape_bytes = new_ape.build()?;
    if ape_bytes.len() > max_tag_size {
        return Err(Error::TooLarge {
            actual: ape_bytes.len(),
            limit: max_tag_size,
        });
    }

    let start = layout.write_start();
    io.seek(SeekFrom::Start(start))?;
    io.write_all(&ape_bytes)?;
    if let Some(id3) = &new_id3 {
        io.write_all(id3)?;
    }
    let end = start + ape_bytes.len() as u64 + new_id3.map_or(0, |_| id3v1::TAG_SIZE as u64);
    debug!(
        "ops: wrote {} ape byte(s), id3={}, new length {end}",
        ape_bytes.len(),
        new_id3.is_some()
    );

    io.truncate_to(end)?;
    io.flush()?;
    Ok(())
}

fn open_rw(path: impl AsRef<Path>) -> Result<File> {
    Ok(OpenOptions::new().read(true).write(true).open(path)?)
}

// ---- has_tag ----

pub fn has_tag_with_io(io: &mut (impl Read + Seek)) -> Result<TagPresence> {
    let layout = tail::locate(io)?;
    Ok(TagPresence {
        ape: layout.has_ape,
        id3: layout.has_id3,
    })
}

pub fn has_tag(path: impl AsRef<Path>) -> Result<TagPresence> {
    let mut file = File::open(path)?;
    has_tag_with_io(&mut file)
}

// ---- get_fields ----

pub fn get_fields_with_io(io: &mut (impl Read + Seek)) -> Result<ApeTag> {
    let layout = tail::locate(io)?;
    if !layout.has_ape {
        return Err(Error::TagMissing { operation: "getfields" });
    }
    let bytes = read_ape_region(io, &layout)?;
    ApeTag::parse(&bytes)
}

pub fn get_fields(path: impl AsRef<Path>) -> Result<ApeTag> {
    let mut file = File::open(path)?;
    get_fields_with_io(&mut file)
}

// ---- get_raw_tag ----

pub fn get_raw_tag_with_io(io: &mut (impl Read + Seek)) -> Result<RawTag> {
    let layout = tail::locate(io)?;
    if !layout.has_ape {
        return Err(Error::TagMissing { operation: "getrawtag" });
    }
    let ape = read_ape_region(io, &layout)?;
    let id3 = if layout.has_id3 {
        Some(read_id3_region(io, &layout)?)
    } else {
        None
    };
    Ok(RawTag { ape, id3 })
}

pub fn get_raw_tag(path: impl AsRef<Path>) -> Result<RawTag> {
    let mut file = File::open(path)?;
    get_raw_tag_with_io(&mut file)
}

// ---- get_new_raw_tag ----

pub fn get_new_raw_tag_with_io(io: &mut (impl Read + Seek), req: &UpdateRequest) -> Result<RawTag> {
    let layout = tail::locate(io)?;
    let existing = existing_ape(io, &layout)?;
    let new_ape = merge_callback(&existing, req)?;
    let ape_bytes = new_ape.build()?;
    if ape_bytes.len() > req.effective_max_tag_size() {
        return Err(Error::TooLarge {
            actual: ape_bytes.len(),
            limit: req.effective_max_tag_size(),
        });
    }
    let id3 = resolve_id3(io, &layout, &new_ape, req)?;
    Ok(RawTag { ape: ape_bytes, id3 })
}

pub fn get_new_raw_tag(path: impl AsRef<Path>, req: &UpdateRequest) -> Result<RawTag> {
    let mut file = File::open(path)?;
    get_new_raw_tag_with_io(&mut file, req)
}

// ---- create_tag / update_tag / replace_tag ----

fn mutate_with_io(
    io: &mut (impl Read + Write + Seek + Truncate),
    req: &UpdateRequest,
    callback: Callback,
    require_existing: bool,
    operation: &'static str,
) -> Result<()> {
    let layout = tail::locate(io)?;
    if require_existing && !layout.has_ape {
        return Err(Error::TagMissing { operation });
    }
    let existing = existing_ape(io, &layout)?;
    let new_ape = callback(&existing, req)?;
    let new_id3 = resolve_id3(io, &layout, &new_ape, req)?;
    rewrite_with_io(io, &layout, &new_ape, new_id3, req.effective_max_tag_size())
}

pub fn create_tag_with_io(io: &mut (impl Read + Write + Seek + Truncate), req: &UpdateRequest) -> Result<()> {
    mutate_with_io(io, req, merge_callback, false, "create")
}

pub fn create_tag(path: impl AsRef<Path>, req: &UpdateRequest) -> Result<()> {
    let mut file = open_rw(path)?;
    mutate_with_io(&mut file, req, merge_callback, false, "create")
}

pub fn update_tag_with_io(io: &mut (impl Read + Write + Seek + Truncate), req: &UpdateRequest) -> Result<()> {
    mutate_with_io(io, req, merge_callback, true, "update")
}

pub fn update_tag(path: impl AsRef<Path>, req: &UpdateRequest) -> Result<()> {
    let mut file = open_rw(path)?;
    mutate_with_io(&mut file, req, merge_callback, true, "update")
}

pub fn replace_tag_with_io(io: &mut (impl Read + Write + Seek + Truncate), req: &UpdateRequest) -> Result<()> {
    mutate_with_io(io, req, replace_callback, false, "replace")
}

pub fn replace_tag(path: impl AsRef<Path>, req: &UpdateRequest) -> Result<()> {
    let mut file = open_rw(path)?;
    mutate_with_io(&mut file, req, replace_callback, false, "replace")
}

// ---- delete_tag ----

pub fn delete_tag_with_io(io: &mut (impl Read + Write + Seek + Truncate)) -> Result<()> {
    let layout = tail::locate(io)?;
    if !layout.has_ape && !layout.has_id3 {
        return Ok(());
    }
    let new_end = if layout.has_ape {
        layout.ape_start
    } else {
        layout.file_size - id3v1::TAG_SIZE as u64
    };
    io.truncate_to(new_end)?;
    io.flush()?;
    info!("ops: deleted tail tag(s), new length {new_end}");
    Ok(())
}

pub fn delete_tag(path: impl AsRef<Path>) -> Result<()> {
    let mut file = open_rw(path)?;
    delete_tag_with_io(&mut file)
}
