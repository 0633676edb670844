//! The fixed 128-byte ID3v1.1 trailer: seven named fields packed at known
//! offsets, plus the track/genre discriminator the ".1" revision added.

use crate::error::Error;
use crate::id3v1::genre;
use crate::util::{pad_field, trim_trailing_nuls};
use crate::value::Value;

pub const TAG_SIZE: usize = 128;
pub const IDENTIFIER: &[u8; 3] = b"TAG";

const TITLE_OFFSET: usize = 3;
const TITLE_SIZE: usize = 30;
const ARTIST_OFFSET: usize = 33;
const ARTIST_SIZE: usize = 30;
const ALBUM_OFFSET: usize = 63;
const ALBUM_SIZE: usize = 30;
const YEAR_OFFSET: usize = 93;
const YEAR_SIZE: usize = 4;
const COMMENT_OFFSET: usize = 97;
const COMMENT_SIZE: usize = 28;
const TRACK_MARKER_OFFSET: usize = 125;
const TRACK_OFFSET: usize = 126;
const GENRE_OFFSET: usize = 127;

/// The parsed contents of an ID3v1(.1) trailer.
///
/// `track` is `None` for an ID3v1.0 trailer (byte 125 was non-zero, the
/// "no track byte present" heuristic) and `Some(n)` for ID3v1.1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Id3Fields {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: Option<u8>,
    pub genre: Option<u8>,
}

impl Id3Fields {
    /// The genre name, if the stored index falls inside the genre table.
    pub fn genre_name(&self) -> Option<&'static str> {
        self.genre.and_then(genre::name_for_index)
    }
}

/// Parses a 128-byte ID3v1 region (the caller has already confirmed it
/// begins with the `TAG` identifier, per `crate::tail::locate`).
pub fn parse(bytes: &[u8; TAG_SIZE]) -> Result<Id3Fields, Error> {
    if &bytes[0..3] != IDENTIFIER {
        return Err(Error::MissingHeader { offset: 0 });
    }

    let title = decode_field(bytes, TITLE_OFFSET, TITLE_SIZE)?;
    let artist = decode_field(bytes, ARTIST_OFFSET, ARTIST_SIZE)?;
    let album = decode_field(bytes, ALBUM_OFFSET, ALBUM_SIZE)?;
    let year = decode_field(bytes, YEAR_OFFSET, YEAR_SIZE)?;
    let comment = decode_field(bytes, COMMENT_OFFSET, COMMENT_SIZE)?;

    let track = if bytes[TRACK_MARKER_OFFSET] == 0x00 {
        Some(bytes[TRACK_OFFSET])
    } else {
        None
    };

    let genre_byte = bytes[GENRE_OFFSET];
    let genre = genre::name_for_index(genre_byte).map(|_| genre_byte);

    Ok(Id3Fields {
        title,
        artist,
        album,
        year,
        comment,
        track,
        genre,
    })
}

fn decode_field(bytes: &[u8], offset: usize, size: usize) -> Result<String, Error> {
    let trimmed = trim_trailing_nuls(&bytes[offset..offset + size]);
    std::str::from_utf8(trimmed)
        .map(str::to_string)
        .map_err(|source| Error::InvalidUtf8 {
            key: format!("id3v1 field at offset {offset}"),
            source,
        })
}

/// Builds a 128-byte ID3v1.1 trailer from caller-supplied fields.
///
/// `track` and `genre` accept either representation via `Value`: an integer
/// directly, or text that gets parsed (track) or looked up in the genre
/// table (genre). An empty genre string yields the "undefined" byte 0xFF, a
/// non-empty unrecognized name is an error, and a non-integer track is an
/// error — this crate does not guess past that behavior.
pub fn build(
    title: &str,
    artist: &str,
    album: &str,
    year: &str,
    comment: &str,
    track: Option<&Value>,
    genre: Option<&Value>,
) -> Result<[u8; TAG_SIZE], Error> {
    let mut out = [0u8; TAG_SIZE];
    out[0..3].copy_from_slice(IDENTIFIER);
    out[TITLE_OFFSET..TITLE_OFFSET + TITLE_SIZE].copy_from_slice(&pad_field(title.as_bytes(), TITLE_SIZE));
    out[ARTIST_OFFSET..ARTIST_OFFSET + ARTIST_SIZE].copy_from_slice(&pad_field(artist.as_bytes(), ARTIST_SIZE));
    out[ALBUM_OFFSET..ALBUM_OFFSET + ALBUM_SIZE].copy_from_slice(&pad_field(album.as_bytes(), ALBUM_SIZE));
    out[YEAR_OFFSET..YEAR_OFFSET + YEAR_SIZE].copy_from_slice(&pad_field(year.as_bytes(), YEAR_SIZE));
    out[COMMENT_OFFSET..COMMENT_OFFSET + COMMENT_SIZE].copy_from_slice(&pad_field(comment.as_bytes(), COMMENT_SIZE));

    out[TRACK_MARKER_OFFSET] = 0x00;
    out[TRACK_OFFSET] = encode_track(track)?;
    out[GENRE_OFFSET] = encode_genre(genre)?;

    Ok(out)
}

fn encode_track(track: Option<&Value>) -> Result<u8, Error> {
    match track {
        None => Ok(0),
        Some(value) => {
            let n = value.as_int().ok_or_else(|| Error::BadArgument(format!(
                "track {value:?} is not an integer"
            )))?;
            if !(0..=255).contains(&n) {
                return Err(Error::BadArgument(format!("track {n} outside 0..=255")));
            }
            Ok(n as u8)
        }
    }
}

fn encode_genre(genre: Option<&Value>) -> Result<u8, Error> {
    match genre {
        None => Ok(0xFF),
        Some(Value::Int(n)) => {
            if (0..=255).contains(n) {
                Ok(*n as u8)
            } else {
                Ok(0xFF)
            }
        }
        Some(Value::Text(name)) => {
            if name.is_empty() {
                Ok(0xFF)
            } else {
                genre::index_for_name(name).ok_or_else(|| {
                    Error::BadArgument(format!("unknown genre name {name:?}"))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_of_build_round_trips_text_fields() {
        let bytes = build(
            "Love Cheese",
            "Test Artist",
            "Test Album",
            "2007",
            "a comment",
            Some(&Value::Int(3)),
            Some(&Value::Text("Rock".into())),
        )
        .unwrap();
        let fields = parse(&bytes).unwrap();
        assert_eq!(fields.title, "Love Cheese");
        assert_eq!(fields.artist, "Test Artist");
        assert_eq!(fields.track, Some(3));
        assert_eq!(fields.genre_name(), Some("Rock"));
    }

    #[test]
    fn missing_track_marker_is_treated_as_v1_0() {
        let mut bytes = build("T", "A", "Al", "2000", "c", Some(&Value::Int(1)), None).unwrap();
        bytes[TRACK_MARKER_OFFSET] = 0xFF;
        let fields = parse(&bytes).unwrap();
        assert_eq!(fields.track, None);
    }

    #[test]
    fn empty_genre_string_yields_undefined_byte() {
        let bytes = build("T", "A", "Al", "2000", "c", None, Some(&Value::Text(String::new()))).unwrap();
        assert_eq!(bytes[GENRE_OFFSET], 0xFF);
    }

    #[test]
    fn unknown_genre_name_is_an_error() {
        let err = build("T", "A", "Al", "2000", "c", None, Some(&Value::Text("Not A Genre".into())));
        assert!(matches!(err, Err(Error::BadArgument(_))));
    }

    #[test]
    fn non_integer_track_is_an_error() {
        let err = build("T", "A", "Al", "2000", "c", Some(&Value::Text("abc".into())), None);
        assert!(matches!(err, Err(Error::BadArgument(_))));
    }

    #[test]
    fn text_fields_truncate_and_trailing_nuls_strip_on_read() {
        let long = "x".repeat(50);
        let bytes = build(&long, "A", "Al", "2000", "c", None, None).unwrap();
        let fields = parse(&bytes).unwrap();
        assert_eq!(fields.title.len(), TITLE_SIZE);
    }
}
