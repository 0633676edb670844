//! ID3v1.1 trailer parsing/building, including the v1.0 track-byte
//! heuristic and genre table edge cases.

use crate::id3v1::genre;
use crate::id3v1::tag::{build, parse, TAG_SIZE};
use crate::value::Value;

#[test]
fn full_trailer_round_trips() {
    let bytes = build(
        "Love Cheese",
        "Test Artist",
        "Test Album",
        "2007",
        "a comment under 28",
        Some(&Value::Int(1)),
        Some(&Value::Text("Rock".into())),
    )
    .unwrap();
    assert_eq!(bytes.len(), TAG_SIZE);

    let fields = parse(&bytes).unwrap();
    assert_eq!(fields.title, "Love Cheese");
    assert_eq!(fields.artist, "Test Artist");
    assert_eq!(fields.album, "Test Album");
    assert_eq!(fields.year, "2007");
    assert_eq!(fields.track, Some(1));
    assert_eq!(fields.genre_name(), Some("Rock"));
}

#[test]
fn out_of_range_genre_byte_has_no_name() {
    let mut bytes = build("T", "A", "Al", "2000", "c", None, None).unwrap();
    bytes[127] = 250;
    let fields = parse(&bytes).unwrap();
    assert_eq!(fields.genre_name(), None);
}

#[test]
fn genre_integer_outside_range_saturates_to_undefined() {
    let bytes = build("T", "A", "Al", "2000", "c", None, Some(&Value::Int(9000))).unwrap();
    assert_eq!(bytes[127], 0xFF);
}

#[test]
fn track_given_as_numeric_text_is_accepted() {
    let bytes = build("T", "A", "Al", "2000", "c", Some(&Value::Text("42".into())), None).unwrap();
    let fields = parse(&bytes).unwrap();
    assert_eq!(fields.track, Some(42));
}

#[test]
fn all_genre_names_are_case_insensitively_invertible() {
    for i in 0..148u8 {
        let name = genre::name_for_index(i).unwrap();
        assert_eq!(genre::index_for_name(&name.to_uppercase()), Some(i));
    }
}

#[test]
fn comment_field_width_is_28_not_30() {
    // ID3v1.1 shrinks the comment field to make room for the track marker
    // and track byte, unlike plain ID3v1's 30-byte comment.
    let bytes = build("T", "A", "Al", "2000", &"c".repeat(40), None, None).unwrap();
    let fields = parse(&bytes).unwrap();
    assert_eq!(fields.comment.len(), 28);
}
