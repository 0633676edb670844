//! The fixed 148-entry ID3v1 genre table: index-to-name for reading, and a
//! case-insensitive name-to-index map for writing.

// Array of genre names, ordered by their ID3v1 index.
pub static GENRE_TABLE: [&str; 148] = [
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R & B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Prank",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz + Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "Alternative Rock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Fol",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native US",
    "Cabaret",
    "New Wave",
    "Psychadelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
    "Folk",
    "Folk-Rock",
    "National Folk",
    "Swing",
    "Fast Fusion",
    "Bebop",
    "Latin",
    "Revival",
    "Celtic",
    "Bluegrass",
    "Avantgarde",
    "Gothic Rock",
    "Progressive Rock",
    "Psychedelic Rock",
    "Symphonic Rock",
    "Slow Rock",
    "Big Band",
    "Chorus",
    "Easy Listening",
    "Acoustic",
    "Humour",
    "Speech",
    "Chanson",
    "Opera",
    "Chamber Music",
    "Sonata",
    "Symphony",
    "Booty Bass",
    "Primus",
    "Porn Groove",
    "Satire",
    "Slow Jam",
    "Club",
    "Tango",
    "Samba",
    "Folklore",
    "Ballad",
    "Power Ballad",
    "Rhytmic Soul",
    "Freestyle",
    "Duet",
    "Punk Rock",
    "Drum Solo",
    "Acapella",
    "Euro-House",
    "Dance Hall",
    "Goa",
    "Drum & Bass",
    "Club-House",
    "Hardcore",
    "Terror",
    "Indie",
    "BritPop",
    "Negerpunk",
    "Polsk Punk",
    "Beat",
    "Christian Gangsta Rap",
    "Heavy Metal",
    "Black Metal",
    "Crossover",
    "Contemporary Christian",
    "Christian Rock",
    "Merengue",
    "Salsa",
    "Trash Meta",
    "Anime",
    "Jpop",
    "Synthpop",
];

static GENRE_LOOKUP: phf::Map<&'static str, u8> = phf::phf_map! {
    "blues" => 0,
    "classic rock" => 1,
    "country" => 2,
    "dance" => 3,
    "disco" => 4,
    "funk" => 5,
    "grunge" => 6,
    "hip-hop" => 7,
    "jazz" => 8,
    "metal" => 9,
    "new age" => 10,
    "oldies" => 11,
    "other" => 12,
    "pop" => 13,
    "r & b" => 14,
    "rap" => 15,
    "reggae" => 16,
    "rock" => 17,
    "techno" => 18,
    "industrial" => 19,
    "alternative" => 20,
    "ska" => 21,
    "death metal" => 22,
    "prank" => 23,
    "soundtrack" => 24,
    "euro-techno" => 25,
    "ambient" => 26,
    "trip-hop" => 27,
    "vocal" => 28,
    "jazz + funk" => 29,
    "fusion" => 30,
    "trance" => 31,
    "classical" => 32,
    "instrumental" => 33,
    "acid" => 34,
    "house" => 35,
    "game" => 36,
    "sound clip" => 37,
    "gospel" => 38,
    "noise" => 39,
    "alternative rock" => 40,
    "bass" => 41,
    "soul" => 42,
    "punk" => 43,
    "space" => 44,
    "meditative" => 45,
    "instrumental pop" => 46,
    "instrumental rock" => 47,
    "ethnic" => 48,
    "gothic" => 49,
    "darkwave" => 50,
    "techno-industrial" => 51,
    "electronic" => 52,
    "pop-fol" => 53,
    "eurodance" => 54,
    "dream" => 55,
    "southern rock" => 56,
    "comedy" => 57,
    "cult" => 58,
    "gangsta" => 59,
    "top 40" => 60,
    "christian rap" => 61,
    "pop/funk" => 62,
    "jungle" => 63,
    "native us" => 64,
    "cabaret" => 65,
    "new wave" => 66,
    "psychadelic" => 67,
    "rave" => 68,
    "showtunes" => 69,
    "trailer" => 70,
    "lo-fi" => 71,
    "tribal" => 72,
    "acid punk" => 73,
    "acid jazz" => 74,
    "polka" => 75,
    "retro" => 76,
    "musical" => 77,
    "rock & roll" => 78,
    "hard rock" => 79,
    "folk" => 80,
    "folk-rock" => 81,
    "national folk" => 82,
    "swing" => 83,
    "fast fusion" => 84,
    "bebop" => 85,
    "latin" => 86,
    "revival" => 87,
    "celtic" => 88,
    "bluegrass" => 89,
    "avantgarde" => 90,
    "gothic rock" => 91,
    "progressive rock" => 92,
    "psychedelic rock" => 93,
    "symphonic rock" => 94,
    "slow rock" => 95,
    "big band" => 96,
    "chorus" => 97,
    "easy listening" => 98,
    "acoustic" => 99,
    "humour" => 100,
    "speech" => 101,
    "chanson" => 102,
    "opera" => 103,
    "chamber music" => 104,
    "sonata" => 105,
    "symphony" => 106,
    "booty bass" => 107,
    "primus" => 108,
    "porn groove" => 109,
    "satire" => 110,
    "slow jam" => 111,
    "club" => 112,
    "tango" => 113,
    "samba" => 114,
    "folklore" => 115,
    "ballad" => 116,
    "power ballad" => 117,
    "rhytmic soul" => 118,
    "freestyle" => 119,
    "duet" => 120,
    "punk rock" => 121,
    "drum solo" => 122,
    "acapella" => 123,
    "euro-house" => 124,
    "dance hall" => 125,
    "goa" => 126,
    "drum & bass" => 127,
    "club-house" => 128,
    "hardcore" => 129,
    "terror" => 130,
    "indie" => 131,
    "britpop" => 132,
    "negerpunk" => 133,
    "polsk punk" => 134,
    "beat" => 135,
    "christian gangsta rap" => 136,
    "heavy metal" => 137,
    "black metal" => 138,
    "crossover" => 139,
    "contemporary christian" => 140,
    "christian rock" => 141,
    "merengue" => 142,
    "salsa" => 143,
    "trash meta" => 144,
    "anime" => 145,
    "jpop" => 146,
    "synthpop" => 147,
};

/// Looks up a genre name by its ID3v1 index. Out-of-range indices (including
/// the "undefined" value 0xFF) have no name.
pub fn name_for_index(index: u8) -> Option<&'static str> {
    GENRE_TABLE.get(index as usize).copied()
}

/// Looks up a genre's index by name, case-insensitive.
pub fn index_for_name(name: &str) -> Option<u8> {
    GENRE_LOOKUP.get(name.to_ascii_lowercase().as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_148_entries() {
        assert_eq!(GENRE_TABLE.len(), 148);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(index_for_name("rock"), Some(17));
        assert_eq!(index_for_name("ROCK"), Some(17));
        assert_eq!(index_for_name("RoCk"), Some(17));
    }

    #[test]
    fn index_round_trips_through_name() {
        for i in 0..148u8 {
            let name = name_for_index(i).unwrap();
            assert_eq!(index_for_name(name), Some(i));
        }
    }

    #[test]
    fn unknown_name_has_no_index() {
        assert_eq!(index_for_name("Not A Real Genre"), None);
    }

    #[test]
    fn out_of_range_index_has_no_name() {
        assert_eq!(name_for_index(200), None);
    }
}
