// Mp3scope
// Copyright (c) 2026 The Project Mp3scope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An ID3v1.1 metadata reader.

use log::debug;

use mp3scope_core::util::text::{decode_iso8859_1_lossy, trim_trailing_nul_and_space};

/// The fixed length in bytes of an ID3v1 tag.
pub const ID3V1_TAG_LEN: usize = 128;

/// Genre names addressed by the ID3v1 genre byte. Indices 0..=79 are defined by the ID3v1
/// specification, 80..=191 are the Winamp extensions.
const GENRES: [&str; 192] = [
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
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
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
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta Rap",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native American",
    "Cabaret",
    "New Wave",
    "Psychedelic",
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
    "Folk/Rock",
    "National Folk",
    "Swing",
    "Fast-Fusion",
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
    "Rhythmic Soul",
    "Freestyle",
    "Duet",
    "Punk Rock",
    "Drum Solo",
    "A Cappella",
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
    "Thrash Metal",
    "Anime",
    "JPop",
    "Synthpop",
    "Christmas",
    "Art Rock",
    "Baroque",
    "Bhangra",
    "Big Beat",
    "Breakbeat",
    "Chillout",
    "Downtempo",
    "Dub",
    "EBM",
    "Eclectic",
    "Electro",
    "Electroclash",
    "Emo",
    "Experimental",
    "Garage",
    "Global",
    "IDM",
    "Illbient",
    "Industro-Goth",
    "Jam Band",
    "Krautrock",
    "Leftfield",
    "Lounge",
    "Math rock",
    "New Romantic",
    "Nu-Breakz",
    "Post-Punk",
    "Post-Rock",
    "Psytrance",
    "Shoegaze",
    "Space Rock",
    "Trop Rock",
    "World Music",
    "Neoclassical",
    "Audiobook",
    "Audio Theatre",
    "Neue Deutsche Welle",
    "Podcast",
    "Indie-Rock",
    "G-Funk",
    "Dubstep",
    "Garage Rock ",
    "Psybient",
];

/// Map the ID3v1 genre byte to a genre name. Value 255 denotes the absence of a genre; values
/// beyond the known table are reported as unknown.
pub fn genre_name(genre: u8) -> &'static str {
    match genre {
        255 => "None",
        g if (g as usize) < GENRES.len() => GENRES[g as usize],
        _ => "Unknown",
    }
}

/// A decoded ID3v1.1 tag.
#[derive(Clone, Debug)]
pub struct Id3v1 {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: Option<u8>,
    pub genre: &'static str,
    /// The verbatim 128 tag bytes, captured on request.
    pub raw: Option<Vec<u8>>,
}

/// Attempt to read an ID3v1.1 tag from the start of `buf`, the remainder of the file after the
/// last MPEG frame. Returns `None` when no tag is present.
pub fn read_id3v1(buf: &[u8], capture_raw: bool) -> Option<Id3v1> {
    if buf.len() < ID3V1_TAG_LEN || &buf[0..3] != b"TAG" {
        return None;
    }

    let tag = &buf[..ID3V1_TAG_LEN];

    // The comment field is 28 bytes in ID3v1.1. If the two bytes following it are not both 0,
    // there is no track number and the comment extends over them (plain ID3v1).
    let track = if tag[125] == 0 && tag[126] == 0 { None } else { Some(tag[126]) };

    debug!("id3v1: tag with genre byte {}", tag[127]);

    Some(Id3v1 {
        title: decode_field(&tag[3..33]),
        artist: decode_field(&tag[33..63]),
        album: decode_field(&tag[63..93]),
        year: decode_iso8859_1_lossy(&tag[93..97]),
        comment: decode_field(&tag[97..125]),
        track,
        genre: genre_name(tag[127]),
        raw: if capture_raw { Some(tag.to_vec()) } else { None },
    })
}

fn decode_field(buf: &[u8]) -> String {
    decode_iso8859_1_lossy(trim_trailing_nul_and_space(buf))
}
