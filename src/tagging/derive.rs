//! Metadata derivation from loosely-structured source fields.
//!
//! YouTube music uploads often carry the artist in the title using the
//! `Artist『Title』` convention, and uploader names are padded with channel
//! boilerplate ("Official", "VEVO"). This module turns the raw title and
//! uploader into a clean `{artist, title, album}` triple.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::config::sentinel::{UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_TITLE};

/// Opening delimiter of the `Artist『Title』` convention
pub const TITLE_OPEN: char = '『';
/// Closing delimiter of the `Artist『Title』` convention
pub const TITLE_CLOSE: char = '』';

/// Promotional words stripped from artist names (whole word, case-insensitive)
pub const BOILERPLATE_TOKENS: &[&str] = &["Official", "YouTube Channel", "VEVO"];

static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = BOILERPLATE_TOKENS
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    #[allow(clippy::expect_used)]
    Regex::new(&format!(r"(?i)\b({})\b", alternation)).expect("boilerplate regex is valid")
});

/// Derived tag values for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMetadata {
    pub artist: String,
    pub title: String,
    pub album: String,
}

/// Splits `Artist『Title』` into `(artist, title)`.
///
/// Returns `None` unless both delimiters are present and splitting on the opening
/// one yields exactly two segments.
pub fn split_bracketed_title(raw_title: &str) -> Option<(String, String)> {
    if !raw_title.contains(TITLE_OPEN) || !raw_title.contains(TITLE_CLOSE) {
        return None;
    }

    let segments: Vec<&str> = raw_title.split(TITLE_OPEN).collect();
    match segments.as_slice() {
        [artist, title] => Some((
            artist.trim().to_string(),
            title.replace(TITLE_CLOSE, "").trim().to_string(),
        )),
        _ => None,
    }
}

/// Removes boilerplate tokens from an artist name and trims the result.
///
/// Applying it twice gives the same result as applying it once.
pub fn strip_boilerplate(artist: &str) -> String {
    BOILERPLATE_RE.replace_all(artist, "").trim().to_string()
}

/// Derives `{artist, title, album}` from the raw source fields.
pub fn derive_metadata(raw_title: Option<&str>, uploader: Option<&str>, album: Option<&str>) -> NormalizedMetadata {
    let mut title = raw_title.unwrap_or(UNKNOWN_TITLE).to_string();
    let mut artist = uploader.unwrap_or(UNKNOWN_ARTIST).to_string();

    if let Some((split_artist, split_title)) = split_bracketed_title(&title) {
        artist = split_artist;
        title = split_title;
    }

    NormalizedMetadata {
        artist: strip_boilerplate(&artist),
        title,
        album: album.unwrap_or(UNKNOWN_ALBUM).to_string(),
    }
}
