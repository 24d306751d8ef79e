//! Metadata derivation, cover art and in-place tagging

pub mod cover;
pub mod derive;
pub mod tagger;

pub use cover::CoverFetcher;
pub use derive::{derive_metadata, NormalizedMetadata};
pub use tagger::{LoftyTagger, Tagger};
