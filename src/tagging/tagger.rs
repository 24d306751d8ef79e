//! In-place container tagging with `lofty`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{Picture, PictureType};
use lofty::prelude::Accessor;
use lofty::probe::Probe;
use lofty::tag::Tag;

use crate::core::error::AppError;
use crate::download::extractor::ExtractedItem;
use crate::tagging::cover::CoverFetcher;
use crate::tagging::derive::{derive_metadata, NormalizedMetadata};

/// Writes artist/title/album (and optionally one cover) into `path` and saves in place.
///
/// A missing file is not an error: yt-dlp may still be renaming it, or a
/// concurrent step already moved it. The path is returned unchanged either way.
pub fn tag_file(path: &Path, metadata: &NormalizedMetadata, cover: Option<&[u8]>) -> Result<PathBuf, AppError> {
    if !path.exists() {
        log::debug!("Skipping tags, file not present: {}", path.display());
        return Ok(path.to_path_buf());
    }

    // Audio properties are not needed to rewrite the tag.
    let mut tagged_file = Probe::open(path)?
        .options(ParseOptions::new().read_properties(false))
        .read()?;
    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| AppError::from(format!("no writable tag available for {:?}", tag_type)))?;

    tag.set_artist(metadata.artist.clone());
    tag.set_title(metadata.title.clone());
    tag.set_album(metadata.album.clone());

    if let Some(cover) = cover {
        while !tag.pictures().is_empty() {
            tag.remove_picture(0);
        }
        let mut picture = Picture::from_reader(&mut &cover[..])?;
        picture.set_pic_type(PictureType::CoverFront);
        tag.push_picture(picture);
    }

    tagged_file.save_to_path(path, WriteOptions::default())?;

    log::info!(
        "Tagged {}: artist='{}', title='{}', album='{}', cover={}",
        path.display(),
        metadata.artist,
        metadata.title,
        metadata.album,
        cover.is_some()
    );
    Ok(path.to_path_buf())
}

/// Derives metadata for an item, fetches its cover and tags the file.
///
/// Cover failures are absorbed by [`CoverFetcher`]; only container errors propagate.
pub async fn tag_item(item: &ExtractedItem, covers: &CoverFetcher) -> Result<PathBuf, AppError> {
    let metadata = derive_metadata(item.raw_title.as_deref(), item.uploader.as_deref(), Some(&item.album));

    if !item.local_file_path.exists() {
        log::debug!("Skipping tags, file not present: {}", item.local_file_path.display());
        return Ok(item.local_file_path.clone());
    }

    let cover = match item.thumbnail_url.as_deref() {
        Some(url) => covers.fetch_cover(url).await,
        None => None,
    };

    let path = item.local_file_path.clone();
    tokio::task::spawn_blocking(move || tag_file(&path, &metadata, cover.as_deref())).await?
}

/// Tagging step of the request pipeline
#[async_trait]
pub trait Tagger: Send + Sync {
    /// Tags the item's scratch file in place and returns the path to deliver.
    async fn tag(&self, item: &ExtractedItem) -> Result<PathBuf, AppError>;
}

/// Production tagger: derived metadata plus fetched cover art, written with `lofty`.
#[derive(Clone)]
pub struct LoftyTagger {
    covers: CoverFetcher,
}

impl LoftyTagger {
    pub fn new(covers: CoverFetcher) -> Self {
        Self { covers }
    }
}

#[async_trait]
impl Tagger for LoftyTagger {
    async fn tag(&self, item: &ExtractedItem) -> Result<PathBuf, AppError> {
        tag_item(item, &self.covers).await
    }
}
