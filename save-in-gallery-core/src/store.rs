//! Gallery storage backends.
//!
//! A store knows where the gallery lives and how to put an encoded file into
//! it. The filesystem store backs desktop builds and tests; mobile builds
//! hand the encoded bytes to the native media store instead.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::naming::ResolvedFileName;

/// Destination for encoded gallery images.
pub trait GalleryStore: Send + Sync {
    /// Make sure the album (or the gallery root for `None`) exists.
    fn prepare_album(&self, album: Option<&str>) -> Result<()>;

    /// Write `bytes` as `file` inside the album, replacing any existing
    /// file of the same name.
    fn replace(&self, album: Option<&str>, file: &ResolvedFileName, bytes: &[u8]) -> Result<()>;
}

/// Gallery rooted in a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsGallery {
    root: PathBuf,
}

impl FsGallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory an album maps to. Album names must be a single plain
    /// path component.
    pub fn album_dir(&self, album: Option<&str>) -> Result<PathBuf> {
        match album {
            None => Ok(self.root.clone()),
            Some(album) => {
                ensure_single_component(album, "album")?;
                Ok(self.root.join(album))
            }
        }
    }

    /// Full path a resolved file name is written to.
    pub fn file_path(&self, album: Option<&str>, file: &ResolvedFileName) -> Result<PathBuf> {
        let file_name = file.file_name();
        ensure_single_component(&file_name, "file name")?;
        Ok(self.album_dir(album)?.join(file_name))
    }
}

impl GalleryStore for FsGallery {
    fn prepare_album(&self, album: Option<&str>) -> Result<()> {
        let dir = self.album_dir(album)?;
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!("Created gallery directory {}", dir.display());
        }
        Ok(())
    }

    fn replace(&self, album: Option<&str>, file: &ResolvedFileName, bytes: &[u8]) -> Result<()> {
        let path = self.file_path(album, file)?;

        // Last writer wins, no suffixed duplicates
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("Removed previous {}", path.display());
        }

        fs::write(&path, bytes)?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

fn ensure_single_component(name: &str, what: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidArguments(format!(
            "{what} must be a single path component: {name:?}"
        ))),
    }
}
