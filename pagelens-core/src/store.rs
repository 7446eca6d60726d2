use pagelens_scanner::ThumbnailStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Append-only thumbnail store on the local filesystem. Every write
/// gets a fresh generated name, so concurrent image tasks never
/// collide; the returned reference is the bare file name.
pub struct FsThumbnailStore {
    dir: PathBuf,
}

impl FsThumbnailStore {
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ThumbnailStore for FsThumbnailStore {
    fn store(&self, bytes: &[u8]) -> io::Result<String> {
        let name = format!("{}.png", Uuid::new_v4());
        fs::write(self.dir.join(&name), bytes)?;
        debug!("Stored thumbnail {} ({} bytes)", name, bytes.len());
        Ok(name)
    }
}
