use crate::error::{cache_error, DigestResult};
use chrono::DateTime;
use chrono_tz::Tz;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Prefix of every digest file; the hour bucket key follows it
pub const CACHE_FILE_PREFIX: &str = "gcal.events";

/// Hour-bucketed digest store
///
/// One file per local wall-clock hour. Files from earlier hours are never
/// read again and are left behind rather than deleted. Writes go through a
/// temporary file renamed into place, so a concurrent reader sees either the
/// previous digest or the complete new one; concurrent writers race and the
/// last rename wins.
#[derive(Debug, Clone)]
pub struct DigestCache {
    dir: PathBuf,
}

impl DigestCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `YYYYMMDDHH` of `now` in its own timezone
    pub fn bucket_key(now: &DateTime<Tz>) -> String {
        now.format("%Y%m%d%H").to_string()
    }

    /// File holding the digest for the bucket containing `now`
    pub fn path_for(&self, now: &DateTime<Tz>) -> PathBuf {
        self.dir
            .join(format!("{}{}", CACHE_FILE_PREFIX, Self::bucket_key(now)))
    }

    /// Cached digest for the current bucket
    ///
    /// Missing, unreadable and empty files all count as a miss.
    pub fn read(&self, now: &DateTime<Tz>) -> Option<String> {
        let path = self.path_for(now);
        match fs::read_to_string(&path) {
            Ok(digest) if !digest.is_empty() => Some(digest),
            Ok(_) => {
                debug!("Cache file {} is empty", path.display());
                None
            }
            Err(e) => {
                debug!("No cached digest at {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store `digest` for the current bucket, returning the file written
    pub fn write(&self, now: &DateTime<Tz>, digest: &str) -> DigestResult<PathBuf> {
        let path = self.path_for(now);

        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(digest.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| {
            cache_error(&format!("Failed to move digest into {}: {}", path.display(), e.error))
        })?;

        debug!("Cached digest at {}", path.display());
        Ok(path)
    }
}
