use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub files: Vec<PathBuf>,
}

pub trait MediaFs {
    /// Depth-first, root first, entries in file-name order. Unreadable
    /// subtrees are reported and left out.
    fn walk(&self, root: &Path) -> Vec<DirectoryListing>;
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl MediaFs for RealFs {
    fn walk(&self, root: &Path) -> Vec<DirectoryListing> {
        let mut listings = Vec::<DirectoryListing>::new();
        let mut index = HashMap::<PathBuf, usize>::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                index.insert(entry.path().to_path_buf(), listings.len());
                listings.push(DirectoryListing {
                    path: entry.path().to_path_buf(),
                    files: Vec::new(),
                });
                continue;
            }

            let slot = entry.path().parent().and_then(|p| index.get(p)).copied();
            if let Some(slot) = slot {
                listings[slot].files.push(entry.path().to_path_buf());
            }
        }

        listings
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    // Any directory entry counts, including symlinks whose target is gone.
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
