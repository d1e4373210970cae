use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{FsError, Result};

/// One file found under an opened directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// `/`-separated path relative to the directory it was listed from.
    pub path: String,
    /// Location on disk.
    pub location: PathBuf,
    /// Size in bytes as of the last listing or write.
    pub size: u64,
}

impl FileEntry {
    /// Entry for a single file; `path` is its file name.
    pub fn open(location: impl AsRef<Path>) -> Result<Self> {
        let location = location.as_ref();
        let meta = fs::metadata(location).map_err(|source| FsError::ReadFile {
            path: location.to_path_buf(),
            source,
        })?;

        let path = location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path,
            location: location.to_path_buf(),
            size: meta.len(),
        })
    }

    /// File name extension, if any (`"json"` for `a/b.json`).
    pub fn extension(&self) -> Option<&str> {
        self.location.extension().and_then(|ext| ext.to_str())
    }
}

/// An opened working directory and every file under it.
#[derive(Debug, Clone)]
pub struct Directory {
    pub root: PathBuf,
    pub files: Vec<FileEntry>,
}

impl Directory {
    pub fn find(&self, path: &str) -> Option<&FileEntry> {
        self.files.iter().find(|entry| entry.path == path)
    }
}

/// Opens `root` for read/write use and lists its files recursively.
///
/// Fails if `root` is not a directory or is marked read-only.
pub fn open_directory(root: impl AsRef<Path>) -> Result<Directory> {
    let root = root.as_ref();
    let meta = fs::metadata(root).map_err(|source| FsError::ReadDir {
        path: root.to_path_buf(),
        source,
    })?;

    if !meta.is_dir() {
        return Err(FsError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    if meta.permissions().readonly() {
        return Err(FsError::ReadOnly {
            path: root.to_path_buf(),
        });
    }

    let files = files_in(root, "")?;
    log::debug!("opened {} ({} file(s))", root.display(), files.len());

    Ok(Directory {
        root: root.to_path_buf(),
        files,
    })
}

/// Lists every regular file under `dir`, depth first, sorted by name within
/// each directory. Entry paths are prefixed with `prefix` (pass `""` for
/// paths relative to `dir`).
///
/// Entries that are neither files nor directories (symlinks, sockets, ...)
/// are skipped.
pub fn files_in(dir: &Path, prefix: &str) -> Result<Vec<FileEntry>> {
    let mut out = Vec::new();
    collect(dir, prefix, &mut out)?;
    Ok(out)
}

fn collect(dir: &Path, prefix: &str, out: &mut Vec<FileEntry>) -> Result<()> {
    let read_dir_err = |source| FsError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_dir_err)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_dir_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        let file_type = entry.file_type().map_err(read_dir_err)?;
        if file_type.is_file() {
            let size = entry
                .metadata()
                .map_err(|source| FsError::ReadFile {
                    path: entry.path(),
                    source,
                })?
                .len();
            out.push(FileEntry {
                path,
                location: entry.path(),
                size,
            });
        } else if file_type.is_dir() {
            collect(&entry.path(), &path, out)?;
        }
    }

    Ok(())
}

/// Creates an empty file at `path` (relative to `root`, `/`-separated),
/// along with any missing parent directories. An existing file is truncated.
pub fn create_file(root: &Path, path: &str) -> Result<FileEntry> {
    let location = path
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part));

    let write_err = |source| FsError::WriteFile {
        path: location.clone(),
        source,
    };
    if let Some(parent) = location.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&location, "").map_err(write_err)?;

    Ok(FileEntry {
        path: path.trim_matches('/').to_string(),
        location,
        size: 0,
    })
}

pub fn read_file(entry: &FileEntry) -> Result<String> {
    fs::read_to_string(&entry.location).map_err(|source| FsError::ReadFile {
        path: entry.location.clone(),
        source,
    })
}

pub fn read_file_json<T: DeserializeOwned>(entry: &FileEntry) -> Result<T> {
    let text = read_file(entry)?;
    serde_json::from_str(&text).map_err(|source| FsError::ParseJson {
        path: entry.location.clone(),
        source,
    })
}

/// Replaces the file's contents and refreshes `entry.size`.
pub fn write_file(entry: &mut FileEntry, content: &str) -> Result<()> {
    let write_err = |source| FsError::WriteFile {
        path: entry.location.clone(),
        source,
    };

    fs::write(&entry.location, content).map_err(write_err)?;
    entry.size = fs::metadata(&entry.location).map_err(write_err)?.len();
    log::debug!("wrote {} ({} bytes)", entry.location.display(), entry.size);
    Ok(())
}

/// Writes `value` as pretty JSON (two-space indent) with a trailing newline.
pub fn write_file_json<T: Serialize + ?Sized>(entry: &mut FileEntry, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| FsError::SerializeJson {
        path: entry.location.clone(),
        source,
    })?;
    text.push('\n');
    write_file(entry, &text)
}
