//! Durable File Operations
//!
//! Writes go to a sibling tmp file, are fsynced, then renamed over the
//! target, so readers only ever see the old or the new content. The parent
//! directory is fsynced after the rename.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Atomically replace `path` with `bytes`.
///
/// Creates missing parent directories. The file is fsynced before the
/// rename and the directory entry after it, so a crash right after return
/// cannot lose the write.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).await?;
            parent
        }
        None => Path::new("."),
    };

    let tmp_path = temp_path(path)?;
    let mut tmp_file = fs::File::create(&tmp_path).await?;
    let written = async {
        tmp_file.write_all(bytes).await?;
        tmp_file.sync_all().await
    }
    .await;
    drop(tmp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    sync_dir(parent).await
}

/// Flush a directory's entries to disk.
///
/// Directories cannot be opened as files on every platform; there this is a no-op.
#[cfg(unix)]
pub async fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
pub async fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Copy `path` to `<file name>.bak-<stamp>` next to it and return the backup path.
///
/// The original file is left in place.
pub async fn backup_copy(path: &Path, stamp: &str) -> io::Result<PathBuf> {
    let backup = backup_path(path, stamp)?;
    fs::copy(path, &backup).await?;
    Ok(backup)
}

/// Compute the backup path for `path` without touching the filesystem.
pub fn backup_path(path: &Path, stamp: &str) -> io::Result<PathBuf> {
    let file_name = file_name(path)?;
    Ok(path.with_file_name(format!("{file_name}.bak-{stamp}")))
}

// Unique per write: an abandoned write must never share a tmp file with the next one.
fn temp_path(path: &Path) -> io::Result<PathBuf> {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let file_name = file_name(path)?;
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    Ok(path.with_file_name(format!(".{file_name}.tmp-{}-{seq}", std::process::id())))
}

fn file_name(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no file name"))
}
