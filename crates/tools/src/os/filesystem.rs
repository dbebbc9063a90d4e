//! Filesystem operations - structured, safe file management

use super::{OsError, OsResult};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// Create a directory and any missing parents
pub async fn create_dir<P: AsRef<Path>>(path: P) -> OsResult<()> {
    fs::create_dir_all(path.as_ref()).await?;
    Ok(())
}

/// Create a new file; an existing file is never truncated
pub async fn create_file<P: AsRef<Path>>(path: P, content: &str) -> OsResult<()> {
    let path = path.as_ref();

    if path.exists() {
        return Err(OsError::InvalidArgument(format!(
            "{} already exists",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, content).await?;
    Ok(())
}

/// Delete a file or directory
pub async fn delete<P: AsRef<Path>>(path: P) -> OsResult<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OsError::NotFound(path.display().to_string()));
    }

    if path.is_dir() {
        fs::remove_dir_all(path).await?;
    } else {
        fs::remove_file(path).await?;
    }

    Ok(())
}

/// Move/rename a file or directory. Moving onto an existing directory
/// moves the source inside it.
pub async fn move_path<P: AsRef<Path>>(from: P, to: P) -> OsResult<PathBuf> {
    let from = from.as_ref();

    if !from.exists() {
        return Err(OsError::NotFound(from.display().to_string()));
    }

    let target = into_dir_target(from, to.as_ref())?;
    fs::rename(from, &target).await?;
    Ok(target)
}

/// Copy a file. Copying onto an existing directory copies inside it.
pub async fn copy_file<P: AsRef<Path>>(from: P, to: P) -> OsResult<PathBuf> {
    let from = from.as_ref();

    if !from.exists() {
        return Err(OsError::NotFound(from.display().to_string()));
    }

    if !from.is_file() {
        return Err(OsError::InvalidArgument("Source must be a file".to_string()));
    }

    let target = into_dir_target(from, to.as_ref())?;
    fs::copy(from, &target).await?;
    Ok(target)
}

fn into_dir_target(from: &Path, to: &Path) -> OsResult<PathBuf> {
    if !to.is_dir() {
        return Ok(to.to_path_buf());
    }
    let name = from
        .file_name()
        .ok_or_else(|| OsError::InvalidArgument(format!("{} has no file name", from.display())))?;
    Ok(to.join(name))
}

/// Write file contents, replacing what was there
pub async fn write<P: AsRef<Path>>(path: P, content: &str) -> OsResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, content).await?;
    Ok(())
}

/// List directory contents, directories first, then by name
pub async fn list<P: AsRef<Path>>(path: P) -> OsResult<Vec<DirEntryInfo>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OsError::NotFound(path.display().to_string()));
    }

    if !path.is_dir() {
        return Err(OsError::InvalidArgument("Path must be a directory".to_string()));
    }

    let mut entries = Vec::new();
    let mut dir = fs::read_dir(path).await?;

    while let Some(entry) = dir.next_entry().await? {
        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().to_string(),
            is_dir: entry.file_type().await?.is_dir(),
        });
    }

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}
