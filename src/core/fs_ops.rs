// src/core/fs_ops.rs
//! File system operations shared by the scraper and the generator

use crate::errors::PipelineError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// How many numeric suffixes to try before giving up on a name.
pub const MAX_NAME_ATTEMPTS: usize = 1000;

pub struct FsOps;

impl FsOps {
    /// Ensure directory exists
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write a new file, creating the parent directory if needed
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        debug!("Written file: {}", path.display());
        Ok(())
    }

    /// First path in `dir` not taken yet: `name.ext`, `name-1.ext`, `name-2.ext`...
    pub fn unique_path(dir: &Path, file_name: &str) -> Result<PathBuf> {
        let candidate = dir.join(file_name);
        if !candidate.exists() {
            return Ok(candidate);
        }

        let as_path = Path::new(file_name);
        let stem = as_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        let extension = as_path.extension().and_then(|e| e.to_str());

        for n in 1..MAX_NAME_ATTEMPTS {
            let name = match extension {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            };
            let candidate = dir.join(name);
            if !candidate.exists() {
                return Ok(candidate);
            }
        }

        Err(PipelineError::NameCollision {
            path: dir.join(file_name),
            attempts: MAX_NAME_ATTEMPTS,
        }
        .into())
    }

    /// Write `content` under a collision-free variant of `file_name` in `dir`
    pub async fn write_unique(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
        Self::ensure_dir_exists(dir).await?;
        let path = Self::unique_path(dir, file_name)?;
        Self::write_file_safe(&path, content).await?;
        Ok(path)
    }

    /// Move `src` into `dest_dir` as `file_name` (suffixed on collision)
    pub async fn move_unique(src: &Path, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
        Self::ensure_dir_exists(dest_dir).await?;
        let dest = Self::unique_path(dest_dir, file_name)?;

        if let Err(rename_err) = fs::rename(src, &dest).await {
            // rename(2) cannot cross filesystems
            warn!(
                "Rename {} -> {} failed ({}), copying instead",
                src.display(),
                dest.display(),
                rename_err
            );
            fs::copy(src, &dest).await.with_context(|| {
                format!("Failed to copy {} to {}", src.display(), dest.display())
            })?;
            fs::remove_file(src)
                .await
                .with_context(|| format!("Failed to remove {}", src.display()))?;
        }

        info!("Moved {} to {}", src.display(), dest.display());
        Ok(dest)
    }

    /// Sorted list of `*.txt` files directly inside `dir`, skipping hidden files
    pub async fn list_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let mut entries = fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            if Self::get_extension(&path).as_deref() == Some("txt") {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Get file extension safely
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}
