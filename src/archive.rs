use anyhow::{Context, Result, anyhow};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extracts every entry of `archive_path` below `dest`, creating it if needed.
///
/// Entries whose names would escape `dest` (absolute paths, `..`) are
/// rejected. Returns the number of files written.
pub(crate) fn extract_all(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file =
        File::open(archive_path).with_context(|| format!("failed to open {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {}", archive_path.display()))?;

    fs::create_dir_all(dest).with_context(|| format!("failed to create directory {}", dest.display()))?;

    let mut written = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("failed to access zip entry at index {}", i))?;

        let name: PathBuf = entry
            .enclosed_name()
            .ok_or_else(|| anyhow!("unsafe path in zip archive: {:?}", entry.name()))?;
        let outpath = dest.join(&name);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)
                .with_context(|| format!("failed to create directory {}", outpath.display()))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        log::debug!("extracting {} -> {}", entry.name(), outpath.display());
        let mut out = File::create(&outpath)
            .with_context(|| format!("failed to create {}", outpath.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to write {}", outpath.display()))?;
        written += 1;
    }

    Ok(written)
}
