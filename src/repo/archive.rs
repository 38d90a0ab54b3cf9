use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Extract a zip archive into `dest`. Returns the number of files written.
///
/// Entries whose names would resolve outside `dest` (absolute paths or
/// `..` components) are skipped.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("Upload is not a valid zip archive")?;

    std::fs::create_dir_all(dest)?;
    let mut written = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read zip entry {i}"))?;

        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("Skipping unsafe zip entry {:?}", entry.name());
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)
            .with_context(|| format!("Failed to create {}", out_path.display()))?;
        std::io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract {}", out_path.display()))?;
        written += 1;
    }

    tracing::info!(
        "Extracted {written} files from {} into {}",
        archive_path.display(),
        dest.display()
    );
    Ok(written)
}

/// Reduce a client-supplied upload name to a bare file name.
pub fn sanitize_upload_name(name: Option<&str>) -> String {
    let base = name
        .and_then(|n| n.rsplit(['/', '\\']).next())
        .map(str::trim)
        .unwrap_or("");
    if base.is_empty() || base == "." || base == ".." {
        "upload.zip".to_string()
    } else {
        base.to_string()
    }
}
