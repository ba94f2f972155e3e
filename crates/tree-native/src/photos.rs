use anyhow::Context;
use std::path::{Path, PathBuf};
use tree_core::constants::PHOTO_COUNT;
use tree_render::Renderer;

const MAX_EDGE: u32 = 1024;

/// Image files in `dir`, sorted by name, at most one per gallery slot.
pub fn list(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files.truncate(PHOTO_COUNT);
    Ok(files)
}

pub fn upload_dir(renderer: &mut Renderer<'_>, dir: &Path) {
    let files = match list(dir) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("[render] no photos loaded: {e:#}");
            return;
        }
    };
    for (index, path) in files.iter().enumerate() {
        let result = image::open(path)
            .with_context(|| format!("decoding {}", path.display()))
            .and_then(|img| {
                let rgba = img.thumbnail(MAX_EDGE, MAX_EDGE).to_rgba8();
                renderer.upload_photo(index, rgba.width(), rgba.height(), rgba.as_raw())
            });
        if let Err(e) = result {
            log::warn!("[render] photo {index} kept placeholder: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_an_error() {
        assert!(list(Path::new("/definitely/not/here")).is_err());
    }
}
