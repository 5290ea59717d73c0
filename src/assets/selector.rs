use std::path::Path;

use tracing::{debug, info};

use crate::assets::types::{MediaAsset, MediaKind};
use crate::error::{AssetError, Result};

/// Select the most recently modified asset of `kind` in `dir`
///
/// Hidden files and files outside the kind's extension allow-list are
/// skipped. Equal modification times are broken by path so the choice is
/// stable for a given directory snapshot.
pub fn newest_asset<P: AsRef<Path>>(dir: P, kind: MediaKind) -> Result<MediaAsset> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(AssetError::MissingInputDirectory {
            path: dir.display().to_string()
        }.into());
    }

    let candidates = scan_directory(dir, kind)?;
    debug!("Found {} {} candidates in {:?}", candidates.len(), kind, dir);

    let newest = candidates
        .into_iter()
        .max_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)))
        .ok_or_else(|| AssetError::NoAssetFound {
            kind: kind.to_string(),
            path: dir.display().to_string(),
        })?;

    info!("Using {}: {} (modified {})", kind, newest.name(), newest.modified_display());
    Ok(newest)
}

/// List every eligible file in `dir`
fn scan_directory(dir: &Path, kind: MediaKind) -> Result<Vec<MediaAsset>> {
    let mut assets = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || is_hidden(&path) {
            continue;
        }

        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| kind.accepts_extension(ext))
            .unwrap_or(false);

        if !accepted {
            debug!("Skipping {:?}: not a {} file", path, kind);
            continue;
        }

        let modified = std::fs::metadata(&path)?.modified()?;
        assets.push(MediaAsset::new(path, kind, modified));
    }

    Ok(assets)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
