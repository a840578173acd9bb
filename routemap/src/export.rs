//! Saving the rendered map as PNG.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tempfile::NamedTempFile;

use crate::error::ExportError;

/// Writes `canvas` as a PNG file at `path` and returns the absolute path of the file.
///
/// Missing parent directories are created and an existing file is replaced.
/// The image is first written to a temporary file in the target directory and
/// then renamed, so `path` never holds a partially written image.
pub fn save(canvas: &RgbaImage, path: &Path) -> Result<PathBuf, ExportError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&parent).map_err(|source| ExportError::CreateDir {
        path: parent.clone(),
        source,
    })?;

    let persist_error = |source| ExportError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(&parent).map_err(persist_error)?;
    {
        let mut writer = BufWriter::new(&mut file);
        canvas
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|source| ExportError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        writer.flush().map_err(persist_error)?;
    }

    file.persist(path)
        .map_err(|err| persist_error(err.error))?;
    let saved = std::fs::canonicalize(path).map_err(persist_error)?;

    log::info!(
        "Saved {}x{} map to {}",
        canvas.width(),
        canvas.height(),
        saved.display()
    );

    Ok(saved)
}
