//! Font used to draw marker labels.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ab_glyph::{FontArc, InvalidFont};
use thiserror::Error;

static SYSTEM_FONT: OnceLock<Option<LabelFont>> = OnceLock::new();

/// DejaVu Sans Bold, used when no font is installed. See `assets/DejaVuSans-LICENSE.txt`.
static BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// Preferred font files, in order.
const PREFERRED_FONTS: &[&str] = &[
    "DejaVuSans-Bold.ttf",
    "DejaVuSans.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Regular.ttf",
    "NotoSans-Bold.ttf",
    "NotoSans-Regular.ttf",
    "Arial Bold.ttf",
    "Arial.ttf",
    "arialbd.ttf",
    "arial.ttf",
];

/// Error loading a font file.
#[derive(Debug, Error)]
pub enum FontError {
    /// Font file could not be read.
    #[error("failed to read font file {path}: {source}")]
    Io {
        /// Font file path.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },
    /// File is not a font ab_glyph can parse.
    #[error("invalid font file {path}: {source}")]
    Invalid {
        /// Font file path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: InvalidFont,
    },
}

/// A parsed TrueType/OpenType font. Cloning is cheap.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
    path: Option<PathBuf>,
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont")
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str("bundled DejaVu Sans Bold"),
        }
    }
}

impl LabelFont {
    /// Loads the font from the given file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|source| FontError::Io {
            path: path.clone(),
            source,
        })?;
        let font = FontArc::try_from_vec(data).map_err(|source| FontError::Invalid {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            font,
            path: Some(path),
        })
    }

    /// The font compiled into the library.
    pub fn bundled() -> Result<Self, InvalidFont> {
        Ok(Self {
            font: FontArc::try_from_slice(BUNDLED_FONT)?,
            path: None,
        })
    }

    /// The parsed font.
    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// File the font was loaded from. `None` for the bundled font.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Font found in the system font folders, or the bundled font if there is
    /// none. The folders are scanned once per process.
    ///
    /// Returns `None` only if the bundled font cannot be parsed.
    pub fn system() -> Option<&'static LabelFont> {
        SYSTEM_FONT
            .get_or_init(|| {
                if let Some(font) = Self::discover(&system_font_folders()) {
                    log::info!("Using label font {font}");
                    return Some(font);
                }

                match Self::bundled() {
                    Ok(font) => {
                        log::info!("No system font found. Using {font} for labels");
                        Some(font)
                    }
                    Err(err) => {
                        log::error!("Bundled font is unusable, marker labels will not be drawn: {err}");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Searches the given folders recursively and loads the best matching font.
    pub fn discover(folders: &[PathBuf]) -> Option<Self> {
        let mut candidates = vec![];
        for folder in folders {
            collect_font_files(folder, &mut candidates);
        }
        candidates.sort();

        let preferred = PREFERRED_FONTS.iter().flat_map(|name| {
            candidates
                .iter()
                .filter(move |path| path.file_name().is_some_and(|file| file == *name))
        });

        preferred
            .chain(candidates.iter())
            .find_map(|path| match Self::from_file(path) {
                Ok(font) => Some(font),
                Err(err) => {
                    log::debug!("Skipping font: {err}");
                    None
                }
            })
    }
}

fn system_font_folders() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    let folders = vec!["C:/Windows/Fonts".into()];

    #[cfg(target_os = "macos")]
    let folders = vec!["/System/Library/Fonts".into(), "/Library/Fonts".into()];

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let folders = vec!["/usr/share/fonts".into(), "/usr/local/share/fonts".into()];

    folders
}

fn collect_font_files(folder: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(folder) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, out);
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
        {
            out.push(path);
        }
    }
}
