//! Turning files and clipboard contents into backgrounds.

use inkmark_core::{Background, CoreError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Invalid(#[from] CoreError),
    #[error("clipboard: {0}")]
    Clipboard(String),
}

/// A decoded background plus the name it was loaded under.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub background: Background,
    /// File name (not path) of the source; `None` for pasted images.
    pub file_name: Option<String>,
}

/// Decode an encoded image (PNG, JPEG, WebP).
pub fn decode_background(bytes: &[u8]) -> Result<Background, LoadError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Background::from_rgba8(width, height, rgba.into_raw())?)
}

pub fn load_file(path: &Path) -> Result<LoadedImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let background = decode_background(&bytes)?;
    log::info!(
        "Loaded {} ({}x{})",
        path.display(),
        background.width(),
        background.height()
    );
    Ok(LoadedImage {
        background,
        file_name: path.file_name().map(|name| name.to_string_lossy().into_owned()),
    })
}

/// Read an image from the system clipboard.
#[cfg(feature = "native")]
pub fn load_clipboard() -> Result<LoadedImage, LoadError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|err| LoadError::Clipboard(err.to_string()))?;
    let image = clipboard
        .get_image()
        .map_err(|err| LoadError::Clipboard(err.to_string()))?;
    // arboard hands out RGBA8 rows.
    let background = Background::from_rgba8(
        image.width as u32,
        image.height as u32,
        image.bytes.into_owned(),
    )?;
    log::info!(
        "Pasted image from clipboard ({}x{})",
        background.width(),
        background.height()
    );
    Ok(LoadedImage {
        background,
        file_name: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn test_load_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "holiday.png", 12, 7);

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.file_name.as_deref(), Some("holiday.png"));
        assert_eq!((loaded.background.width(), loaded.background.height()), (12, 7));
        assert_eq!(&loaded.background.pixels()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(
            decode_background(b"not an image"),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
