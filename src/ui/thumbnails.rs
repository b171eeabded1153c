//! Image slot previews and the optional window icon.

use crate::Result;
use std::path::Path;

/// Largest edge of a slot preview, in pixels.
pub const THUMBNAIL_EDGE: u32 = 280;

const ICON_CANDIDATES: [&str; 2] = ["icon.png", "icon.ico"];

/// Decode `path` and scale it to fit the slot, keeping its aspect ratio.
pub fn load_thumbnail(path: &Path) -> Result<egui::ColorImage> {
    let thumbnail = image::open(path)?
        .resize(
            THUMBNAIL_EDGE,
            THUMBNAIL_EDGE,
            image::imageops::FilterType::Triangle,
        )
        .to_rgba8();
    let size = [thumbnail.width() as usize, thumbnail.height() as usize];

    Ok(egui::ColorImage::from_rgba_unmultiplied(
        size,
        thumbnail.as_raw(),
    ))
}

/// Window icon from `icon.png` (or `icon.ico`) in `dir`, when present and
/// decodable.
pub fn load_icon(dir: &Path) -> Option<egui::IconData> {
    ICON_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .and_then(|path| match image::open(&path) {
            Ok(icon) => {
                let icon = icon.to_rgba8();
                Some(egui::IconData {
                    width: icon.width(),
                    height: icon.height(),
                    rgba: icon.into_raw(),
                })
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable icon {}: {}", path.display(), e);
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_thumbnail_preserves_aspect_ratio() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 1120, 560);

        let thumbnail = load_thumbnail(&path).unwrap();
        assert_eq!(thumbnail.size, [280, 140]);
    }

    #[test]
    fn test_small_images_are_scaled_up_to_fit() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "small.png", 40, 30);

        let thumbnail = load_thumbnail(&path).unwrap();
        assert_eq!(thumbnail.size, [280, 210]);
    }

    #[test]
    fn test_undecodable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"nope").unwrap();

        assert!(load_thumbnail(&path).is_err());
    }

    #[test]
    fn test_icon_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_icon(dir.path()).is_none());

        write_png(dir.path(), "icon.png", 16, 16);
        let icon = load_icon(dir.path()).unwrap();
        assert_eq!((icon.width, icon.height), (16, 16));
        assert_eq!(icon.rgba.len(), 16 * 16 * 4);
    }
}
