use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "tiff"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "3gp"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension() else {
            return MediaKind::Unsupported;
        };
        let ext = ext.to_string_lossy();
        if IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
        {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
        {
            MediaKind::Video
        } else {
            MediaKind::Unsupported
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, MediaKind::Unsupported)
    }
}

#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub extension: String,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let kind = MediaKind::from_path(&path);
        Self {
            path,
            extension,
            kind,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn is_hidden(&self) -> bool {
        self.file_name().starts_with('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_extensions_case_insensitively() {
        assert_eq!(MediaKind::from_path(Path::new("a/IMG.JPG")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("a/b.HeIc")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("clip.3gp")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("clip.MOV")), MediaKind::Video);
    }

    #[test]
    fn unknown_or_missing_extension_is_unsupported() {
        assert_eq!(
            MediaKind::from_path(Path::new("notes.txt")),
            MediaKind::Unsupported
        );
        assert_eq!(
            MediaKind::from_path(Path::new("README")),
            MediaKind::Unsupported
        );
        assert_eq!(
            MediaKind::from_path(Path::new("photo.gif")),
            MediaKind::Unsupported
        );
    }

    #[test]
    fn media_file_lowercases_extension() {
        let file = MediaFile::new(PathBuf::from("/tmp/IMG_0001.JPEG"));
        assert_eq!(file.extension, ".jpeg");
        assert_eq!(file.kind, MediaKind::Image);
        assert_eq!(file.file_name(), "IMG_0001.JPEG");
        assert!(!file.is_hidden());
        assert!(MediaFile::new(PathBuf::from("/tmp/.IMG.jpg")).is_hidden());
    }
}
