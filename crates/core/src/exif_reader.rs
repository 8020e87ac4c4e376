use crate::metadata::ImageTags;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

pub trait ImageMetadataReader {
    fn read_tags(&self, path: &Path) -> Result<ImageTags>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExifImageReader;

impl ImageMetadataReader for ExifImageReader {
    fn read_tags(&self, path: &Path) -> Result<ImageTags> {
        let file = File::open(path)
            .with_context(|| format!("could not open image for EXIF: {}", path.display()))?;
        let mut buf = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut buf)
            .with_context(|| format!("could not parse EXIF: {}", path.display()))?;

        Ok(ImageTags {
            date_time_original: ascii_field(&exif, Tag::DateTimeOriginal),
            make: ascii_field(&exif, Tag::Make),
            model: ascii_field(&exif, Tag::Model),
        })
    }
}

pub fn parse_capture_time(raw: &str) -> Option<NaiveDateTime> {
    let normalized = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(normalized, EXIF_DATETIME_FORMAT).ok()
}

fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|raw| {
                String::from_utf8_lossy(raw)
                    .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string()
            })
            .find(|v| !v.is_empty()),
        _ => None,
    }
}
