use crate::sanitize::sanitize_descriptor;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const NAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimestampSource {
    EmbeddedCaptureTime,
    FileModified,
}

/// What could be determined about one media file.
///
/// `timestamp == None` is the only hard failure; descriptors are best-effort.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CaptureRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub timestamp_source: Option<TimestampSource>,
    pub camera: Option<String>,
    pub video: Option<String>,
}

impl CaptureRecord {
    pub fn name_timestamp(&self) -> Option<String> {
        self.timestamp
            .map(|ts| ts.format(NAME_TIMESTAMP_FORMAT).to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTags {
    pub date_time_original: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoProbe {
    pub avg_frame_rate: Option<f64>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub artist: Option<String>,
}

impl VideoProbe {
    pub fn technical_descriptor(&self) -> Option<String> {
        let fps = self.avg_frame_rate.filter(|v| v.is_finite() && *v > 0.0)?;
        let width = self.width.filter(|v| *v > 0)?;
        let height = self.height.filter(|v| *v > 0)?;
        Some(format!("{}fps_{}x{}", fps.round() as u64, width, height))
    }

    pub fn artist_descriptor(&self) -> Option<String> {
        self.artist.as_deref().and_then(sanitize_descriptor)
    }
}

pub fn camera_descriptor(make: Option<&str>, model: Option<&str>) -> Option<String> {
    let make = make.map(str::trim).unwrap_or_default();
    let model = model.map(str::trim).unwrap_or_default();
    if make.is_empty() && model.is_empty() {
        return None;
    }
    sanitize_descriptor(&format!("{} {}", make, model))
}
