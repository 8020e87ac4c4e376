use crate::metadata::VideoProbe;
use exiftool::ExifTool;
use serde_json::Value;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

const ARTIST_KEYS: &[&str] = &["artist", "author"];

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
    #[error("prober output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("exiftool failed: {0}")]
    ExifTool(#[from] exiftool::ExifToolError),
}

pub trait VideoProber {
    fn probe(&self, path: &Path) -> Result<VideoProbe, ProbeError>;
}

#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl VideoProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<VideoProbe, ProbeError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Launch {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                program,
                status: output.status,
            });
        }

        let parsed: Value = serde_json::from_slice(&output.stdout)?;
        Ok(parse_ffprobe_json(&parsed))
    }
}

pub struct ExifToolProber {
    tool: RefCell<ExifTool>,
}

impl ExifToolProber {
    pub fn new(executable: Option<&Path>) -> Result<Self, ProbeError> {
        let tool = match executable {
            Some(path) => ExifTool::with_executable(path)?,
            None => ExifTool::new()?,
        };
        Ok(Self {
            tool: RefCell::new(tool),
        })
    }
}

impl std::fmt::Debug for ExifToolProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExifToolProber").finish_non_exhaustive()
    }
}

impl VideoProber for ExifToolProber {
    fn probe(&self, path: &Path) -> Result<VideoProbe, ProbeError> {
        let value = self.tool.borrow_mut().json(path, &["-n"])?;
        Ok(parse_exiftool_json(&value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProber;

impl VideoProber for DisabledProber {
    fn probe(&self, _path: &Path) -> Result<VideoProbe, ProbeError> {
        Ok(VideoProbe::default())
    }
}

pub fn parse_ffprobe_json(value: &Value) -> VideoProbe {
    let video_stream = value
        .get("streams")
        .and_then(Value::as_array)
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.get("codec_type").and_then(Value::as_str) == Some("video"))
        });

    let artist = value
        .get("format")
        .and_then(|f| f.get("tags"))
        .and_then(find_artist)
        .or_else(|| {
            video_stream
                .and_then(|s| s.get("tags"))
                .and_then(find_artist)
        });

    VideoProbe {
        avg_frame_rate: video_stream
            .and_then(|s| s.get("avg_frame_rate"))
            .and_then(parse_frame_rate),
        width: video_stream.and_then(|s| s.get("width")).and_then(as_u64),
        height: video_stream.and_then(|s| s.get("height")).and_then(as_u64),
        artist,
    }
}

pub fn parse_exiftool_json(value: &Value) -> VideoProbe {
    let value = match value.as_array() {
        Some(items) => match items.first() {
            Some(first) => first,
            None => return VideoProbe::default(),
        },
        None => value,
    };

    VideoProbe {
        avg_frame_rate: value
            .get("VideoFrameRate")
            .or_else(|| value.get("FrameRate"))
            .and_then(parse_frame_rate),
        width: value.get("ImageWidth").and_then(as_u64),
        height: value.get("ImageHeight").and_then(as_u64),
        artist: find_artist(value),
    }
}

/// Accepts integers, decimals and fractions such as `30000/1001`.
pub fn parse_frame_rate(value: &Value) -> Option<f64> {
    if let Some(fps) = value.as_f64() {
        return Some(fps);
    }
    let text = value.as_str()?.trim();
    if let Some((num, den)) = text.split_once('/') {
        let num = num.trim().parse::<f64>().ok()?;
        let den = den.trim().parse::<f64>().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    text.parse::<f64>().ok()
}

fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn find_artist(tags: &Value) -> Option<String> {
    let map = tags.as_object()?;
    ARTIST_KEYS.iter().find_map(|wanted| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(wanted))
            .and_then(|(_, v)| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frame_rate_accepts_fraction_and_decimal() {
        assert_eq!(parse_frame_rate(&json!("30/1")), Some(30.0));
        assert_eq!(parse_frame_rate(&json!("25")), Some(25.0));
        assert_eq!(parse_frame_rate(&json!(59.94)), Some(59.94));
        let ntsc = parse_frame_rate(&json!("30000/1001")).expect("fraction");
        assert!((ntsc - 29.97).abs() < 0.01);
    }

    #[test]
    fn frame_rate_rejects_zero_denominator_and_garbage() {
        assert_eq!(parse_frame_rate(&json!("0/0")), None);
        assert_eq!(parse_frame_rate(&json!("fast")), None);
        assert_eq!(parse_frame_rate(&json!(null)), None);
    }

    #[test]
    fn ffprobe_json_uses_first_video_stream() {
        let value = json!({
            "streams": [
                { "codec_type": "audio", "avg_frame_rate": "0/0" },
                { "codec_type": "video", "avg_frame_rate": "30000/1001", "width": 1920, "height": 1080 }
            ],
            "format": { "tags": { "ARTIST": "  DJI Pocket  " } }
        });
        let probe = parse_ffprobe_json(&value);
        assert_eq!(probe.width, Some(1920));
        assert_eq!(probe.height, Some(1080));
        assert_eq!(probe.artist.as_deref(), Some("DJI Pocket"));
        assert_eq!(
            probe.technical_descriptor().as_deref(),
            Some("30fps_1920x1080")
        );
    }

    #[test]
    fn ffprobe_json_without_video_stream_is_empty() {
        let value = json!({
            "streams": [{ "codec_type": "audio" }],
            "format": { "tags": { "author": "" } }
        });
        assert_eq!(parse_ffprobe_json(&value), VideoProbe::default());
    }

    #[test]
    fn exiftool_json_reads_numeric_fields() {
        let value = json!([{
            "VideoFrameRate": 59.94,
            "ImageWidth": 3840,
            "ImageHeight": 2160,
            "Author": "GoPro"
        }]);
        let probe = parse_exiftool_json(&value);
        assert_eq!(
            probe.technical_descriptor().as_deref(),
            Some("60fps_3840x2160")
        );
        assert_eq!(probe.artist.as_deref(), Some("GoPro"));
    }

    #[test]
    fn disabled_prober_reports_nothing() {
        let probe = DisabledProber
            .probe(Path::new("/nowhere/clip.mp4"))
            .expect("disabled prober never fails");
        assert_eq!(probe, VideoProbe::default());
    }

    #[test]
    fn missing_ffprobe_binary_is_a_launch_error() {
        let prober = FfprobeProber::new("/definitely/not/ffprobe");
        let err = prober
            .probe(Path::new("clip.mov"))
            .expect_err("binary does not exist");
        assert!(matches!(err, ProbeError::Launch { .. }));
    }
}
