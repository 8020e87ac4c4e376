use crate::exif_reader::{parse_capture_time, ImageMetadataReader};
use crate::fs::MediaFs;
use crate::media::{MediaFile, MediaKind};
use crate::metadata::{camera_descriptor, CaptureRecord, ImageTags, TimestampSource, VideoProbe};
use crate::video_probe::VideoProber;
use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use tracing::debug;

const IMAGE_TIMESTAMP_CHAIN: &[TimestampStrategy] = &[
    TimestampStrategy::EmbeddedCaptureTime,
    TimestampStrategy::FileModified,
];
const VIDEO_TIMESTAMP_CHAIN: &[TimestampStrategy] = &[TimestampStrategy::FileModified];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStrategy {
    EmbeddedCaptureTime,
    FileModified,
}

impl TimestampStrategy {
    pub fn chain_for(kind: MediaKind) -> &'static [TimestampStrategy] {
        match kind {
            MediaKind::Image => IMAGE_TIMESTAMP_CHAIN,
            MediaKind::Video => VIDEO_TIMESTAMP_CHAIN,
            MediaKind::Unsupported => &[],
        }
    }

    pub fn source(self) -> TimestampSource {
        match self {
            TimestampStrategy::EmbeddedCaptureTime => TimestampSource::EmbeddedCaptureTime,
            TimestampStrategy::FileModified => TimestampSource::FileModified,
        }
    }
}

pub fn first_success<F>(
    chain: &[TimestampStrategy],
    mut attempt: F,
) -> Option<(NaiveDateTime, TimestampSource)>
where
    F: FnMut(TimestampStrategy) -> Option<NaiveDateTime>,
{
    chain
        .iter()
        .find_map(|strategy| attempt(*strategy).map(|ts| (ts, strategy.source())))
}

pub struct MetadataExtractor<'a> {
    fs: &'a dyn MediaFs,
    images: &'a dyn ImageMetadataReader,
    videos: &'a dyn VideoProber,
}

impl<'a> MetadataExtractor<'a> {
    pub fn new(
        fs: &'a dyn MediaFs,
        images: &'a dyn ImageMetadataReader,
        videos: &'a dyn VideoProber,
    ) -> Self {
        Self { fs, images, videos }
    }

    /// Never fails; a missing timestamp is the caller's signal to skip.
    pub fn extract(&self, file: &MediaFile) -> CaptureRecord {
        match file.kind {
            MediaKind::Image => self.extract_image(file),
            MediaKind::Video => self.extract_video(file),
            MediaKind::Unsupported => CaptureRecord::default(),
        }
    }

    fn extract_image(&self, file: &MediaFile) -> CaptureRecord {
        let tags = match self.images.read_tags(&file.path) {
            Ok(tags) => Some(tags),
            Err(err) => {
                debug!(file = %file.path.display(), error = %err, "no embedded image metadata");
                None
            }
        };

        let resolved = first_success(TimestampStrategy::chain_for(file.kind), |strategy| {
            self.attempt(strategy, file, tags.as_ref())
        });
        let camera = tags
            .as_ref()
            .and_then(|t| camera_descriptor(t.make.as_deref(), t.model.as_deref()));

        CaptureRecord {
            timestamp: resolved.map(|(ts, _)| ts),
            timestamp_source: resolved.map(|(_, source)| source),
            camera,
            video: None,
        }
    }

    fn extract_video(&self, file: &MediaFile) -> CaptureRecord {
        let probe = match self.videos.probe(&file.path) {
            Ok(probe) => probe,
            Err(err) => {
                debug!(file = %file.path.display(), error = %err, "video probe failed");
                VideoProbe::default()
            }
        };

        let resolved = first_success(TimestampStrategy::chain_for(file.kind), |strategy| {
            self.attempt(strategy, file, None)
        });

        CaptureRecord {
            timestamp: resolved.map(|(ts, _)| ts),
            timestamp_source: resolved.map(|(_, source)| source),
            camera: probe.artist_descriptor(),
            video: probe.technical_descriptor(),
        }
    }

    pub fn attempt(
        &self,
        strategy: TimestampStrategy,
        file: &MediaFile,
        tags: Option<&ImageTags>,
    ) -> Option<NaiveDateTime> {
        let found = match strategy {
            TimestampStrategy::EmbeddedCaptureTime => tags
                .and_then(|t| t.date_time_original.as_deref())
                .and_then(parse_capture_time),
            TimestampStrategy::FileModified => match self.fs.modified(&file.path) {
                Ok(time) => {
                    let local: DateTime<Local> = DateTime::from(time);
                    local.naive_local().with_nanosecond(0)
                }
                Err(err) => {
                    debug!(file = %file.path.display(), error = %err, "modification time unavailable");
                    None
                }
            },
        };
        if found.is_none() {
            debug!(file = %file.path.display(), ?strategy, "timestamp strategy yielded nothing");
        }
        found
    }
}
