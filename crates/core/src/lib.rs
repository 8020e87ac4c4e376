mod config;
mod driver;
mod error;
mod exif_reader;
mod extractor;
mod fs;
mod media;
mod metadata;
mod planner;
mod sanitize;
mod undo;
mod video_probe;
mod walker;

pub use config::{
    app_paths, init_config, load_config, load_config_from, save_config, save_config_to,
    AppConfig, AppPaths, VideoProberKind,
};
pub use driver::{read_directory_list, run_input, run_rename, InputMode, RunOptions, RunSummary};
pub use error::RunError;
pub use exif_reader::{parse_capture_time, ExifImageReader, ImageMetadataReader};
pub use extractor::{first_success, MetadataExtractor, TimestampStrategy};
pub use fs::{DirectoryListing, MediaFs, RealFs};
pub use media::{MediaFile, MediaKind};
pub use metadata::{camera_descriptor, CaptureRecord, ImageTags, TimestampSource, VideoProbe};
pub use planner::{
    compose_base_name, ClaimedNames, NameSynthesizer, RenamePlan, Synthesis,
    DEFAULT_ORDINAL_WIDTH,
};
pub use sanitize::{sanitize_descriptor, sanitize_event_label};
pub use undo::{persist_undo, undo_from, undo_last, RenameOperation, UndoResult};
pub use video_probe::{
    parse_exiftool_json, parse_ffprobe_json, parse_frame_rate, DisabledProber, ExifToolProber,
    FfprobeProber, ProbeError, VideoProber,
};
pub use walker::{
    resolve_event_label, DirectorySummary, FileOutcome, RootSummary, TreeWalker, WalkOptions,
};
