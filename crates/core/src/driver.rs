use crate::config::{AppConfig, VideoProberKind};
use crate::error::RunError;
use crate::exif_reader::ExifImageReader;
use crate::extractor::MetadataExtractor;
use crate::fs::{MediaFs, RealFs};
use crate::planner::NameSynthesizer;
use crate::undo::{persist_undo, RenameOperation};
use crate::video_probe::{DisabledProber, ExifToolProber, FfprobeProber, VideoProber};
use crate::walker::{RootSummary, TreeWalker, WalkOptions};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Directory,
    ListFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub mode: InputMode,
    pub dry_run: bool,
    pub roots: Vec<RootSummary>,
    pub skipped_inputs: Vec<PathBuf>,
    pub list_empty: bool,
}

impl RunSummary {
    fn new(input: &Path, mode: InputMode, dry_run: bool) -> Self {
        Self {
            input: input.to_path_buf(),
            mode,
            dry_run,
            roots: Vec::new(),
            skipped_inputs: Vec::new(),
            list_empty: false,
        }
    }

    pub fn total_renamed(&self) -> usize {
        self.roots.iter().map(RootSummary::renamed).sum()
    }

    pub fn total_planned(&self) -> usize {
        self.roots.iter().map(RootSummary::planned).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.roots.iter().map(RootSummary::skipped).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.roots.iter().map(RootSummary::failed).sum()
    }

    pub fn applied_operations(&self) -> Vec<RenameOperation> {
        self.roots
            .iter()
            .flat_map(RootSummary::applied_renames)
            .map(|(from, to)| RenameOperation {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            })
            .collect()
    }
}

pub fn read_directory_list(fs: &dyn MediaFs, path: &Path) -> Result<Vec<PathBuf>, RunError> {
    let raw = fs
        .read_to_string(path)
        .map_err(|source| RunError::ListUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Runs a directory or a list file of directories. Only a missing or
/// unreadable top-level input is fatal.
pub fn run_input(walker: &TreeWalker<'_>, input: &Path, dry_run: bool) -> Result<RunSummary, RunError> {
    let fs = walker.fs();

    if fs.is_dir(input) {
        let mut summary = RunSummary::new(input, InputMode::Directory, dry_run);
        summary.roots.push(walker.process(input));
        return Ok(summary);
    }

    if !fs.is_file(input) {
        return Err(RunError::InputNotFound(input.to_path_buf()));
    }

    let mut summary = RunSummary::new(input, InputMode::ListFile, dry_run);
    let directories = read_directory_list(fs, input)?;
    if directories.is_empty() {
        warn!(list = %input.display(), "directory list is empty, nothing to do");
        summary.list_empty = true;
        return Ok(summary);
    }

    info!(list = %input.display(), count = directories.len(), "processing directory list");
    for directory in directories {
        if fs.is_dir(&directory) {
            summary.roots.push(walker.process(&directory));
        } else {
            warn!(path = %directory.display(), "not an existing directory, skipping list entry");
            summary.skipped_inputs.push(directory);
        }
    }

    info!(total_renamed = summary.total_renamed(), "run finished");
    Ok(summary)
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub dry_run: bool,
    pub skip_hidden: bool,
    pub ordinal_width: usize,
    pub video_prober: VideoProberKind,
    pub ffprobe_path: PathBuf,
    pub exiftool_path: Option<PathBuf>,
    pub undo_log: Option<PathBuf>,
}

impl RunOptions {
    pub fn from_config(input: impl Into<PathBuf>, config: &AppConfig) -> Self {
        Self {
            input: input.into(),
            dry_run: config.dry_run_default,
            skip_hidden: config.skip_hidden,
            ordinal_width: config.ordinal_width,
            video_prober: config.video_prober,
            ffprobe_path: PathBuf::from(&config.ffprobe_path),
            exiftool_path: config.exiftool_path.as_ref().map(PathBuf::from),
            undo_log: None,
        }
    }
}

pub fn run_rename(options: &RunOptions) -> Result<RunSummary> {
    let fs = RealFs;
    let images = ExifImageReader;
    let videos = build_prober(options);

    let extractor = MetadataExtractor::new(&fs, &images, videos.as_ref());
    let synthesizer = NameSynthesizer::new(&fs, options.ordinal_width);
    let walker = TreeWalker::new(
        &fs,
        extractor,
        synthesizer,
        WalkOptions {
            dry_run: options.dry_run,
            skip_hidden: options.skip_hidden,
        },
    );

    let summary = run_input(&walker, &options.input, options.dry_run)?;

    if let Some(undo_log) = options.undo_log.as_deref() {
        let operations = summary.applied_operations();
        if !options.dry_run && !operations.is_empty() {
            if let Err(err) = persist_undo(undo_log, &operations) {
                warn!(error = %format!("{err:#}"), "renames applied but the undo log could not be written");
            }
        }
    }

    Ok(summary)
}

fn build_prober(options: &RunOptions) -> Box<dyn VideoProber> {
    match options.video_prober {
        VideoProberKind::Ffprobe => Box::new(FfprobeProber::new(&options.ffprobe_path)),
        VideoProberKind::Exiftool => match ExifToolProber::new(options.exiftool_path.as_deref()) {
            Ok(prober) => Box::new(prober),
            Err(err) => {
                warn!(error = %err, "exiftool unavailable, video descriptors disabled");
                Box::new(DisabledProber)
            }
        },
        VideoProberKind::None => Box::new(DisabledProber),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif_reader::ImageMetadataReader;
    use crate::fs::memory::MemoryFs;
    use crate::metadata::ImageTags;
    use crate::planner::DEFAULT_ORDINAL_WIDTH;
    use anyhow::anyhow;
    use chrono::{Local, NaiveDate, TimeZone};
    use std::time::SystemTime;

    struct NoImages;

    impl ImageMetadataReader for NoImages {
        fn read_tags(&self, _path: &Path) -> anyhow::Result<ImageTags> {
            Err(anyhow!("no exif"))
        }
    }

    fn mtime() -> Option<SystemTime> {
        let naive = NaiveDate::from_ymd_opt(2023, 12, 25)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid date");
        Local
            .from_local_datetime(&naive)
            .single()
            .map(Into::into)
    }

    fn with_walker<T>(fs: &MemoryFs, f: impl FnOnce(&TreeWalker<'_>) -> T) -> T {
        let extractor = MetadataExtractor::new(fs, &NoImages, &DisabledProber);
        let synthesizer = NameSynthesizer::new(fs, DEFAULT_ORDINAL_WIDTH);
        let walker = TreeWalker::new(fs, extractor, synthesizer, WalkOptions::default());
        f(&walker)
    }

    #[test]
    fn list_file_skips_missing_entries_and_totals_valid_ones() {
        let fs = MemoryFs::new();
        fs.add_file("/media/Xmas/a.mov", mtime());
        fs.add_file("/media/Xmas/b.jpg", mtime());
        fs.add_text("/lists/dirs.txt", "/media/missing\n\n   \n/media/Xmas\n");

        let summary = with_walker(&fs, |w| run_input(w, Path::new("/lists/dirs.txt"), false))
            .expect("run");

        assert_eq!(summary.mode, InputMode::ListFile);
        assert_eq!(summary.skipped_inputs, vec![PathBuf::from("/media/missing")]);
        assert_eq!(summary.roots.len(), 1);
        assert_eq!(summary.total_renamed(), 2);
        assert_eq!(summary.applied_operations().len(), 2);
    }

    #[test]
    fn empty_list_file_is_not_an_error() {
        let fs = MemoryFs::new();
        fs.add_text("/lists/empty.txt", "\n  \n");

        let summary = with_walker(&fs, |w| run_input(w, Path::new("/lists/empty.txt"), false))
            .expect("run");

        assert!(summary.list_empty);
        assert!(summary.roots.is_empty());
        assert_eq!(summary.total_renamed(), 0);
    }

    #[test]
    fn missing_top_level_input_is_fatal() {
        let fs = MemoryFs::new();
        let err = with_walker(&fs, |w| run_input(w, Path::new("/nope"), false))
            .expect_err("must fail");
        assert!(matches!(err, RunError::InputNotFound(path) if path == Path::new("/nope")));
    }

    #[test]
    fn single_directory_input_processes_that_tree() {
        let fs = MemoryFs::new();
        fs.add_file("/media/Xmas/a.mov", mtime());

        let summary =
            with_walker(&fs, |w| run_input(w, Path::new("/media/Xmas"), false)).expect("run");

        assert_eq!(summary.mode, InputMode::Directory);
        assert_eq!(summary.total_renamed(), 1);
        assert_eq!(
            fs.file_names(Path::new("/media/Xmas")),
            vec!["2023-12-25_10-00-00_Xmas_00.mov".to_string()]
        );
    }

    #[test]
    fn directory_list_trims_lines() {
        let fs = MemoryFs::new();
        fs.add_text("/l.txt", "  /a  \r\n\n/b\n");
        assert_eq!(
            read_directory_list(&fs, Path::new("/l.txt")).expect("read"),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert!(matches!(
            read_directory_list(&fs, Path::new("/missing.txt")),
            Err(RunError::ListUnreadable { .. })
        ));
    }

    #[test]
    fn options_follow_config() {
        let config = AppConfig {
            video_prober: VideoProberKind::None,
            skip_hidden: true,
            ordinal_width: 4,
            dry_run_default: true,
            exiftool_path: Some("/opt/et".to_string()),
            ..AppConfig::default()
        };
        let options = RunOptions::from_config("/photos", &config);
        assert!(options.dry_run);
        assert!(options.skip_hidden);
        assert_eq!(options.ordinal_width, 4);
        assert_eq!(options.exiftool_path, Some(PathBuf::from("/opt/et")));
        assert_eq!(options.undo_log, None);
    }
}
