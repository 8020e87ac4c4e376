use crate::extractor::MetadataExtractor;
use crate::fs::{DirectoryListing, MediaFs};
use crate::media::MediaFile;
use crate::metadata::TimestampSource;
use crate::planner::{compose_base_name, ClaimedNames, NameSynthesizer, Synthesis};
use crate::sanitize::sanitize_event_label;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalkOptions {
    pub dry_run: bool,
    pub skip_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Renamed {
        from: PathBuf,
        to: PathBuf,
        timestamp_source: Option<TimestampSource>,
    },
    Planned {
        from: PathBuf,
        to: PathBuf,
        timestamp_source: Option<TimestampSource>,
    },
    Unchanged {
        path: PathBuf,
    },
    MetadataUnavailable {
        path: PathBuf,
    },
    RenameFailed {
        from: PathBuf,
        to: Option<PathBuf>,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub path: PathBuf,
    pub event_label: String,
    pub renamed: usize,
    pub planned: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub ignored: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl DirectorySummary {
    fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Renamed { .. } => self.renamed += 1,
            FileOutcome::Planned { .. } => self.planned += 1,
            FileOutcome::Unchanged { .. } => self.unchanged += 1,
            FileOutcome::MetadataUnavailable { .. } => self.skipped += 1,
            FileOutcome::RenameFailed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootSummary {
    pub root: PathBuf,
    pub event_label: String,
    pub directories: Vec<DirectorySummary>,
    pub unlabeled: Vec<PathBuf>,
}

impl RootSummary {
    pub fn renamed(&self) -> usize {
        self.directories.iter().map(|d| d.renamed).sum()
    }

    pub fn planned(&self) -> usize {
        self.directories.iter().map(|d| d.planned).sum()
    }

    pub fn skipped(&self) -> usize {
        self.directories.iter().map(|d| d.skipped).sum()
    }

    pub fn failed(&self) -> usize {
        self.directories.iter().map(|d| d.failed).sum()
    }

    pub fn applied_renames(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.directories
            .iter()
            .flat_map(|d| d.outcomes.iter())
            .filter_map(|outcome| match outcome {
                FileOutcome::Renamed { from, to, .. } => Some((from.as_path(), to.as_path())),
                _ => None,
            })
    }
}

/// Event label for `directory`: its own sanitized name, or the root's label
/// for non-root directories whose own name sanitizes to nothing.
pub fn resolve_event_label(directory: &Path, root: &Path, root_label: &str) -> Option<String> {
    let own = sanitize_event_label(&base_name(directory));
    if !own.is_empty() {
        return Some(own);
    }
    if directory == root || root_label.is_empty() {
        return None;
    }
    Some(root_label.to_string())
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub struct TreeWalker<'a> {
    fs: &'a dyn MediaFs,
    extractor: MetadataExtractor<'a>,
    synthesizer: NameSynthesizer<'a>,
    options: WalkOptions,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        fs: &'a dyn MediaFs,
        extractor: MetadataExtractor<'a>,
        synthesizer: NameSynthesizer<'a>,
        options: WalkOptions,
    ) -> Self {
        Self {
            fs,
            extractor,
            synthesizer,
            options,
        }
    }

    pub fn fs(&self) -> &'a dyn MediaFs {
        self.fs
    }

    pub fn process(&self, root: &Path) -> RootSummary {
        let root = self.resolve_root(root);
        let root_label = sanitize_event_label(&base_name(&root));
        info!(root = %root.display(), "processing directory tree");

        let mut summary = RootSummary {
            root: root.clone(),
            event_label: root_label.clone(),
            ..RootSummary::default()
        };

        for listing in self.fs.walk(&root) {
            if listing.files.is_empty() {
                continue;
            }

            let Some(label) = resolve_event_label(&listing.path, &root, &root_label) else {
                warn!(
                    directory = %listing.path.display(),
                    "no usable event label, leaving files in this directory alone"
                );
                summary.unlabeled.push(listing.path.clone());
                continue;
            };

            let dir_summary = self.process_directory(&listing, label);
            info!(
                directory = %dir_summary.path.display(),
                renamed = dir_summary.renamed,
                planned = dir_summary.planned,
                "directory done"
            );
            summary.directories.push(dir_summary);
        }

        info!(
            root = %summary.root.display(),
            renamed = summary.renamed(),
            "finished directory tree"
        );
        summary
    }

    // `.`, `..` and `dir/..` carry no base name of their own.
    fn resolve_root(&self, root: &Path) -> PathBuf {
        if root.file_name().is_some() {
            self.fs.absolute(root)
        } else {
            self.fs.canonicalize(root)
        }
    }

    fn process_directory(&self, listing: &DirectoryListing, label: String) -> DirectorySummary {
        let mut summary = DirectorySummary {
            path: listing.path.clone(),
            event_label: label,
            ..DirectorySummary::default()
        };
        let mut claimed = ClaimedNames::new();

        for path in &listing.files {
            let file = MediaFile::new(path.clone());
            if !file.kind.is_supported() || (self.options.skip_hidden && file.is_hidden()) {
                summary.ignored += 1;
                continue;
            }

            let outcome = self.process_file(&file, &summary.event_label, &mut claimed);
            summary.record(outcome);
        }

        summary
    }

    fn process_file(
        &self,
        file: &MediaFile,
        event_label: &str,
        claimed: &mut ClaimedNames,
    ) -> FileOutcome {
        let record = self.extractor.extract(file);
        let Some(base) = compose_base_name(&record, event_label) else {
            warn!(file = %file.path.display(), "could not determine a capture time, skipping");
            return FileOutcome::MetadataUnavailable {
                path: file.path.clone(),
            };
        };

        let plan = match self
            .synthesizer
            .synthesize(&file.path, &base, &file.extension, claimed)
        {
            Ok(Synthesis::Rename(plan)) => plan,
            Ok(Synthesis::Unchanged) => {
                return FileOutcome::Unchanged {
                    path: file.path.clone(),
                }
            }
            Err(err) => {
                error!(file = %file.path.display(), error = %err, "could not pick a new name");
                return FileOutcome::RenameFailed {
                    from: file.path.clone(),
                    to: None,
                    reason: format!("{err:#}"),
                };
            }
        };

        if self.options.dry_run {
            info!(from = %file.file_name(), to = %base_name(&plan.destination), "would rename");
            return FileOutcome::Planned {
                from: plan.source,
                to: plan.destination,
                timestamp_source: record.timestamp_source,
            };
        }

        match self.fs.rename(&plan.source, &plan.destination) {
            Ok(()) => {
                info!(from = %file.file_name(), to = %base_name(&plan.destination), "renamed");
                FileOutcome::Renamed {
                    from: plan.source,
                    to: plan.destination,
                    timestamp_source: record.timestamp_source,
                }
            }
            Err(err) => {
                error!(
                    from = %plan.source.display(),
                    to = %plan.destination.display(),
                    error = %err,
                    "rename failed"
                );
                claimed.release(&plan.destination);
                FileOutcome::RenameFailed {
                    from: plan.source,
                    to: Some(plan.destination),
                    reason: err.to_string(),
                }
            }
        }
    }
}
