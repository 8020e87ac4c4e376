use crate::fs::MediaFs;
use crate::metadata::CaptureRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_ORDINAL_WIDTH: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenamePlan {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub ordinal: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    Rename(RenamePlan),
    Unchanged,
}

#[derive(Debug, Default)]
pub struct ClaimedNames {
    paths: HashSet<PathBuf>,
}

impl ClaimedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    fn claim(&mut self, path: PathBuf) {
        self.paths.insert(path);
    }

    pub fn release(&mut self, path: &Path) {
        self.paths.remove(path);
    }
}

/// `YYYY-MM-DD_HH-MM-SS_<event>[_<camera>][_<video>]`, or `None` without a timestamp.
pub fn compose_base_name(record: &CaptureRecord, event_label: &str) -> Option<String> {
    let mut base = format!("{}_{}", record.name_timestamp()?, event_label);
    for descriptor in [record.camera.as_deref(), record.video.as_deref()]
        .into_iter()
        .flatten()
    {
        base.push('_');
        base.push_str(descriptor);
    }
    Some(base)
}

pub struct NameSynthesizer<'a> {
    fs: &'a dyn MediaFs,
    ordinal_width: usize,
}

impl<'a> NameSynthesizer<'a> {
    pub fn new(fs: &'a dyn MediaFs, ordinal_width: usize) -> Self {
        Self {
            fs,
            ordinal_width: ordinal_width.max(1),
        }
    }

    /// Probes `<base>_<NN><ext>` upwards from zero until a name is neither on
    /// disk nor already claimed. Probing and claiming must stay sequential
    /// within a directory: each claim changes what the next probe sees.
    pub fn synthesize(
        &self,
        source: &Path,
        base_name: &str,
        extension: &str,
        claimed: &mut ClaimedNames,
    ) -> Result<Synthesis> {
        let directory = source
            .parent()
            .with_context(|| format!("file has no parent directory: {}", source.display()))?;

        if directory.join(format!("{}{}", base_name, extension)) == source {
            return Ok(Synthesis::Unchanged);
        }

        let mut ordinal = 0usize;
        loop {
            let candidate = directory.join(format!(
                "{}_{:0width$}{}",
                base_name,
                ordinal,
                extension,
                width = self.ordinal_width
            ));

            if candidate == source {
                claimed.claim(candidate);
                return Ok(Synthesis::Unchanged);
            }

            if !claimed.contains(&candidate) && !self.fs.exists(&candidate) {
                claimed.claim(candidate.clone());
                return Ok(Synthesis::Rename(RenamePlan {
                    source: source.to_path_buf(),
                    destination: candidate,
                    ordinal,
                }));
            }

            ordinal += 1;
        }
    }
}
