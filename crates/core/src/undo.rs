use crate::config::app_paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameOperation {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UndoLog {
    operations: Vec<RenameOperation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UndoResult {
    pub restored: usize,
    pub missing: usize,
    pub conflicts: usize,
}

pub fn persist_undo(path: &Path, operations: &[RenameOperation]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create undo directory: {}", dir.display()))?;
    }

    let log = UndoLog {
        operations: operations.to_vec(),
    };
    let body = serde_json::to_string_pretty(&log).context("could not serialize undo log")?;
    fs::write(path, body)
        .with_context(|| format!("could not write undo log: {}", path.display()))?;
    Ok(())
}

pub fn undo_last() -> Result<UndoResult> {
    undo_from(&app_paths()?.undo_path)
}

pub fn undo_from(path: &Path) -> Result<UndoResult> {
    if !path.exists() {
        anyhow::bail!("nothing to undo: {} does not exist", path.display());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read undo log: {}", path.display()))?;
    let log = serde_json::from_str::<UndoLog>(&raw)
        .with_context(|| format!("undo log is corrupt: {}", path.display()))?;

    let result = restore_operations(&log.operations)?;

    fs::remove_file(path)
        .with_context(|| format!("could not remove undo log: {}", path.display()))?;
    Ok(result)
}

fn restore_operations(operations: &[RenameOperation]) -> Result<UndoResult> {
    let mut result = UndoResult::default();
    for op in operations.iter().rev() {
        if !op.to.exists() {
            result.missing += 1;
            continue;
        }
        if op.from.exists() {
            result.conflicts += 1;
            continue;
        }
        fs::rename(&op.to, &op.from).with_context(|| {
            format!(
                "could not restore {} -> {}",
                op.to.display(),
                op.from.display()
            )
        })?;
        result.restored += 1;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn undo_restores_and_removes_log() {
        let temp = tempdir().expect("tempdir");
        let from = temp.path().join("IMG_0001.jpg");
        let to = temp.path().join("2024-03-01_14-05-00_Birthday_00.jpg");
        fs::write(&to, b"A").expect("write renamed");
        let log_path = temp.path().join("state").join("undo-last.json");

        persist_undo(
            &log_path,
            &[RenameOperation {
                from: from.clone(),
                to: to.clone(),
            }],
        )
        .expect("persist");

        let result = undo_from(&log_path).expect("undo");
        assert_eq!(result.restored, 1);
        assert!(from.exists());
        assert!(!to.exists());
        assert!(!log_path.exists());
    }

    #[test]
    fn restore_counts_missing_and_conflicting_entries() {
        let temp = tempdir().expect("tempdir");
        let gone_to = temp.path().join("gone_00.jpg");
        let taken_from = temp.path().join("a.jpg");
        let taken_to = temp.path().join("a_00.jpg");
        fs::write(&taken_from, b"new").expect("write occupant");
        fs::write(&taken_to, b"old").expect("write renamed");

        let result = restore_operations(&[
            RenameOperation {
                from: temp.path().join("gone.jpg"),
                to: gone_to,
            },
            RenameOperation {
                from: taken_from.clone(),
                to: taken_to.clone(),
            },
        ])
        .expect("restore");

        assert_eq!(
            result,
            UndoResult {
                restored: 0,
                missing: 1,
                conflicts: 1,
            }
        );
        assert_eq!(fs::read(&taken_from).expect("read"), b"new");
        assert!(taken_to.exists());
    }

    #[test]
    fn undo_without_log_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let err = undo_from(&temp.path().join("undo-last.json")).expect_err("must fail");
        assert!(err.to_string().contains("nothing to undo"));
    }
}
