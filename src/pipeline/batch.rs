use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::{import_recording, HostScene, ImportReport};
use crate::core::{RecordingSource, Warning};
use crate::options::ImportOptions;
use crate::util::{Error, Result};

/// A file that failed to import.
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of a multi-file import.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub imported: Vec<ImportReport>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.imported.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Warnings of every imported file, in file order.
    pub fn warnings(&self) -> impl Iterator<Item = (&str, &Warning)> {
        self.imported
            .iter()
            .flat_map(|r| r.warnings.iter().map(move |w| (r.name.as_str(), w)))
    }
}

/// Recording name derived from a path: the file stem.
pub fn recording_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Import several files into one host.
///
/// `open` turns a path into a recording source. A file that fails to open or
/// import is recorded in the report and the batch moves on.
pub fn import_batch<P, R, H, F>(paths: &[P], mut open: F, options: &ImportOptions, host: &mut H) -> BatchReport
where
    P: AsRef<Path>,
    R: RecordingSource,
    H: HostScene + ?Sized,
    F: FnMut(&Path) -> Result<R>,
{
    let mut report = BatchReport::default();
    for path in paths {
        let path = path.as_ref();
        let name = recording_name(path);
        let result = open(path).and_then(|mut source| import_recording(&name, &mut source, options, host));
        match result {
            Ok(r) => report.imported.push(r),
            Err(e) => {
                error!("Failed to import {}: {}", path.display(), e);
                report.failed.push(BatchFailure {
                    path: path.to_path_buf(),
                    error: e,
                });
            }
        }
    }
    info!(
        "Batch import: {} succeeded, {} failed",
        report.succeeded(),
        report.failed.len()
    );
    report
}
