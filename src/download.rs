// Batch download of resource files and assignment attachments.
//
// Each file is fetched and written on its own: a failure is reported on the
// warning sink and the batch moves on to the next file.

use indicatif::ProgressBar;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::client::ContentSource;
use crate::error::{PandaError, Result};
use crate::model::PandaFile;

#[derive(Debug)]
pub enum FileOutcome {
    Saved(PathBuf),
    Excluded,
    Failed(PandaError),
}

/// One outcome per input file, in input order.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub outcomes: Vec<(String, FileOutcome)>,
    /// Targets written more than once in this run; the last file wins.
    pub overwritten: Vec<PathBuf>,
}

impl DownloadReport {
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Saved(_)))
    }

    pub fn excluded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Excluded))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

pub struct BatchDownloader {
    base_dir: PathBuf,
    excludes: HashSet<String>,
    progress: ProgressBar,
}

impl BatchDownloader {
    pub fn new(base_dir: impl Into<PathBuf>, excludes: impl IntoIterator<Item = String>) -> Self {
        BatchDownloader {
            base_dir: base_dir.into(),
            excludes: excludes.into_iter().collect(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// A name without extension matches an empty exclude entry (`-e ""`).
    pub fn is_excluded(&self, file: &PandaFile) -> bool {
        self.excludes.contains(file.ext().unwrap_or(""))
    }

    /// Download every file that is not excluded. Failures are written to
    /// `warnings` as `WARN: skipped download: "<filename>"`.
    pub fn run<C, W>(&self, source: &C, files: &[PandaFile], warnings: &mut W) -> DownloadReport
    where
        C: ContentSource + ?Sized,
        W: Write,
    {
        let mut report = DownloadReport::default();
        let mut written = HashSet::new();
        self.progress.set_length(files.len() as u64);
        for file in files {
            self.progress
                .set_message(format!("Downloading \"{}\"", file.filename));
            let outcome = if self.is_excluded(file) {
                debug!(file = %file.filename, "excluded by extension");
                FileOutcome::Excluded
            } else {
                match self.fetch_one(source, file) {
                    Ok(path) => {
                        if !written.insert(path.clone()) {
                            debug!(path = %path.display(), "overwrote a file from this batch");
                            report.overwritten.push(path.clone());
                        }
                        FileOutcome::Saved(path)
                    }
                    Err(e) => {
                        debug!(file = %file.filename, error = %e, "download failed");
                        let line = format!("WARN: skipped download: \"{}\"", file.filename);
                        if let Err(we) = self.progress.suspend(|| writeln!(warnings, "{line}")) {
                            debug!(error = %we, "could not write warning");
                        }
                        FileOutcome::Failed(e)
                    }
                }
            };
            report.outcomes.push((file.filename.clone(), outcome));
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();
        report
    }

    fn fetch_one<C>(&self, source: &C, file: &PandaFile) -> Result<PathBuf>
    where
        C: ContentSource + ?Sized,
    {
        let content = source.download_content(&file.path)?;
        let dir = self.base_dir.join(&file.directory);
        std::fs::create_dir_all(&dir).map_err(|e| PandaError::io(&dir, e))?;
        let target = dir.join(&file.filename);
        save(&target, &content)?;
        info!(path = %target.display(), bytes = content.len(), "saved");
        Ok(target)
    }
}

fn save(target: &Path, content: &[u8]) -> Result<()> {
    let mut out = std::fs::File::create(target).map_err(|e| PandaError::io(target, e))?;
    out.write_all(content).map_err(|e| PandaError::io(target, e))
}
