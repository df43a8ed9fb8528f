use std::path::PathBuf;

use engine_logging::engine_info;

use crate::csv::{render_csv, LeadSource, CSV_MIME_TYPE};
use crate::filename::{download_filename, DEFAULT_DOWNLOAD_PREFIX};
use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub dir: PathBuf,
    pub prefix: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("downloads"),
            prefix: DEFAULT_DOWNLOAD_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub filename: String,
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub rows: usize,
    pub bytes: u64,
}

/// Materialize the CSV for a finished run and save it under the download
/// directory.
pub fn save_csv_download(
    settings: &DownloadSettings,
    source: &dyn LeadSource,
    run_id: &str,
    row_limit: u32,
) -> Result<SavedDownload, PersistError> {
    let rows = source.rows(run_id, row_limit);
    let content = render_csv(&rows);
    let filename = download_filename(&settings.prefix, run_id);

    let writer = AtomicFileWriter::new(settings.dir.clone());
    let path = writer.write(&filename, content.as_bytes())?;
    engine_info!(
        "Saved {} ({}, {} rows, {} bytes) to {:?}",
        filename,
        CSV_MIME_TYPE,
        rows.len(),
        content.len(),
        path
    );

    Ok(SavedDownload {
        filename,
        path,
        mime_type: CSV_MIME_TYPE,
        rows: rows.len(),
        bytes: content.len() as u64,
    })
}
