//! BIDS-style on-disk layout and sidecar tables.
//!
//! A recording is addressed by its entities (subject, session, task,
//! acquisition, run); [`BidsPath`] turns those into the standard
//! `sub-XX[/ses-YY]/ieeg/sub-XX[_ses-YY]_task-ZZ..._suffix.ext` paths.
//! Sidecar tables are tab-delimited with a header row:
//!
//! - `events.tsv`: `onset` (s), `duration` (s), `value` (integer code)
//! - annotation tables (e.g. word timing): `onset` (s), `offset` (s)
//! - `channels.tsv`: `name`, `type`, `status`
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Entity set addressing one recording inside a BIDS root.
#[derive(Debug, Clone)]
pub struct BidsPath {
    pub root: PathBuf,
    pub subject: String,
    pub session: Option<String>,
    pub task: String,
    pub acquisition: Option<String>,
    pub run: Option<String>,
}

impl BidsPath {
    pub fn new(root: impl Into<PathBuf>, subject: &str, task: &str) -> Self {
        Self {
            root: root.into(),
            subject: subject.to_string(),
            session: None,
            task: task.to_string(),
            acquisition: None,
            run: None,
        }
    }

    pub fn session(mut self, ses: &str) -> Self {
        self.session = Some(ses.to_string());
        self
    }

    pub fn acquisition(mut self, acq: &str) -> Self {
        self.acquisition = Some(acq.to_string());
        self
    }

    pub fn run(mut self, run: &str) -> Self {
        self.run = Some(run.to_string());
        self
    }

    /// `sub-XX[_ses-YY]_task-ZZ[_acq-AA][_run-RR]` filename stem.
    fn stem(&self) -> String {
        let mut s = format!("sub-{}", self.subject);
        if let Some(ses) = &self.session {
            s.push_str(&format!("_ses-{ses}"));
        }
        s.push_str(&format!("_task-{}", self.task));
        if let Some(acq) = &self.acquisition {
            s.push_str(&format!("_acq-{acq}"));
        }
        if let Some(run) = &self.run {
            s.push_str(&format!("_run-{run}"));
        }
        s
    }

    /// Directory holding the iEEG data for this subject/session.
    pub fn ieeg_dir(&self) -> PathBuf {
        let mut d = self.root.join(format!("sub-{}", self.subject));
        if let Some(ses) = &self.session {
            d.push(format!("ses-{ses}"));
        }
        d.push("ieeg");
        d
    }

    /// Continuous-recording container (`*_ieeg.safetensors`).
    pub fn recording_path(&self) -> PathBuf {
        self.ieeg_dir().join(format!("{}_ieeg.safetensors", self.stem()))
    }

    /// Event table (`*_events.tsv`).
    pub fn events_path(&self) -> PathBuf {
        self.ieeg_dir().join(format!("{}_events.tsv", self.stem()))
    }

    /// Channel-description table (`*_channels.tsv`).
    pub fn channels_path(&self) -> PathBuf {
        self.ieeg_dir().join(format!("{}_channels.tsv", self.stem()))
    }
}

/// One row of `events.tsv` (times in seconds).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EventRow {
    pub onset: f64,
    pub duration: f64,
    pub value: i64,
}

/// One row of an annotation table (times in seconds).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AnnotationSpan {
    pub onset: f64,
    pub offset: f64,
}

/// One row of `channels.tsv`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ch_type: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "good".to_string()
}

impl ChannelRecord {
    pub fn is_good(&self) -> bool {
        self.status != "bad"
    }
}

fn tsv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(Error::DataNotFound(path.to_path_buf()));
    }
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?)
}

/// Read `events.tsv` rows in file order.
pub fn read_events(path: &Path) -> Result<Vec<EventRow>> {
    let mut rdr = tsv_reader(path)?;
    let mut rows = Vec::new();
    for rec in rdr.deserialize() {
        rows.push(rec?);
    }
    Ok(rows)
}

/// Read an annotation table of onset/offset pairs.
pub fn read_annotations(path: &Path) -> Result<Vec<AnnotationSpan>> {
    let mut rdr = tsv_reader(path)?;
    let mut rows = Vec::new();
    for rec in rdr.deserialize() {
        rows.push(rec?);
    }
    Ok(rows)
}

/// Read `channels.tsv`.
pub fn read_channels(path: &Path) -> Result<Vec<ChannelRecord>> {
    let mut rdr = tsv_reader(path)?;
    let mut rows = Vec::new();
    for rec in rdr.deserialize() {
        rows.push(rec?);
    }
    Ok(rows)
}

/// Row indices of channels not marked `bad`, validated against the
/// recording's channel count. `channels.tsv` describes the rows of the
/// data array one-to-one; any other row count means the sidecar belongs
/// to a different recording.
pub fn good_channel_indices(records: &[ChannelRecord], n_channels: usize) -> Result<Vec<usize>> {
    if records.len() != n_channels {
        return Err(Error::MetadataInconsistency(format!(
            "channels.tsv lists {} channels but the recording has {}",
            records.len(),
            n_channels
        )));
    }
    Ok(records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_good())
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_entity_paths() {
        let p = BidsPath::new("/data/bids", "01", "listen")
            .session("01")
            .acquisition("clinical")
            .run("1");
        assert_eq!(
            p.recording_path(),
            PathBuf::from(
                "/data/bids/sub-01/ses-01/ieeg/\
                 sub-01_ses-01_task-listen_acq-clinical_run-1_ieeg.safetensors"
            )
        );
        assert_eq!(
            p.events_path().file_name().unwrap(),
            "sub-01_ses-01_task-listen_acq-clinical_run-1_events.tsv"
        );
    }

    #[test]
    fn minimal_entity_paths_skip_optional_parts() {
        let p = BidsPath::new("/bids", "07", "rest");
        assert_eq!(
            p.channels_path(),
            PathBuf::from("/bids/sub-07/ieeg/sub-07_task-rest_channels.tsv")
        );
    }

    #[test]
    fn missing_table_is_data_not_found() {
        let err = read_events(Path::new("/nonexistent/events.tsv")).unwrap_err();
        assert!(matches!(err, Error::DataNotFound(_)));
    }
}
