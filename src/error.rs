//! Error taxonomy for the analysis pipeline.
//!
//! Every fallible operation in the crate returns [`Result`]. Binaries are
//! free to wrap this in `anyhow`; the library keeps the variants explicit so
//! callers can distinguish a missing file from a malformed plot request.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required input file or directory does not exist.
    #[error("data not found: {0}")]
    DataNotFound(PathBuf),

    /// Sampling rate or channel count disagrees between pipeline stages.
    #[error("metadata inconsistency: {0}")]
    MetadataInconsistency(String),

    /// A non-empty event list produced zero epochs: every window extended
    /// past the recording bounds. Individual out-of-bounds events are
    /// dropped with a warning instead.
    #[error("no event window fits inside the recording")]
    EventOutOfBounds,

    /// Invalid grid-plot request (bad color, channel count mismatch, ...).
    #[error("plot configuration: {0}")]
    PlotConfiguration(String),

    /// Malformed delimited sidecar table.
    #[error("sidecar parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Failure in the plotting backend while rendering.
    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
