//! Safetensors I/O for recordings and exported epoch arrays.
//!
//! The continuous recording enters the pipeline as a safetensors container
//! (full neuroimaging-format readers are out of scope; a small converter
//! script produces this file from the original header/data pair). The parser
//! is self-contained — no dependency on the `safetensors` crate's tensor
//! types, we only need raw bytes → ndarray.
use crate::epochs::Epochs;
use crate::error::{Error, Result};
use ndarray::{Array2, Array3};
use std::collections::HashMap;
use std::path::Path;

// ── Low-level safetensors parsing ────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        return Err(Error::MetadataInconsistency(
            "safetensors file too small".into(),
        ));
    }
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    if bytes.len() < 8 + n {
        return Err(Error::MetadataInconsistency(
            "safetensors header extends past end of file".into(),
        ));
    }
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..8 + n])
        .map_err(|e| Error::MetadataInconsistency(format!("bad safetensors header: {e}")))?;
    Ok((header, 8 + n))
}

fn entry_field<'a>(
    entry: &'a serde_json::Value,
    field: &str,
) -> Result<&'a Vec<serde_json::Value>> {
    entry[field]
        .as_array()
        .ok_or_else(|| Error::MetadataInconsistency(format!("missing tensor field '{field}'")))
}

/// The `[start, end]` byte range of a tensor entry, validated for arity.
fn data_range(entry: &serde_json::Value) -> Result<(usize, usize)> {
    let offsets = entry_field(entry, "data_offsets")?;
    if offsets.len() != 2 {
        return Err(Error::MetadataInconsistency(format!(
            "'data_offsets' must hold [start, end], got {} values",
            offsets.len()
        )));
    }
    let s = offsets[0].as_u64().unwrap_or(0) as usize;
    let e = offsets[1].as_u64().unwrap_or(0) as usize;
    Ok((s, e))
}

fn read_f32_tensor(bytes: &[u8], data_start: usize, entry: &serde_json::Value) -> Result<Vec<f32>> {
    let (s, e) = data_range(entry)?;
    let raw = bytes
        .get(data_start + s..data_start + e)
        .ok_or_else(|| Error::MetadataInconsistency("tensor offsets out of range".into()))?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn shape_of(entry: &serde_json::Value) -> Result<Vec<usize>> {
    Ok(entry_field(entry, "shape")?
        .iter()
        .map(|v| v.as_u64().unwrap_or(0) as usize)
        .collect())
}

// ── Continuous recording ─────────────────────────────────────────────────────

/// A continuous iEEG recording with its metadata.
#[derive(Debug)]
pub struct Recording {
    /// [C, T] signal at the acquisition rate.
    pub data: Array2<f32>,
    /// Sampling rate (Hz).
    pub sfreq: f32,
    /// Channel names, one per row of `data`.
    pub ch_names: Vec<String>,
    /// Mains frequency if recorded in the metadata (Hz).
    pub line_freq: Option<f32>,
    /// Acquisition lowpass cutoff if recorded (Hz).
    pub lowpass: Option<f32>,
}

impl Recording {
    /// Load a recording container.
    ///
    /// Required keys: `data` [C, T], `sfreq` [1]. Optional: `ch_names`
    /// (newline-joined U8 string), `line_freq` [1], `lowpass` [1]. A
    /// `ch_names` count disagreeing with the data's channel axis is a
    /// metadata inconsistency.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DataNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let (header, data_start) = parse_header(&bytes)?;

        let data_entry = header
            .get("data")
            .ok_or_else(|| Error::MetadataInconsistency("missing 'data' tensor".into()))?;
        let shape = shape_of(data_entry)?;
        if shape.len() != 2 {
            return Err(Error::MetadataInconsistency(format!(
                "'data' must be 2-D [channels, samples], got {shape:?}"
            )));
        }
        let data_vec = read_f32_tensor(&bytes, data_start, data_entry)?;
        let data = Array2::from_shape_vec((shape[0], shape[1]), data_vec)?;

        let sfreq_entry = header
            .get("sfreq")
            .ok_or_else(|| Error::MetadataInconsistency("missing 'sfreq' tensor".into()))?;
        let sfreq = *read_f32_tensor(&bytes, data_start, sfreq_entry)?
            .first()
            .ok_or_else(|| Error::MetadataInconsistency("empty 'sfreq' tensor".into()))?;
        if sfreq <= 0.0 {
            return Err(Error::MetadataInconsistency(format!(
                "non-positive sampling rate {sfreq}"
            )));
        }

        let scalar = |key: &str| -> Result<Option<f32>> {
            match header.get(key) {
                Some(e) => Ok(read_f32_tensor(&bytes, data_start, e)?.first().copied()),
                None => Ok(None),
            }
        };
        let line_freq = scalar("line_freq")?;
        let lowpass = scalar("lowpass")?;

        let ch_names: Vec<String> = match header.get("ch_names") {
            Some(e) => {
                let (s, end) = data_range(e)?;
                let raw = bytes
                    .get(data_start + s..data_start + end)
                    .ok_or_else(|| {
                        Error::MetadataInconsistency("ch_names offsets out of range".into())
                    })?;
                let text = std::str::from_utf8(raw).map_err(|e| {
                    Error::MetadataInconsistency(format!("ch_names not UTF-8: {e}"))
                })?;
                text.split('\n').filter(|s| !s.is_empty()).map(String::from).collect()
            }
            // Fall back to positional names.
            None => (0..data.nrows()).map(|i| format!("ch{i}")).collect(),
        };
        if ch_names.len() != data.nrows() {
            return Err(Error::MetadataInconsistency(format!(
                "{} channel names for {} data rows",
                ch_names.len(),
                data.nrows()
            )));
        }

        Ok(Recording { data, sfreq, ch_names, line_freq, lowpass })
    }

    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }
}

// ── Safetensors writer ───────────────────────────────────────────────────────

/// Minimal safetensors writer handling F32 and F64 tensors plus one U8
/// string tensor for channel names.
pub struct TensorWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl Default for TensorWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TensorWriter {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    /// Newline-joined strings stored as a U8 tensor.
    pub fn add_strings(&mut self, name: &str, items: &[String]) {
        let joined = items.join("\n");
        let bytes = joined.into_bytes();
        let n = bytes.len();
        self.entries.push((name.to_string(), bytes, "U8", vec![n]));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(
                name.clone(),
                serde_json::json!({
                    "dtype": dtype,
                    "shape": shape,
                    "data_offsets": [offset, offset + data.len()],
                }),
            );
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)
            .map_err(|e| Error::MetadataInconsistency(format!("header encode: {e}")))?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes
            .into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

/// Write a recording container (the inverse of [`Recording::load`], used by
/// converters and test fixtures).
pub fn write_recording(rec: &Recording, path: &Path) -> Result<()> {
    let mut w = TensorWriter::new();
    let flat: Vec<f32> = rec.data.iter().copied().collect();
    w.add_f32("data", &flat, &[rec.data.nrows(), rec.data.ncols()]);
    w.add_f32("sfreq", &[rec.sfreq], &[1]);
    if let Some(lf) = rec.line_freq {
        w.add_f32("line_freq", &[lf], &[1]);
    }
    if let Some(lp) = rec.lowpass {
        w.add_f32("lowpass", &[lp], &[1]);
    }
    w.add_strings("ch_names", &rec.ch_names);
    w.write(path)
}

/// Export an epoch collection as a dense `[trials, channels, samples]` F32
/// tensor plus its time axis in seconds, consumable by external tools.
pub fn export_epochs(epochs: &Epochs, path: &Path) -> Result<()> {
    let (n_e, n_c, n_t) = epochs.data.dim();
    let mut w = TensorWriter::new();
    let flat: Vec<f32> = epochs.data.iter().copied().collect();
    w.add_f32("epochs", &flat, &[n_e, n_c, n_t]);
    w.add_f64("times", &epochs.times(), &[n_t]);
    w.add_strings("ch_names", &epochs.ch_names);
    w.write(path)
}

/// Read back an exported epoch tensor (shape only; used by round-trip
/// checks and downstream consumers written in Rust).
pub fn read_epoch_tensor(path: &Path) -> Result<(Array3<f32>, Vec<f64>)> {
    if !path.exists() {
        return Err(Error::DataNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let (header, data_start) = parse_header(&bytes)?;

    let entry = header
        .get("epochs")
        .ok_or_else(|| Error::MetadataInconsistency("missing 'epochs' tensor".into()))?;
    let shape = shape_of(entry)?;
    if shape.len() != 3 {
        return Err(Error::MetadataInconsistency(format!(
            "'epochs' must be 3-D, got {shape:?}"
        )));
    }
    let vals = read_f32_tensor(&bytes, data_start, entry)?;
    let arr = Array3::from_shape_vec((shape[0], shape[1], shape[2]), vals)?;

    let times_entry = header
        .get("times")
        .ok_or_else(|| Error::MetadataInconsistency("missing 'times' tensor".into()))?;
    let (s, e) = data_range(times_entry)?;
    let raw = bytes
        .get(data_start + s..data_start + e)
        .ok_or_else(|| Error::MetadataInconsistency("times offsets out of range".into()))?;
    let times: Vec<f64> = raw
        .chunks_exact(8)
        .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
        .collect();

    Ok((arr, times))
}
