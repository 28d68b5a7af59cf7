//! Append-only sample writer for crash-safe logging.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use inkstream_common::error::{InkstreamError, InkstreamResult};
use inkstream_sample_model::{Sample, SampleStreamHeader};

/// Writes samples to a JSONL file in append-only mode.
pub struct SampleWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    samples_written: u64,
}

impl SampleWriter {
    /// Create a new sample writer, writing the header as the first line.
    pub fn new(path: PathBuf, header: SampleStreamHeader) -> InkstreamResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        // Write header as a comment line (prefixed with #)
        let header_json = serde_json::to_string(&header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| InkstreamError::source(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path,
            samples_written: 0,
        })
    }

    /// Write a single sample as a JSONL line.
    pub fn write_sample(&mut self, sample: &Sample) -> InkstreamResult<()> {
        let json = serde_json::to_string(sample)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| InkstreamError::source(format!("Failed to write sample: {e}")))?;
        self.samples_written += 1;

        // Flush every 1000 samples for crash safety
        if self.samples_written % 1000 == 0 {
            self.flush()?;
        }

        Ok(())
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> InkstreamResult<()> {
        self.writer
            .flush()
            .map_err(|e| InkstreamError::source(format!("Failed to flush samples: {e}")))?;
        Ok(())
    }

    /// Number of samples written.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Path to the output file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for SampleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
