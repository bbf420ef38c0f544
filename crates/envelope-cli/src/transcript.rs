//! Transcript sink that writes each stage to a file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use envelope::Transcript;

/// Writes `[label]` headers followed by the hex value, one section per entry.
///
/// The first write error is kept and reported by [`finish`](Self::finish);
/// later entries are dropped.
pub struct FileTranscript {
    out: BufWriter<File>,
    error: Option<io::Error>,
}

impl FileTranscript {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            out: BufWriter::new(File::create(path)?),
            error: None,
        })
    }

    pub fn finish(mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()
    }
}

impl Transcript for FileTranscript {
    fn record(&mut self, label: &str, value: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "[{label}]\n{}\n", hex::encode(value)) {
            self.error = Some(err);
        }
    }
}
