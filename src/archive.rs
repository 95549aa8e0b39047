use anyhow::{Context, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// In-memory zip of the split parts
pub struct PartArchive {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl PartArchive {
    pub fn new() -> Self {
        PartArchive {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    pub fn add_part(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip
            .start_file(name, options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        self.zip
            .write_all(bytes)
            .with_context(|| format!("Failed to write {} to archive", name))?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish().context("Failed to finalize archive")?;
        Ok(cursor.into_inner())
    }
}

impl Default for PartArchive {
    fn default() -> Self {
        Self::new()
    }
}
