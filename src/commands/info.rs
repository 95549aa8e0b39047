use crate::pdf::SourcePdf;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<()> {
    let pdf = SourcePdf::open(&path)?;
    let summary = pdf.summary();

    println!("File: {}", path.as_ref().display());
    println!("Pages: {}", summary.page_count);
    println!("Size: {} MB", summary.size_mb());

    Ok(())
}
