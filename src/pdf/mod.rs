pub mod document;
pub mod text;

pub use document::SourcePdf;
