use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DetectorKind, LlmConfig};
use crate::split::SplitRequest;

#[derive(Parser)]
#[command(name = "pdfsplit")]
#[command(about = "Split a PDF into smaller PDFs by page count or delimiter, bundled as a zip")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as MCP server over stdio
    Mcp {
        #[command(flatten)]
        llm: LlmConfig,
    },

    /// Show name, page count and size of a PDF
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Show the parts a split would produce
    Preview {
        /// PDF file to split
        path: PathBuf,

        #[command(flatten)]
        method: MethodArgs,
    },

    /// Split a PDF and write the parts as a zip archive
    Split {
        /// PDF file to split
        path: PathBuf,

        #[command(flatten)]
        method: MethodArgs,

        /// Directory to write the archive to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(Args)]
#[command(group(ArgGroup::new("split_method").required(true).args(["pages", "delimiter"])))]
pub struct MethodArgs {
    /// Pages per output file
    #[arg(short, long)]
    pub pages: Option<String>,

    /// Regular expression marking the first page of each section
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// How delimiter pages are located
    #[arg(long, value_enum, default_value_t = DetectorKind::Llm)]
    pub detector: DetectorKind,

    #[command(flatten)]
    pub llm: LlmConfig,
}

impl MethodArgs {
    pub fn request(&self) -> SplitRequest {
        match (&self.pages, &self.delimiter) {
            (_, Some(pattern)) => SplitRequest::delimiter(pattern.clone()),
            (Some(pages), None) => SplitRequest::pages(pages.clone()),
            (None, None) => SplitRequest::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::SplitMethod;

    #[test]
    fn test_parse_split_by_pages() {
        let cli = Cli::try_parse_from(["pdfsplit", "split", "in.pdf", "--pages", "3", "-o", "out"])
            .unwrap();
        let Commands::Split {
            path,
            method,
            output_dir,
        } = cli.command
        else {
            panic!("expected split");
        };
        assert_eq!(path, PathBuf::from("in.pdf"));
        assert_eq!(output_dir, PathBuf::from("out"));
        assert_eq!(method.request(), SplitRequest::pages("3"));
    }

    #[test]
    fn test_parse_preview_by_delimiter() {
        let cli = Cli::try_parse_from([
            "pdfsplit",
            "preview",
            "in.pdf",
            "--delimiter",
            r"^Chapter \d+",
            "--detector",
            "text",
        ])
        .unwrap();
        let Commands::Preview { method, .. } = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(method.detector, DetectorKind::Text);
        assert_eq!(method.request().method, SplitMethod::Delimiter);
    }

    #[test]
    fn test_no_burst_alias() {
        assert!(Cli::try_parse_from(["pdfsplit", "burst", "in.pdf", "--pages", "1"]).is_err());
    }

    #[test]
    fn test_method_required_and_exclusive() {
        assert!(Cli::try_parse_from(["pdfsplit", "preview", "in.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "pdfsplit", "preview", "in.pdf", "--pages", "2", "--delimiter", "x"
        ])
        .is_err());
    }
}
