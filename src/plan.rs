use anyhow::{anyhow, bail, Result};
use serde::Serialize;

/// A 1-based, inclusive run of pages that becomes one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSpan {
    pub start: u32,
    pub end: u32,
}

impl PageSpan {
    pub fn new(start: u32, end: u32) -> Self {
        PageSpan { start, end }
    }

    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// The computed split: which pages go where, and what the parts are called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub spans: Vec<PageSpan>,
    pub base_name: String,
}

impl SplitPlan {
    pub fn new(spans: Vec<PageSpan>, file_name: &str) -> Self {
        SplitPlan {
            spans,
            base_name: base_name_for(file_name),
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Name of the `index`-th (0-based) part inside the archive
    pub fn part_name(&self, index: usize) -> String {
        format!("{}_part_{}.pdf", self.base_name, index + 1)
    }

    pub fn archive_name(&self) -> String {
        format!("{}_split.zip", self.base_name)
    }
}

/// Strip a trailing `.pdf` (any case) from a file name
pub fn base_name_for(file_name: &str) -> String {
    let len = file_name.len();
    if len > 4
        && file_name.is_char_boundary(len - 4)
        && file_name[len - 4..].eq_ignore_ascii_case(".pdf")
    {
        file_name[..len - 4].to_string()
    } else {
        file_name.to_string()
    }
}

/// Parse the "pages per file" input from its leading digits, so "10abc" is 10 and "1.5" is 1
pub fn parse_pages_per_split(value: &str) -> Result<u32> {
    let value = value.trim_start();
    let digits_end = value
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(value.len());

    match value[..digits_end].parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!(
            "Please enter a valid number of pages greater than 0."
        )),
    }
}

/// Cut `1..=total` into consecutive spans of `per_split` pages; the last may be shorter
pub fn chunk_by_page_count(total: u32, per_split: u32) -> Result<Vec<PageSpan>> {
    if per_split == 0 {
        bail!("Please enter a valid number of pages greater than 0.");
    }

    let mut spans = Vec::new();
    let mut i = 0u32;
    while i < total {
        let end = i.saturating_add(per_split).min(total);
        spans.push(PageSpan::new(i + 1, end));
        i = end;
    }
    Ok(spans)
}

/// Turn a list of section start pages into contiguous spans ending at `total`
pub fn spans_from_start_pages(starts: &[u32], total: u32) -> Result<Vec<PageSpan>> {
    if starts.is_empty() {
        bail!("AI could not determine split points. Try a different delimiter.");
    }
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut starts: Vec<u32> = starts
        .iter()
        .copied()
        .filter(|&p| p >= 1 && p <= total)
        .collect();
    starts.sort_unstable();
    starts.dedup();
    if starts.first() != Some(&1) {
        starts.insert(0, 1);
    }

    let spans = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).map(|next| next - 1).unwrap_or(total);
            PageSpan::new(start, end)
        })
        .collect();
    Ok(spans)
}
