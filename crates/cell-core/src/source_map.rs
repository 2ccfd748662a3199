//! Byte offset to line/column conversion for cell sources.

use std::sync::Arc;

/// Line start table over one source text. Lines and columns are 1-based.
#[derive(Clone, Debug)]
pub struct LineIndex {
    source: Arc<str>,
    line_starts: Arc<Vec<usize>>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        Self {
            source: Arc::from(source),
            line_starts: Arc::new(compute_line_starts(source)),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Columns count characters, not bytes, so multi-byte text before an
    /// offset does not push the column to the right.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.source.len());
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts.get(idx).copied().unwrap_or(0);
        let col = self
            .source
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or_else(|| offset.saturating_sub(line_start));
        ((idx + 1) as u32, (col + 1) as u32)
    }

    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }
        let idx = line as usize - 1;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .copied()
            .unwrap_or_else(|| self.source.len());
        self.source
            .get(start..end)
            .map(|s| s.trim_end_matches('\n').trim_end_matches('\r'))
    }

    pub fn offset_for_line_col(&self, line: u32, col: u32) -> Option<usize> {
        if line == 0 || col == 0 {
            return None;
        }
        let start = *self.line_starts.get(line as usize - 1)?;
        let text = self.line_text(line)?;
        let within = text
            .char_indices()
            .nth(col as usize - 1)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        Some(start + within)
    }
}

fn compute_line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (idx, byte) in source.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(idx + 1);
        }
    }
    starts
}
