//! Positions in XMI text, for format errors.
//!
//! quick-xml reports byte offsets into the buffer it read; messages show
//! them as 1-based `line:column`.

use std::fmt;

pub use text_size::TextSize;

/// A 1-based line and column in the document. Columns count UTF-8 bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Offsets of line starts in one XMI document.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    end: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(at, _)| TextSize::try_from(at + 1).unwrap_or(TextSize::from(u32::MAX))),
            )
            .collect();
        Self {
            line_starts,
            end: TextSize::of(text),
        }
    }

    /// The position of a reader offset. Offsets past the end of the text
    /// (quick-xml reports one at EOF) clamp to the last byte.
    pub fn position(&self, offset: u64) -> LineCol {
        let offset = u32::try_from(offset).map_or(self.end, TextSize::from).min(self.end);
        let line = self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1);
        let col = offset - self.line_starts[line];
        LineCol {
            line: line as u32 + 1,
            col: u32::from(col) + 1,
        }
    }
}
