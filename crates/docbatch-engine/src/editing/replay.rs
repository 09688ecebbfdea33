use std::ops::Range;
use thiserror::Error;
use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::editing::{EditOp, IndexUnit, MIN_INSERT_INDEX, NamedStyle, TextStyle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("operation {index}: offset {offset} is outside the document (valid {min}..={end})", min = MIN_INSERT_INDEX)]
    OutOfBounds {
        index: usize,
        offset: usize,
        end: usize,
    },

    #[error("operation {index}: offset {offset} falls inside a character")]
    SplitsCharacter { index: usize, offset: usize },

    #[error("operation {index}: inverted range {start}..{end}")]
    InvertedRange {
        index: usize,
        start: usize,
        end: usize,
    },
}

/// A style applied over a range of the final document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan<S> {
    pub range: Range<usize>,
    pub style: S,
}

/// Document state after replaying a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Replayed {
    pub text: String,
    pub paragraph_styles: Vec<StyledSpan<NamedStyle>>,
    pub text_styles: Vec<StyledSpan<TextStyle>>,
    unit: IndexUnit,
}

impl Replayed {
    /// Text covered by a document range, if the range is valid
    pub fn slice(&self, range: Range<usize>) -> Option<&str> {
        if range.start < MIN_INSERT_INDEX || range.start > range.end {
            return None;
        }
        let start = byte_offset(&self.text, self.unit, range.start - MIN_INSERT_INDEX)?;
        let end = byte_offset(&self.text, self.unit, range.end - MIN_INSERT_INDEX)?;
        self.text.get(start..end)
    }

    /// Texts carrying paragraph style `style`, in document order
    pub fn paragraphs_styled(&self, style: NamedStyle) -> Vec<&str> {
        let mut spans: Vec<_> = self
            .paragraph_styles
            .iter()
            .filter(|span| span.style == style)
            .collect();
        spans.sort_by_key(|span| span.range.start);
        spans
            .into_iter()
            .filter_map(|span| self.slice(span.range.clone()))
            .collect()
    }
}

/// Simulated remote document: text starts at index 1, offsets in `unit`
struct Simulated {
    buffer: Rope,
    unit: IndexUnit,
    paragraph_styles: Vec<StyledSpan<NamedStyle>>,
    text_styles: Vec<StyledSpan<TextStyle>>,
}

impl Simulated {
    fn end(&self) -> usize {
        MIN_INSERT_INDEX + self.unit.measure(&self.buffer.to_string())
    }

    /// Byte position in the buffer for document offset `offset`
    fn locate(&self, index: usize, offset: usize) -> Result<usize, ReplayError> {
        let end = self.end();
        if offset < MIN_INSERT_INDEX || offset > end {
            return Err(ReplayError::OutOfBounds { index, offset, end });
        }
        byte_offset(
            &self.buffer.to_string(),
            self.unit,
            offset - MIN_INSERT_INDEX,
        )
        .ok_or(ReplayError::SplitsCharacter { index, offset })
    }

    fn check_range(&self, index: usize, range: &Range<usize>) -> Result<(), ReplayError> {
        if range.start > range.end {
            return Err(ReplayError::InvertedRange {
                index,
                start: range.start,
                end: range.end,
            });
        }
        self.locate(index, range.start)?;
        self.locate(index, range.end)?;
        Ok(())
    }

    fn apply(&mut self, index: usize, op: &EditOp) -> Result<(), ReplayError> {
        match op {
            EditOp::InsertText { at, text } => {
                let byte = self.locate(index, *at)?;
                let mut builder = Builder::new(self.buffer.len());
                builder.replace(byte..byte, Rope::from(text.as_str()));
                self.buffer = builder.build().apply(&self.buffer);

                let len = self.unit.measure(text);
                shift_spans(&mut self.paragraph_styles, *at, len);
                shift_spans(&mut self.text_styles, *at, len);
            }
            EditOp::SetParagraphStyle { range, style } => {
                self.check_range(index, range)?;
                self.paragraph_styles.push(StyledSpan {
                    range: range.clone(),
                    style: *style,
                });
            }
            EditOp::SetTextStyle { range, style } => {
                self.check_range(index, range)?;
                self.text_styles.push(StyledSpan {
                    range: range.clone(),
                    style: style.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Move spans the way the remote service does when `len` units land at `at`
fn shift_spans<S>(spans: &mut [StyledSpan<S>], at: usize, len: usize) {
    for span in spans {
        if span.range.start >= at {
            span.range.start += len;
            span.range.end += len;
        } else if span.range.end > at {
            span.range.end += len;
        }
    }
}

/// Byte offset of the `offset`-th unit in `text`, `None` if it is out of range
/// or falls inside a character
fn byte_offset(text: &str, unit: IndexUnit, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte, c) in text.char_indices() {
        if units == offset {
            return Some(byte);
        }
        if units > offset {
            return None;
        }
        units += unit.char_width(c);
    }
    (units == offset).then_some(text.len())
}

/// Apply `ops` in list order to a document whose body initially holds `initial`.
///
/// Each operation is checked against the document as left by the operations
/// before it, exactly as the remote batch-update endpoint would.
pub fn replay(initial: &str, ops: &[EditOp], unit: IndexUnit) -> Result<Replayed, ReplayError> {
    let mut doc = Simulated {
        buffer: Rope::from(initial),
        unit,
        paragraph_styles: Vec::new(),
        text_styles: Vec::new(),
    };
    for (index, op) in ops.iter().enumerate() {
        doc.apply(index, op)?;
    }
    Ok(Replayed {
        text: doc.buffer.to_string(),
        paragraph_styles: doc.paragraph_styles,
        text_styles: doc.text_styles,
        unit,
    })
}
