use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

use crate::blocks::{ContentBlock, normalize_label};
use crate::editing::{EditOp, IndexUnit, MIN_INSERT_INDEX, NamedStyle, TextStyle};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("anchor offset {anchor} is below the first insertable index {min}", min = MIN_INSERT_INDEX)]
    AnchorBelowMinimum { anchor: usize },

    #[error("offset overflow: cannot advance {at} by {len}")]
    OffsetOverflow { at: usize, len: usize },

    #[error("block {index} has a non-empty value but an empty label")]
    EmptyLabel { index: usize },
}

/// How successive blocks are positioned in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Insert at a running cursor that advances past each insertion.
    /// Operations must be applied in generation order.
    #[default]
    #[serde(alias = "forward_cursor")]
    Forward,
    /// Insert every block at one fixed offset. Each block lands above the
    /// previous ones, so block groups are transmitted in reverse.
    #[serde(alias = "reverse_at_fixed_point")]
    Reverse,
}

/// Styling choices applied to every block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub strategy: Strategy,
    pub heading_style: NamedStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_style: Option<NamedStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_text_style: Option<TextStyle>,
    pub index_unit: IndexUnit,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Forward,
            heading_style: NamedStyle::Heading2,
            body_style: None,
            label_text_style: None,
            index_unit: IndexUnit::Chars,
        }
    }
}

/// Result of building: an optional title preamble plus one operation group per
/// emitted block, in generation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBatch {
    strategy: Strategy,
    preamble: Vec<EditOp>,
    groups: Vec<Vec<EditOp>>,
    end: usize,
}

impl EditBatch {
    /// Operations emitted for the title, if any
    pub fn preamble(&self) -> &[EditOp] {
        &self.preamble
    }

    /// One group per emitted block, in generation order
    pub fn groups(&self) -> &[Vec<EditOp>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.preamble.len() + self.groups.iter().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset just past the last inserted paragraph once the batch is applied.
    ///
    /// The next batch for the same document starts here to append after it.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Operations exactly as generated: preamble, then groups in block order
    pub fn as_generated(&self) -> Vec<EditOp> {
        self.preamble
            .iter()
            .chain(self.groups.iter().flatten())
            .cloned()
            .collect()
    }

    /// Operations in the order they must be submitted for blocks to read in
    /// their original order.
    ///
    /// Groups are reordered whole; the insert-then-style order inside a group
    /// never changes.
    pub fn transmission_order(&self) -> Vec<EditOp> {
        match self.strategy {
            Strategy::Forward => self.as_generated(),
            Strategy::Reverse => self
                .preamble
                .iter()
                .chain(self.groups.iter().rev().flatten())
                .cloned()
                .collect(),
        }
    }
}

/// Block after normalization, ready for offset arithmetic
struct Prepared {
    heading: String,
    body: String,
}

/// Builds edit batches for a document starting at a fixed anchor offset
#[derive(Debug, Clone, PartialEq)]
pub struct BatchBuilder {
    anchor: usize,
    title: Option<String>,
    options: BuildOptions,
}

impl BatchBuilder {
    pub fn new(anchor: usize) -> Self {
        Self {
            anchor,
            title: None,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    /// Insert `title` as a title paragraph at the anchor, ahead of all blocks
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Build the edit batch for `blocks`.
    ///
    /// Every block is validated before any operation is produced, so an error
    /// never leaves a partial batch behind.
    pub fn build(&self, blocks: &[ContentBlock]) -> Result<EditBatch, BuildError> {
        if self.anchor < MIN_INSERT_INDEX {
            return Err(BuildError::AnchorBelowMinimum {
                anchor: self.anchor,
            });
        }

        let prepared = prepare(blocks)?;

        let mut preamble = Vec::new();
        let mut start = self.anchor;
        if let Some(title) = self.title.as_deref().map(normalize_label)
            && !title.is_empty()
        {
            let range = self.span(start, &title)?;
            preamble.push(EditOp::InsertText {
                at: start,
                text: format!("{title}\n"),
            });
            preamble.push(EditOp::SetParagraphStyle {
                range: range.clone(),
                style: NamedStyle::Title,
            });
            start = advance(range.end, 1)?;
        }

        let mut groups = Vec::with_capacity(prepared.len());
        let end = match self.options.strategy {
            Strategy::Forward => {
                let mut cursor = start;
                for block in &prepared {
                    let mut group = Vec::new();
                    cursor = self.push_heading(&mut group, cursor, &block.heading)?;
                    cursor = self.push_body(&mut group, cursor, &block.body)?;
                    groups.push(group);
                }
                cursor
            }
            Strategy::Reverse => {
                let mut end = start;
                // Body goes in first so the heading inserted at the same point sits above it
                for block in &prepared {
                    let mut group = Vec::new();
                    let body_len = self.push_body(&mut group, start, &block.body)? - start;
                    let heading_len = self.push_heading(&mut group, start, &block.heading)? - start;
                    end = advance(advance(end, body_len)?, heading_len)?;
                    groups.push(group);
                }
                end
            }
        };

        let batch = EditBatch {
            strategy: self.options.strategy,
            preamble,
            groups,
            end,
        };
        log::debug!(
            "built {} operations for {} of {} blocks ({:?}, anchor {}, {:?})",
            batch.len(),
            prepared.len(),
            blocks.len(),
            self.options.strategy,
            self.anchor,
            self.options.index_unit
        );
        Ok(batch)
    }

    /// Insert `heading` at `at` and style it; returns the offset just past its newline
    fn push_heading(
        &self,
        group: &mut Vec<EditOp>,
        at: usize,
        heading: &str,
    ) -> Result<usize, BuildError> {
        let range = self.span(at, heading)?;
        group.push(EditOp::InsertText {
            at,
            text: format!("{heading}\n"),
        });
        group.push(EditOp::SetParagraphStyle {
            range: range.clone(),
            style: self.options.heading_style,
        });
        if let Some(style) = self.options.label_text_style.as_ref()
            && !style.is_empty()
        {
            group.push(EditOp::SetTextStyle {
                range: range.clone(),
                style: style.clone(),
            });
        }
        advance(range.end, 1)
    }

    /// Insert `body` at `at`, styling it only when a body style is configured
    fn push_body(
        &self,
        group: &mut Vec<EditOp>,
        at: usize,
        body: &str,
    ) -> Result<usize, BuildError> {
        let range = self.span(at, body)?;
        group.push(EditOp::InsertText {
            at,
            text: format!("{body}\n"),
        });
        if let Some(style) = self.options.body_style {
            group.push(EditOp::SetParagraphStyle {
                range: range.clone(),
                style,
            });
        }
        advance(range.end, 1)
    }

    /// Range `text` will occupy once inserted at `at`, excluding its newline
    fn span(&self, at: usize, text: &str) -> Result<Range<usize>, BuildError> {
        let len = self.options.index_unit.measure(text);
        Ok(at..advance(at, len)?)
    }
}

fn prepare(blocks: &[ContentBlock]) -> Result<Vec<Prepared>, BuildError> {
    let mut prepared = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let Some(body) = block.body() else {
            continue;
        };
        let heading = block.heading();
        if heading.is_empty() {
            return Err(BuildError::EmptyLabel { index });
        }
        prepared.push(Prepared { heading, body });
    }
    Ok(prepared)
}

fn advance(at: usize, len: usize) -> Result<usize, BuildError> {
    at.checked_add(len)
        .ok_or(BuildError::OffsetOverflow { at, len })
}

/// Build operations for `blocks` with default options (forward cursor,
/// `HEADING_2` headings), in transmission order.
pub fn build_operations(anchor: usize, blocks: &[ContentBlock]) -> Result<Vec<EditOp>, BuildError> {
    build_operations_with(anchor, blocks, &BuildOptions::default())
}

/// Build operations for `blocks` with explicit options, in transmission order
pub fn build_operations_with(
    anchor: usize,
    blocks: &[ContentBlock],
    options: &BuildOptions,
) -> Result<Vec<EditOp>, BuildError> {
    let batch = BatchBuilder::new(anchor)
        .with_options(options.clone())
        .build(blocks)?;
    Ok(batch.transmission_order())
}
