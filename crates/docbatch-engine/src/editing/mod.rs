/*!
 * # Batch Editing Module
 *
 * Builds ordered batches of rich-text edit operations for a remote documents
 * service whose batch-update API applies operations strictly in submission
 * order, each one against the document produced by the ones before it.
 *
 * ## Offset Model
 *
 * - Every offset is absolute and counted in one [`IndexUnit`] (characters by
 *   default, UTF-16 code units when the remote service counts that way).
 *   Offsets are never bytes.
 * - The first valid insertion index is [`MIN_INSERT_INDEX`]; index `0` is the
 *   document start marker and cannot receive text.
 * - An insertion of `n` units at `at` shifts everything at or after `at` by `n`.
 *
 * ## Strategies
 *
 * - **Forward cursor**: a running cursor advances past each insertion, so later
 *   operations target the end of what was already written.
 * - **Reverse at fixed point**: every insertion targets the same offset, so each
 *   block lands *above* the blocks inserted before it. Reading order is
 *   restored by transmitting block groups in reverse.
 *
 * ## Module Structure
 *
 * - **`ops`**: `EditOp`, paragraph/text styles and index units
 * - **`builder`**: `BatchBuilder`, `Strategy` and the resulting `EditBatch`
 * - **`replay`**: applies operations to a simulated document for verification
 *
 * ## Usage Pattern
 *
 * ```rust
 * use docbatch_engine::{ContentBlock, EditOp, NamedStyle, build_operations};
 *
 * let blocks = vec![ContentBlock::new("Topic", "Hello")];
 * let ops = build_operations(1, &blocks).unwrap();
 *
 * assert_eq!(ops[0], EditOp::InsertText { at: 1, text: "Topic\n".to_string() });
 * assert_eq!(
 *     ops[1],
 *     EditOp::SetParagraphStyle { range: 1..6, style: NamedStyle::Heading2 }
 * );
 * assert_eq!(ops[2], EditOp::InsertText { at: 7, text: "Hello\n".to_string() });
 * ```
 */

pub mod builder;
pub mod ops;
pub mod replay;

pub use builder::{BatchBuilder, BuildError, BuildOptions, EditBatch, Strategy};
pub use ops::{EditOp, IndexUnit, MIN_INSERT_INDEX, NamedStyle, TextStyle};
pub use replay::{Replayed, ReplayError, StyledSpan, replay};
