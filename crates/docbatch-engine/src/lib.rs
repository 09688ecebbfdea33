pub mod blocks;
pub mod editing;
pub mod payload;
pub mod pipeline;
pub mod topics;
pub mod wire;

// Re-export key types for easier usage
pub use blocks::ContentBlock;
pub use editing::{builder::*, ops::*, replay::*};
pub use payload::{Payload, PayloadError, Receipt};
pub use pipeline::{Outcome, Pipeline};
pub use topics::{
    DocumentId, FileTopicStore, MemoryTopicStore, Resolution, TopicEntry, TopicStore,
    TopicStoreError, resolve_or_create,
};
pub use wire::BatchUpdateRequest;
