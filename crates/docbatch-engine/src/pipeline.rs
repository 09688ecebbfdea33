use serde_json::Value;

use crate::editing::{BatchBuilder, BuildOptions, EditBatch, EditOp};
use crate::payload::{Payload, Receipt};
use crate::topics::{DocumentId, Resolution, TopicEntry, TopicStore, resolve_or_create};
use crate::wire::BatchUpdateRequest;

/// Everything produced for one accepted payload
#[derive(Debug, Clone)]
pub struct Outcome {
    pub topic: String,
    pub resolution: Resolution,
    pub batch: EditBatch,
    pub received: Value,
}

impl Outcome {
    /// Operations in submission order
    pub fn operations(&self) -> Vec<EditOp> {
        self.batch.transmission_order()
    }

    pub fn request(&self) -> BatchUpdateRequest {
        BatchUpdateRequest::from_operations(&self.operations())
    }

    pub fn receipt(&self) -> Receipt {
        Receipt::success(self.topic.clone(), self.batch.len(), self.received.clone())
    }
}

/// Request handling minus transport: validate, build, resolve the target document
#[derive(Debug, Clone)]
pub struct Pipeline {
    anchor: usize,
    options: BuildOptions,
    title_documents: bool,
}

impl Pipeline {
    pub fn new(anchor: usize, options: BuildOptions) -> Self {
        Self {
            anchor,
            options,
            title_documents: false,
        }
    }

    /// Documents carry their topic as a title paragraph at the anchor.
    ///
    /// Only newly created documents get the title inserted.
    pub fn with_titles(mut self, enabled: bool) -> Self {
        self.title_documents = enabled;
        self
    }

    /// Handle one raw payload.
    ///
    /// The payload is validated and the batch built before the topic is
    /// resolved, so a rejected payload never creates a document. Content for a
    /// reused document is appended after whatever earlier payloads wrote, and
    /// the new end is recorded in `store`.
    pub fn handle<S, F>(&self, raw: &str, store: &mut S, create: F) -> anyhow::Result<Outcome>
    where
        S: TopicStore + ?Sized,
        F: FnOnce(&str) -> anyhow::Result<DocumentId>,
    {
        let received: Value = serde_json::from_str(raw)?;
        let payload = Payload::from_value(received.clone())?;
        let topic = payload.topic().to_string();
        let blocks = payload.blocks()?;

        let mut builder = BatchBuilder::new(self.anchor).with_options(self.options.clone());
        if self.title_documents {
            builder = builder.with_title(topic.as_str());
        }
        let fresh = builder.build(&blocks)?;

        let resolution = resolve_or_create(store, &topic, self.anchor, create)?;
        let batch = if resolution.created {
            fresh
        } else {
            BatchBuilder::new(resolution.end)
                .with_options(self.options.clone())
                .build(&blocks)?
        };
        store.put(&topic, TopicEntry::new(resolution.id.clone(), batch.end()))?;

        log::info!(
            "Accepted payload for topic {:?}: {} operations for document {} at {}",
            topic,
            batch.len(),
            resolution.id,
            resolution.end
        );

        Ok(Outcome {
            topic,
            resolution,
            batch,
            received,
        })
    }
}
