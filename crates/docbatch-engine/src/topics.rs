use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopicStoreError {
    #[error("Failed to read topic store at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse topic store at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode topic store for {path}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write topic store at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Identifier of a remote document or sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a locally unique id for documents not yet known to any remote service
    pub fn local() -> Self {
        Self(format!("local-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What is recorded about the document behind a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub id: DocumentId,
    /// Offset just past the content written so far
    pub end: usize,
}

impl TopicEntry {
    pub fn new(id: DocumentId, end: usize) -> Self {
        Self { id, end }
    }
}

/// Topic → document mapping, injected into whatever handles a request
pub trait TopicStore {
    fn get(&self, topic: &str) -> Option<TopicEntry>;

    /// Record `entry`; on error the previous entry stays in place
    fn put(&mut self, topic: &str, entry: TopicEntry) -> Result<(), TopicStoreError>;

    fn remove(&mut self, topic: &str) -> Result<Option<TopicEntry>, TopicStoreError>;
}

/// Store that lives as long as the process, and no longer
#[derive(Debug, Default, Clone)]
pub struct MemoryTopicStore {
    entries: HashMap<String, TopicEntry>,
}

impl MemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TopicStore for MemoryTopicStore {
    fn get(&self, topic: &str) -> Option<TopicEntry> {
        self.entries.get(topic_key(topic)).cloned()
    }

    fn put(&mut self, topic: &str, entry: TopicEntry) -> Result<(), TopicStoreError> {
        self.entries.insert(topic_key(topic).to_string(), entry);
        Ok(())
    }

    fn remove(&mut self, topic: &str) -> Result<Option<TopicEntry>, TopicStoreError> {
        Ok(self.entries.remove(topic_key(topic)))
    }
}

/// Store persisted as a JSON object in a file, rewritten on every change
#[derive(Debug)]
pub struct FileTopicStore {
    path: PathBuf,
    entries: BTreeMap<String, TopicEntry>,
}

impl FileTopicStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TopicStoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| TopicStoreError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| TopicStoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    /// Write `entries` to a sibling temp file, then rename it over the store
    fn save(&self, entries: &BTreeMap<String, TopicEntry>) -> Result<(), TopicStoreError> {
        let write_error = |source: std::io::Error| TopicStoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_error)?;

        let content =
            serde_json::to_string_pretty(entries).map_err(|source| TopicStoreError::Encode {
                path: self.path.clone(),
                source,
            })?;
        let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
        file.write_all(content.as_bytes()).map_err(write_error)?;
        file.persist(&self.path).map_err(|persist| write_error(persist.error))?;

        log::info!("Saved {} topic(s) to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl TopicStore for FileTopicStore {
    fn get(&self, topic: &str) -> Option<TopicEntry> {
        self.entries.get(topic_key(topic)).cloned()
    }

    fn put(&mut self, topic: &str, entry: TopicEntry) -> Result<(), TopicStoreError> {
        let mut entries = self.entries.clone();
        entries.insert(topic_key(topic).to_string(), entry);
        self.save(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn remove(&mut self, topic: &str) -> Result<Option<TopicEntry>, TopicStoreError> {
        let mut entries = self.entries.clone();
        let removed = entries.remove(topic_key(topic));
        if removed.is_some() {
            self.save(&entries)?;
            self.entries = entries;
        }
        Ok(removed)
    }
}

fn topic_key(topic: &str) -> &str {
    topic.trim()
}

/// Outcome of resolving a topic to its document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub id: DocumentId,
    /// True when `create` ran, i.e. the document is brand new
    pub created: bool,
    /// Where new content for the document starts
    pub end: usize,
}

/// Reuse the document recorded for `topic`, or create one and record it with
/// its content starting at `start`
pub fn resolve_or_create<S, F, E>(
    store: &mut S,
    topic: &str,
    start: usize,
    create: F,
) -> Result<Resolution, E>
where
    S: TopicStore + ?Sized,
    F: FnOnce(&str) -> Result<DocumentId, E>,
    E: From<TopicStoreError>,
{
    if let Some(entry) = store.get(topic) {
        return Ok(Resolution {
            id: entry.id,
            created: false,
            end: entry.end,
        });
    }
    let id = create(topic_key(topic))?;
    store.put(topic, TopicEntry::new(id.clone(), start))?;
    log::info!("Created document {id} for topic {:?}", topic_key(topic));
    Ok(Resolution {
        id,
        created: true,
        end: start,
    })
}
