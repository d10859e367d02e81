//! Story loading.
//!
//! Parses YAML or JSON story text into a `StoryGraph` and stamps it with a
//! SHA-256 version hash of the source. Where the text comes from is behind the
//! `StorySource` trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lifeline_core::error::StoryError;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::domain::graph::StoryGraph;
use crate::domain::record::StoryRecord;

/// Encoding of a story document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryFormat {
    /// YAML markup.
    Yaml,
    /// Plain JSON.
    Json,
}

impl StoryFormat {
    /// Picks the format from a file extension. Anything that is not `.json`
    /// is read as YAML, which is a superset of JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Somewhere story text can be fetched from.
#[async_trait]
pub trait StorySource: Send + Sync {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    /// The document encoding.
    fn format(&self) -> StoryFormat;

    /// Fetches the raw story text.
    async fn fetch(&self) -> Result<String, StoryError>;
}

/// Reads a story file from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileStorySource {
    path: PathBuf,
}

impl FileStorySource {
    /// Creates a source for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StorySource for FileStorySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn format(&self) -> StoryFormat {
        StoryFormat::from_path(&self.path)
    }

    async fn fetch(&self) -> Result<String, StoryError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StoryError::Load(format!("{}: {e}", self.path.display())))
    }
}

/// Parses story text into a graph.
///
/// # Errors
///
/// Returns `StoryError::Load` if the text is not a valid story document.
pub fn parse_story(text: &str, format: StoryFormat) -> Result<StoryGraph, StoryError> {
    let record: StoryRecord = match format {
        StoryFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| StoryError::Load(format!("yaml decode: {e}")))?,
        StoryFormat::Json => serde_json::from_str(text)
            .map_err(|e| StoryError::Load(format!("json decode: {e}")))?,
    };

    let nodes = record
        .node_dict
        .into_iter()
        .filter_map(|(key, node)| node.into_node(&key));

    Ok(StoryGraph::new(nodes, version_hash(text)))
}

/// Fetches and parses a story from `source`.
///
/// # Errors
///
/// Returns `StoryError::Load` if fetching or parsing fails.
#[instrument(skip(source), fields(source = %source.describe()))]
pub async fn load_story(source: &dyn StorySource) -> Result<StoryGraph, StoryError> {
    let text = source.fetch().await?;
    let graph = parse_story(&text, source.format())?;
    info!(
        nodes = graph.len(),
        version_hash = graph.version_hash(),
        "story loaded"
    );
    Ok(graph)
}

fn version_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
