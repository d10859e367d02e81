//! Test story source — serves story text from memory.

use async_trait::async_trait;
use lifeline_core::error::StoryError;
use lifeline_story::application::loader::{StoryFormat, StorySource};

/// A `StorySource` holding its text in memory.
#[derive(Debug, Clone)]
pub struct InMemoryStorySource {
    text: String,
    format: StoryFormat,
}

impl InMemoryStorySource {
    /// A YAML source.
    #[must_use]
    pub fn yaml(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: StoryFormat::Yaml,
        }
    }

    /// A JSON source.
    #[must_use]
    pub fn json(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: StoryFormat::Json,
        }
    }
}

#[async_trait]
impl StorySource for InMemoryStorySource {
    fn describe(&self) -> String {
        "in-memory".to_owned()
    }

    fn format(&self) -> StoryFormat {
        self.format
    }

    async fn fetch(&self) -> Result<String, StoryError> {
        Ok(self.text.clone())
    }
}

/// A `StorySource` whose fetch always fails.
#[derive(Debug, Clone, Copy)]
pub struct FailingStorySource;

#[async_trait]
impl StorySource for FailingStorySource {
    fn describe(&self) -> String {
        "failing".to_owned()
    }

    fn format(&self) -> StoryFormat {
        StoryFormat::Yaml
    }

    async fn fetch(&self) -> Result<String, StoryError> {
        Err(StoryError::Load("connection refused".into()))
    }
}
